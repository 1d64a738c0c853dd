//! TypeScript lowering (pass 2): `enum` and `namespace` initializer
//! closures.

use super::*;

impl<'a> Binder<'a> {
    /// `enum E { A, B = 2, S = "s" }` lowers to:
    ///
    /// ```text
    /// var E;
    /// (function(E) {
    ///   E[E["A"] = 0] = "A";
    ///   E[E["B"] = 2] = "B";
    ///   E["S"] = "s";
    /// })(E || (E = {}));
    /// ```
    ///
    /// Numeric members get the reverse mapping; string members do not.
    /// The `E || (E = {})` argument makes repeated declarations (and
    /// class/namespace merging) accumulate onto one object.
    pub(crate) fn lower_enum(&mut self, span: Span, data: SEnum) -> Vec<Stmt> {
        let SEnum {
            name,
            name_ref,
            is_export,
            members,
        } = data;

        if is_export && self.is_top_level() {
            self.named_exports.insert(
                name.clone(),
                NamedExport {
                    reference: name_ref,
                    alias_span: span,
                },
            );
        }

        // The closure parameter shadows the outer name inside the body
        let param_ref = self.new_symbol(SymbolKind::Hoisted, name.clone());
        let module_scope = self.module_scope;
        self.scopes[module_scope.idx()].generated.push(param_ref);

        let mut body = Vec::new();
        let mut next_value: Option<f64> = Some(0.0);
        for member in members {
            let value_expr = match member.value {
                Some(value) => self.visit_expr(value),
                None => match next_value {
                    Some(value) => Expr::new(span, EData::Number(value)),
                    None => {
                        self.log.add_kind(
                            LogLevel::Error,
                            DiagnosticKind::Syntax,
                            &self.path,
                            span,
                            format!(
                                "enum member \"{}\" must have an initializer",
                                member.name
                            ),
                        );
                        Expr::new(span, EData::Number(f64::NAN))
                    }
                },
            };
            next_value = match &value_expr.data {
                EData::Number(value) => Some(value + 1.0),
                _ => None,
            };
            let is_string_member = matches!(value_expr.data, EData::String(_));

            // E["A"] = value
            self.record_use(param_ref);
            let assignment = Expr::new(
                span,
                EData::Binary(Box::new(EBinary {
                    op: BinOp::Assign,
                    left: Expr::new(
                        span,
                        EData::Index(Box::new(EIndex {
                            target: Expr::new(
                                span,
                                EData::Identifier(EIdentifier {
                                    reference: param_ref,
                                }),
                            ),
                            index: Expr::new(span, EData::String(EString::new(&member.name))),
                            optional_chain: OptionalChain::None,
                        })),
                    ),
                    right: value_expr,
                })),
            );

            let stmt_expr = if is_string_member {
                assignment
            } else {
                // E[E["A"] = value] = "A"
                self.record_use(param_ref);
                Expr::new(
                    span,
                    EData::Binary(Box::new(EBinary {
                        op: BinOp::Assign,
                        left: Expr::new(
                            span,
                            EData::Index(Box::new(EIndex {
                                target: Expr::new(
                                    span,
                                    EData::Identifier(EIdentifier {
                                        reference: param_ref,
                                    }),
                                ),
                                index: assignment,
                                optional_chain: OptionalChain::None,
                            })),
                        ),
                        right: Expr::new(span, EData::String(EString::new(&member.name))),
                    })),
                )
            };
            body.push(Stmt::new(span, SData::Expr(stmt_expr)));
        }

        self.initializer_closure(span, name_ref, param_ref, body)
    }

    /// `namespace N { export const x = 1; }` lowers to the same closure
    /// shape as enums, with exported members copied onto the namespace
    /// object after their declarations.
    pub(crate) fn lower_namespace(&mut self, span: Span, data: SNamespace) -> Vec<Stmt> {
        let SNamespace {
            name,
            name_ref,
            is_export,
            body,
        } = data;

        if is_export && self.is_top_level() {
            self.named_exports.insert(
                name.clone(),
                NamedExport {
                    reference: name_ref,
                    alias_span: span,
                },
            );
        }

        let param_ref = self.new_symbol(SymbolKind::Hoisted, name.clone());
        let module_scope = self.module_scope;
        self.scopes[module_scope.idx()].generated.push(param_ref);

        // The namespace body has its own hoisting scope
        self.enter_scope();
        let mut out_body = Vec::new();
        for stmt in body {
            let exported_refs = exported_member_refs(&stmt);
            let visited = self.visit_stmt(stmt);
            out_body.extend(visited);
            for member_ref in exported_refs {
                // N.x = x
                let member_name = self.symbols[member_ref.inner.idx()].original_name.clone();
                self.record_use(param_ref);
                self.record_use(member_ref);
                out_body.push(Stmt::new(
                    span,
                    SData::Expr(Expr::new(
                        span,
                        EData::Binary(Box::new(EBinary {
                            op: BinOp::Assign,
                            left: Expr::new(
                                span,
                                EData::Dot(Box::new(EDot {
                                    target: Expr::new(
                                        span,
                                        EData::Identifier(EIdentifier {
                                            reference: param_ref,
                                        }),
                                    ),
                                    name: member_name,
                                    name_span: span,
                                    optional_chain: OptionalChain::None,
                                })),
                            ),
                            right: Expr::new(
                                span,
                                EData::Identifier(EIdentifier {
                                    reference: member_ref,
                                }),
                            ),
                        })),
                    )),
                ));
            }
        }
        self.leave_scope();

        self.initializer_closure(span, name_ref, param_ref, out_body)
    }

    /// `var N; (function(N) { ... })(N || (N = {}));`
    fn initializer_closure(
        &mut self,
        span: Span,
        name_ref: Ref,
        param_ref: Ref,
        body: Vec<Stmt>,
    ) -> Vec<Stmt> {
        let decl = Stmt::new(
            span,
            SData::Local(SLocal {
                kind: LocalKind::Var,
                decls: vec![Decl {
                    binding: Binding {
                        span,
                        data: BData::Identifier(name_ref),
                    },
                    value: None,
                }],
                is_export: false,
            }),
        );

        let closure = Expr::new(
            span,
            EData::Function(Box::new(Func {
                name: None,
                args: vec![Arg {
                    binding: Binding {
                        span,
                        data: BData::Identifier(param_ref),
                    },
                    default: None,
                    is_parameter_property: false,
                }],
                has_rest_arg: false,
                is_async: false,
                is_generator: false,
                body,
            })),
        );

        // N || (N = {})
        self.record_use(name_ref);
        self.record_use(name_ref);
        let merge_arg = Expr::new(
            span,
            EData::Binary(Box::new(EBinary {
                op: BinOp::LogicalOr,
                left: Expr::new(
                    span,
                    EData::Identifier(EIdentifier {
                        reference: name_ref,
                    }),
                ),
                right: Expr::new(
                    span,
                    EData::Binary(Box::new(EBinary {
                        op: BinOp::Assign,
                        left: Expr::new(
                            span,
                            EData::Identifier(EIdentifier {
                                reference: name_ref,
                            }),
                        ),
                        right: Expr::new(span, EData::Object(EObject::default())),
                    })),
                ),
            })),
        );

        let call = Stmt::new(
            span,
            SData::Expr(Expr::new(
                span,
                EData::Call(Box::new(ECall {
                    target: closure,
                    args: vec![merge_arg],
                    optional_chain: OptionalChain::None,
                    is_direct_eval: false,
                })),
            )),
        );

        vec![decl, call]
    }
}

/// Local symbols an exported declaration inside a namespace body binds,
/// which must be copied onto the namespace object.
fn exported_member_refs(stmt: &Stmt) -> Vec<Ref> {
    fn from_binding(binding: &Binding, out: &mut Vec<Ref>) {
        match &binding.data {
            BData::Identifier(reference) => out.push(*reference),
            BData::Array(array) => {
                for item in &array.items {
                    from_binding(&item.binding, out);
                }
            }
            BData::Object(object) => {
                for property in &object.properties {
                    from_binding(&property.binding, out);
                }
            }
            BData::Missing => {}
        }
    }

    let mut out = Vec::new();
    match &stmt.data {
        SData::Local(local) if local.is_export => {
            for decl in &local.decls {
                from_binding(&decl.binding, &mut out);
            }
        }
        SData::Function(func) if func.is_export => {
            if let Some(name) = func.func.name {
                out.push(name);
            }
        }
        SData::Class(class) if class.is_export => {
            if let Some(name) = class.class.name {
                out.push(name);
            }
        }
        SData::Enum(data) if data.is_export => out.push(data.name_ref),
        SData::Namespace(data) if data.is_export => out.push(data.name_ref),
        _ => {}
    }
    out
}
