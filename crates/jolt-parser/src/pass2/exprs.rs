//! Expression visiting (pass 2): binding, substitution, folding and
//! lowering dispatch.

use super::*;
use crate::pass2::fold::known_truthiness;

impl<'a> Binder<'a> {
    pub(crate) fn visit_expr(&mut self, expr: Expr) -> Expr {
        // Optional chains lower as a whole from their outermost link,
        // before children are visited, so a single guard covers the
        // trailing plain accesses
        if self.needs_optional_chain_lowering(&expr.data) {
            return self.lower_optional_chain(expr);
        }

        let span = expr.span;
        match expr.data {
            // Leaf literals pass through untouched
            EData::Null
            | EData::Undefined
            | EData::Boolean(_)
            | EData::Number(_)
            | EData::String(_)
            | EData::BigInt(_)
            | EData::RegExp(_)
            | EData::This
            | EData::Super
            | EData::NewTarget
            | EData::ImportMeta
            | EData::Missing => Expr::new(span, expr.data),
            EData::Identifier(_) | EData::ImportIdentifier(_) | EData::PrivateIdentifier(_) => {
                Expr::new(span, expr.data)
            }

            EData::IdentifierName(name) => {
                if let Some(replacement) = self.substitute_define(&name) {
                    return self.visit_expr(Expr::new(span, replacement));
                }
                if name == "undefined" {
                    return Expr::new(span, EData::Undefined);
                }
                self.bind_identifier(span, &name)
            }
            EData::PrivateIdentifierName(name) => {
                let reference = self.resolve_name(&name);
                self.record_use(reference);
                Expr::new(span, EData::PrivateIdentifier(EIdentifier { reference }))
            }

            EData::Dot(dot) => self.visit_dot(span, *dot),
            EData::Index(index) => {
                let index = *index;
                let target = self.visit_expr(index.target);
                let idx = self.visit_expr(index.index);
                Expr::new(
                    span,
                    EData::Index(Box::new(EIndex {
                        target,
                        index: idx,
                        optional_chain: index.optional_chain,
                    })),
                )
            }

            EData::Array(array) => Expr::new(
                span,
                EData::Array(EArray {
                    items: array
                        .items
                        .into_iter()
                        .map(|item| self.visit_expr(item))
                        .collect(),
                }),
            ),
            EData::Object(object) => {
                let properties: Vec<Property> = object
                    .properties
                    .into_iter()
                    .map(|property| self.visit_property(property))
                    .collect();
                let has_spread = properties
                    .iter()
                    .any(|property| property.kind == PropertyKind::Spread);
                let out = Expr::new(span, EData::Object(EObject { properties }));
                if has_spread && !self.options.target.supports_object_spread() {
                    return self.lower_object_spread(out);
                }
                out
            }
            EData::Spread(value) => {
                Expr::new(span, EData::Spread(Box::new(self.visit_expr(*value))))
            }

            EData::Unary(unary) => {
                let unary = *unary;
                let value = self.visit_expr(unary.value);
                if unary.op.is_update() {
                    if let EData::Identifier(identifier) = &value.data {
                        self.record_mutation(identifier.reference);
                    }
                }
                self.fold_unary(span, unary.op, value)
            }
            EData::Binary(binary) => {
                let binary = *binary;
                let op = binary.op;

                // Logical assignment lowers before its operands need the
                // short-circuit structure
                if matches!(
                    op,
                    BinOp::LogicalAndAssign | BinOp::LogicalOrAssign | BinOp::NullishAssign
                ) && !self.options.target.supports_logical_assignment()
                {
                    return self.lower_logical_assignment(span, op, binary.left, binary.right);
                }

                let left = self.visit_expr(binary.left);
                if op.is_assign() {
                    if let EData::Identifier(identifier) = &left.data {
                        self.record_mutation(identifier.reference);
                    }
                }

                // Short-circuit operators with a known left side fold
                // without visiting both sides normally
                if let Some(folded) = self.fold_short_circuit(span, op, &left) {
                    let (keep_right, result_is_right) = folded;
                    if keep_right {
                        let right = self.visit_expr(binary.right);
                        if result_is_right {
                            return right;
                        }
                        unreachable!("short-circuit keeping left with right visited");
                    }
                    // Right side is dead; visit it for scope alignment
                    let was_dead = self.is_control_flow_dead;
                    self.is_control_flow_dead = true;
                    let _ = self.visit_expr(binary.right);
                    self.is_control_flow_dead = was_dead;
                    return left;
                }

                let right = self.visit_expr(binary.right);

                if op == BinOp::Pow && !self.options.target.supports_exponent_operator() {
                    return self.lower_exponent(span, left, right);
                }
                if op == BinOp::PowAssign && !self.options.target.supports_exponent_operator() {
                    return self.lower_exponent_assign(span, left, right);
                }
                if op == BinOp::NullishCoalescing
                    && !self.options.target.supports_optional_chaining()
                {
                    return self.lower_nullish_coalescing(span, left, right);
                }

                self.fold_binary(span, op, left, right)
            }
            EData::Conditional(cond) => {
                let cond = *cond;
                let test = self.visit_expr(cond.test);
                if let Some(truthy) = known_truthiness(&test.data) {
                    let (live, dead) = if truthy {
                        (cond.yes, cond.no)
                    } else {
                        (cond.no, cond.yes)
                    };
                    let was_dead = self.is_control_flow_dead;
                    self.is_control_flow_dead = true;
                    let _ = self.visit_expr(dead);
                    self.is_control_flow_dead = was_dead;
                    return self.visit_expr(live);
                }
                let yes = self.visit_expr(cond.yes);
                let no = self.visit_expr(cond.no);
                Expr::new(
                    span,
                    EData::Conditional(Box::new(EConditional { test, yes, no })),
                )
            }

            EData::Call(call) => self.visit_call(span, *call),
            EData::New(new) => {
                let new = *new;
                let target = self.visit_expr(new.target);
                let args = new
                    .args
                    .into_iter()
                    .map(|arg| self.visit_expr(arg))
                    .collect();
                Expr::new(span, EData::New(Box::new(ENew { target, args })))
            }
            EData::ImportCall(call) => {
                let call = *call;
                let target = self.visit_expr(call.target);
                let import_record_index = match &target.data {
                    EData::String(string) if !self.is_control_flow_dead => {
                        let index = self.import_records.len() as u32;
                        self.import_records.push(ImportRecord::new(
                            span,
                            string.value.clone(),
                            ImportKind::Dynamic,
                        ));
                        self.record_import_record(index);
                        Some(index)
                    }
                    _ => None,
                };
                Expr::new(
                    span,
                    EData::ImportCall(Box::new(EImportCall {
                        target,
                        import_record_index,
                    })),
                )
            }

            EData::Template(template) => {
                let template = *template;
                let tag = template.tag.map(|tag| self.visit_expr(tag));
                let parts: Vec<TemplatePart> = template
                    .parts
                    .into_iter()
                    .map(|part| TemplatePart {
                        value: self.visit_expr(part.value),
                        tail: part.tail,
                        tail_raw: part.tail_raw,
                    })
                    .collect();
                self.fold_template(span, tag, template.head, template.head_raw, parts)
            }

            EData::Function(func) => {
                let func = self.check_async_support(*func);
                let func = self.visit_fn(func);
                Expr::new(span, EData::Function(Box::new(func)))
            }
            EData::Arrow(arrow) => {
                if arrow.is_async && !self.options.target.supports_async() {
                    self.warn_lowering_unsupported(span, "async functions");
                }
                let arrow = self.visit_arrow(*arrow);
                Expr::new(span, EData::Arrow(Box::new(arrow)))
            }
            EData::Class(class) => {
                // Expressions cannot carry trailing statements, so static
                // members stay in place here
                let (class, _extra) = self.visit_class_inner(*class, false);
                Expr::new(span, EData::Class(Box::new(class)))
            }

            EData::Await(value) => {
                Expr::new(span, EData::Await(Box::new(self.visit_expr(*value))))
            }
            EData::Yield(data) => {
                let data = *data;
                Expr::new(
                    span,
                    EData::Yield(Box::new(EYield {
                        value: data.value.map(|value| self.visit_expr(value)),
                        is_star: data.is_star,
                    })),
                )
            }

            EData::JsxElement(element) => self.lower_jsx_element(span, *element),
            EData::RequireCall(data) => Expr::new(span, EData::RequireCall(data)),
        }
    }

    fn visit_property(&mut self, property: Property) -> Property {
        Property {
            kind: property.kind,
            key: property.key.map(|key| {
                if property.is_computed {
                    self.visit_expr(key)
                } else {
                    key
                }
            }),
            is_computed: property.is_computed,
            is_method: property.is_method,
            is_static: property.is_static,
            is_shorthand: property.is_shorthand,
            value: property.value.map(|value| self.visit_expr(value)),
            initializer: property.initializer.map(|init| self.visit_expr(init)),
        }
    }

    fn visit_dot(&mut self, span: Span, dot: EDot) -> Expr {
        // Compile-time substitution applies to whole dotted paths before
        // any binding happens
        if let Some(path) = dotted_path_of(&dot, span) {
            if let Some(replacement) = self.substitute_define(&path) {
                return self.visit_expr(Expr::new(span, replacement));
            }
        }

        let target = self.visit_expr(dot.target);

        // `ns.prop` on an ES-module namespace import becomes a synthetic
        // named-import item so tree-shaking sees the individual property
        if let EData::ImportIdentifier(identifier) = &target.data {
            let target_ref = identifier.reference;
            let is_star_import = self
                .named_imports
                .get(&target_ref)
                .map(|import| import.alias == "*")
                .unwrap_or(false);
            if is_star_import && dot.optional_chain == OptionalChain::None {
                let item_ref = self.import_item_for_namespace(target_ref, &dot.name, dot.name_span);
                // The namespace use already recorded transfers to the item
                self.transfer_use(target_ref, item_ref);
                return Expr::new(
                    span,
                    EData::ImportIdentifier(EIdentifier {
                        reference: item_ref,
                    }),
                );
            }
        }

        Expr::new(
            span,
            EData::Dot(Box::new(EDot {
                target,
                name: dot.name,
                name_span: dot.name_span,
                optional_chain: dot.optional_chain,
            })),
        )
    }

    fn visit_call(&mut self, span: Span, call: ECall) -> Expr {
        let target = self.visit_expr(call.target);

        if call.is_direct_eval {
            self.mark_direct_eval();
        }

        // `require("m")` with the unbound global becomes a dependency edge
        if let EData::Identifier(identifier) = &target.data {
            let symbol = &self.symbols[identifier.reference.inner.idx()];
            if symbol.kind == SymbolKind::Unbound
                && symbol.original_name == "require"
                && call.args.len() == 1
            {
                if let EData::String(string) = &call.args[0].data {
                    if self.is_control_flow_dead {
                        // Dead requires never join the graph
                        return Expr::new(span, EData::Null);
                    }
                    let index = self.import_records.len() as u32;
                    self.import_records.push(ImportRecord::new(
                        span,
                        string.value.clone(),
                        ImportKind::Require,
                    ));
                    self.record_import_record(index);
                    return Expr::new(
                        span,
                        EData::RequireCall(ERequireCall {
                            import_record_index: index,
                        }),
                    );
                }
            }
        }

        let args: Vec<Expr> = call
            .args
            .into_iter()
            .map(|arg| self.visit_expr(arg))
            .collect();
        Expr::new(
            span,
            EData::Call(Box::new(ECall {
                target,
                args,
                optional_chain: call.optional_chain,
                is_direct_eval: call.is_direct_eval,
            })),
        )
    }

    /// Synthetic import item for `namespace.property` accesses.
    pub(crate) fn import_item_for_namespace(
        &mut self,
        namespace_ref: Ref,
        name: &str,
        name_span: Span,
    ) -> Ref {
        if let Some(&existing) = self
            .import_items_cache
            .get(&(namespace_ref, name.to_string()))
        {
            self.record_use(existing);
            return existing;
        }
        let record_index = self
            .named_imports
            .get(&namespace_ref)
            .map(|import| import.import_record_index)
            .unwrap_or(0);
        let _ = name_span;
        let item_ref = self.new_symbol(SymbolKind::Import, name);
        let module_scope = self.module_scope;
        self.scopes[module_scope.idx()].generated.push(item_ref);
        // A dummy span marks the item as generated: if the target has no
        // such export, the linker degrades it to undefined instead of a
        // hard error, because nothing in the source asked for the name
        self.named_imports.insert(
            item_ref,
            NamedImport {
                alias: name.to_string(),
                alias_span: Span::dummy(),
                namespace_ref,
                import_record_index: record_index,
            },
        );
        self.import_items_cache
            .insert((namespace_ref, name.to_string()), item_ref);
        self.record_use(item_ref);
        item_ref
    }

    fn transfer_use(&mut self, from: Ref, to: Ref) {
        if self.is_control_flow_dead {
            return;
        }
        let _ = to;
        if let Some(count) = self.current_uses.get_mut(&from) {
            if *count > 0 {
                *count -= 1;
                if *count == 0 {
                    self.current_uses.remove(&from);
                }
            }
        }
        let symbol = &mut self.symbols[from.inner.idx()];
        symbol.use_count_estimate = symbol.use_count_estimate.saturating_sub(1);
    }

    fn check_async_support(&mut self, func: Func) -> Func {
        if func.is_async && !self.options.target.supports_async() {
            self.warn_lowering_unsupported(Span::dummy(), "async functions");
        }
        func
    }

    pub(crate) fn warn_lowering_unsupported(&self, span: Span, what: &str) {
        self.log.add_kind(
            LogLevel::Warning,
            DiagnosticKind::Lowering,
            &self.path,
            span,
            format!("{what} cannot be lowered to the configured target and are passed through"),
        );
    }

    /// Parse a define-map replacement for a matched path. Replacements
    /// are restricted to literals and dotted identifier paths.
    fn substitute_define(&mut self, path: &str) -> Option<EData> {
        let value = self.options.define.get(path)?.clone();
        parse_define_value(&value)
    }
}

/// Dotted path text of `a.b.c` chains whose base is a plain, not yet
/// bound identifier. Anything else is not substitutable.
fn dotted_path_of(dot: &EDot, _span: Span) -> Option<String> {
    fn inner(expr: &Expr) -> Option<String> {
        match &expr.data {
            EData::IdentifierName(name) => Some(name.clone()),
            EData::Dot(dot) if dot.optional_chain == OptionalChain::None => {
                Some(format!("{}.{}", inner(&dot.target)?, dot.name))
            }
            _ => None,
        }
    }
    if dot.optional_chain != OptionalChain::None {
        return None;
    }
    Some(format!("{}.{}", inner(&dot.target)?, dot.name))
}

/// Parse the replacement text of a define entry.
pub(crate) fn parse_define_value(text: &str) -> Option<EData> {
    let text = text.trim();
    match text {
        "true" => return Some(EData::Boolean(true)),
        "false" => return Some(EData::Boolean(false)),
        "null" => return Some(EData::Null),
        "undefined" => return Some(EData::Undefined),
        _ => {}
    }
    if let Ok(number) = text.parse::<f64>() {
        return Some(EData::Number(number));
    }
    if text.len() >= 2 && (text.starts_with('"') || text.starts_with('\'')) {
        let quote = text.chars().next().unwrap();
        if text.ends_with(quote) {
            return Some(EData::String(EString::new(&text[1..text.len() - 1])));
        }
    }
    // Dotted identifier path: builds an unbound member chain
    let mut segments = text.split('.');
    let first = segments.next()?;
    if !jolt_lexer::is_valid_identifier(first) {
        return None;
    }
    let mut expr_data = EData::IdentifierName(first.to_string());
    for segment in segments {
        if !jolt_lexer::is_valid_identifier(segment) {
            return None;
        }
        expr_data = EData::Dot(Box::new(EDot {
            target: Expr::new(Span::dummy(), expr_data),
            name: segment.to_string(),
            name_span: Span::dummy(),
            optional_chain: OptionalChain::None,
        }));
    }
    Some(expr_data)
}
