//! Syntax lowering for older language targets (pass 2).
//!
//! Each lowering fires only when the configured target lacks the
//! feature. Features with no downlevel form (async functions, private
//! names) pass through verbatim with a warning.

use super::*;

/// One link of a member/call chain, used when rebuilding optional
/// chains as guarded conditionals.
enum ChainLink {
    Dot { name: String, name_span: Span },
    Index { index: Expr },
    Call { args: Vec<Expr> },
}

impl<'a> Binder<'a> {
    /// Whether this unvisited expression heads an optional chain that
    /// needs lowering.
    pub(crate) fn needs_optional_chain_lowering(&self, data: &EData) -> bool {
        if self.options.target.supports_optional_chaining() {
            return false;
        }
        matches!(
            data,
            EData::Dot(dot) if dot.optional_chain != OptionalChain::None
        ) || matches!(
            data,
            EData::Index(index) if index.optional_chain != OptionalChain::None
        ) || matches!(
            data,
            EData::Call(call) if call.optional_chain != OptionalChain::None
        )
    }

    /// Lower a whole optional chain, entered at its outermost link with
    /// children unvisited. `a?.b.c` becomes `a == null ? void 0 : a.b.c`;
    /// bases with side effects are captured in a temporary first.
    pub(crate) fn lower_optional_chain(&mut self, expr: Expr) -> Expr {
        let span = expr.span;

        // Peel links from the outside in, stopping at the `?.` link
        let mut links: Vec<ChainLink> = Vec::new();
        let mut current = expr;
        let base;
        loop {
            match current.data {
                EData::Dot(dot) if dot.optional_chain != OptionalChain::None => {
                    let is_start = dot.optional_chain == OptionalChain::Start;
                    links.push(ChainLink::Dot {
                        name: dot.name,
                        name_span: dot.name_span,
                    });
                    current = dot.target;
                    if is_start {
                        base = current;
                        break;
                    }
                }
                EData::Index(index) if index.optional_chain != OptionalChain::None => {
                    let is_start = index.optional_chain == OptionalChain::Start;
                    let idx = self.visit_expr(index.index);
                    links.push(ChainLink::Index { index: idx });
                    current = index.target;
                    if is_start {
                        base = current;
                        break;
                    }
                }
                EData::Call(call) if call.optional_chain != OptionalChain::None => {
                    let is_start = call.optional_chain == OptionalChain::Start;
                    let args = call
                        .args
                        .into_iter()
                        .map(|arg| self.visit_expr(arg))
                        .collect();
                    links.push(ChainLink::Call { args });
                    current = call.target;
                    if is_start {
                        base = current;
                        break;
                    }
                }
                _ => {
                    // No `?.` found; visit normally (should not happen)
                    base = current;
                    break;
                }
            }
        }

        // Inner chains lower recursively while visiting the base
        let base = self.visit_expr(base);
        let (guard, reuse) = self.capture(base);

        // Rebuild the plain access chain over the captured value
        let mut access = reuse;
        for link in links.into_iter().rev() {
            let access_span = span;
            access = match link {
                ChainLink::Dot { name, name_span } => Expr::new(
                    access_span,
                    EData::Dot(Box::new(EDot {
                        target: access,
                        name,
                        name_span,
                        optional_chain: OptionalChain::None,
                    })),
                ),
                ChainLink::Index { index } => Expr::new(
                    access_span,
                    EData::Index(Box::new(EIndex {
                        target: access,
                        index,
                        optional_chain: OptionalChain::None,
                    })),
                ),
                ChainLink::Call { args } => Expr::new(
                    access_span,
                    EData::Call(Box::new(ECall {
                        target: access,
                        args,
                        optional_chain: OptionalChain::None,
                        is_direct_eval: false,
                    })),
                ),
            };
        }

        // guard == null ? void 0 : access
        Expr::new(
            span,
            EData::Conditional(Box::new(EConditional {
                test: Expr::new(
                    span,
                    EData::Binary(Box::new(EBinary {
                        op: BinOp::LooseEq,
                        left: guard,
                        right: Expr::new(span, EData::Null),
                    })),
                ),
                yes: void_zero(span),
                no: access,
            })),
        )
    }

    /// `a ?? b` → `(t = a) != null ? t : b` (or without the temporary
    /// when `a` cannot have side effects).
    pub(crate) fn lower_nullish_coalescing(&mut self, span: Span, left: Expr, right: Expr) -> Expr {
        let (guard, reuse) = self.capture(left);
        Expr::new(
            span,
            EData::Conditional(Box::new(EConditional {
                test: Expr::new(
                    span,
                    EData::Binary(Box::new(EBinary {
                        op: BinOp::LooseNe,
                        left: guard,
                        right: Expr::new(span, EData::Null),
                    })),
                ),
                yes: reuse,
                no: right,
            })),
        )
    }

    /// `a ** b` → `Math.pow(a, b)`.
    pub(crate) fn lower_exponent(&mut self, span: Span, left: Expr, right: Expr) -> Expr {
        let math_pow = self.math_pow(span);
        Expr::new(
            span,
            EData::Call(Box::new(ECall {
                target: math_pow,
                args: vec![left, right],
                optional_chain: OptionalChain::None,
                is_direct_eval: false,
            })),
        )
    }

    /// `a **= b` → `a = Math.pow(a, b)`, capturing member-target objects
    /// so they evaluate once. The write target evaluates first here, so
    /// the capture rides on the write side.
    pub(crate) fn lower_exponent_assign(&mut self, span: Span, left: Expr, right: Expr) -> Expr {
        let (write, read) = self.split_assignment_target(left);
        let value = self.lower_exponent(span, read, right);
        Expr::new(
            span,
            EData::Binary(Box::new(EBinary {
                op: BinOp::Assign,
                left: write,
                right: value,
            })),
        )
    }

    /// `a &&= b` → `a && (a = b)` and friends. The lowered nullish form
    /// re-enters nullish lowering when `??` itself is unsupported.
    pub(crate) fn lower_logical_assignment(
        &mut self,
        span: Span,
        op: BinOp,
        left: Expr,
        right: Expr,
    ) -> Expr {
        let left = self.visit_expr(left);
        let right = self.visit_expr(right);
        // The read side evaluates first in `a && (a = b)`, so the
        // capture rides on the read side
        let (read, write) = self.split_assignment_target(left);
        let assignment = Expr::new(
            span,
            EData::Binary(Box::new(EBinary {
                op: BinOp::Assign,
                left: write,
                right,
            })),
        );
        match op {
            BinOp::LogicalAndAssign => Expr::new(
                span,
                EData::Binary(Box::new(EBinary {
                    op: BinOp::LogicalAnd,
                    left: read,
                    right: assignment,
                })),
            ),
            BinOp::LogicalOrAssign => Expr::new(
                span,
                EData::Binary(Box::new(EBinary {
                    op: BinOp::LogicalOr,
                    left: read,
                    right: assignment,
                })),
            ),
            _ => {
                // `a ??= b`
                if self.options.target.supports_optional_chaining() {
                    Expr::new(
                        span,
                        EData::Binary(Box::new(EBinary {
                            op: BinOp::NullishCoalescing,
                            left: read,
                            right: assignment,
                        })),
                    )
                } else {
                    self.lower_nullish_coalescing(span, read, assignment)
                }
            }
        }
    }

    /// `{a, ...b}` → `Object.assign({a}, b, ...)`. Runs of plain
    /// properties group into fresh literals between spread arguments.
    pub(crate) fn lower_object_spread(&mut self, expr: Expr) -> Expr {
        let span = expr.span;
        let EData::Object(object) = expr.data else {
            return expr;
        };

        let mut args: Vec<Expr> = Vec::new();
        let mut group: Vec<Property> = Vec::new();
        let mut flush =
            |args: &mut Vec<Expr>, group: &mut Vec<Property>| {
                if !group.is_empty() {
                    args.push(Expr::new(
                        span,
                        EData::Object(EObject {
                            properties: std::mem::take(group),
                        }),
                    ));
                }
            };

        for property in object.properties {
            if property.kind == PropertyKind::Spread {
                flush(&mut args, &mut group);
                if let Some(value) = property.value {
                    args.push(value);
                }
            } else {
                group.push(property);
            }
        }
        flush(&mut args, &mut group);

        // Always start from a fresh object so callers own the result
        if !matches!(args.first().map(|a| &a.data), Some(EData::Object(_))) {
            args.insert(0, Expr::new(span, EData::Object(EObject::default())));
        }

        let object_assign = self.dotted_global(span, &["Object", "assign"]);
        Expr::new(
            span,
            EData::Call(Box::new(ECall {
                target: object_assign,
                args,
                optional_chain: OptionalChain::None,
                is_direct_eval: false,
            })),
        )
    }

    /// `catch {}` gains a generated binding for targets without optional
    /// catch support.
    pub(crate) fn lower_optional_catch_binding(&mut self, catch: Catch) -> Catch {
        let reference = self.new_symbol(SymbolKind::CatchIdentifier, "e");
        let scope = self.hoist_target_scope();
        self.scopes[scope.idx()].generated.push(reference);
        Catch {
            binding: Some(Binding {
                span: Span::dummy(),
                data: BData::Identifier(reference),
            }),
            body: catch.body,
        }
    }

    // =========================================================================
    // Shared machinery
    // =========================================================================

    /// Split an assignment target into two expressions that evaluate its
    /// object parts only once. The FIRST returned expression carries the
    /// capturing assignment and must be placed wherever evaluation
    /// happens first; the second reuses the temporary.
    fn split_assignment_target(&mut self, target: Expr) -> (Expr, Expr) {
        let span = target.span;
        match target.data {
            EData::Identifier(identifier) => {
                self.record_use(identifier.reference);
                (
                    Expr::new(span, EData::Identifier(identifier)),
                    Expr::new(span, EData::Identifier(identifier)),
                )
            }
            EData::Dot(dot) => {
                let (object_guard, object_reuse) = self.capture(dot.target);
                let first = Expr::new(
                    span,
                    EData::Dot(Box::new(EDot {
                        target: object_guard,
                        name: dot.name.clone(),
                        name_span: dot.name_span,
                        optional_chain: OptionalChain::None,
                    })),
                );
                let second = Expr::new(
                    span,
                    EData::Dot(Box::new(EDot {
                        target: object_reuse,
                        name: dot.name,
                        name_span: dot.name_span,
                        optional_chain: OptionalChain::None,
                    })),
                );
                (first, second)
            }
            EData::Index(index) => {
                let (object_guard, object_reuse) = self.capture(index.target);
                let (index_guard, index_reuse) = self.capture(index.index);
                let first = Expr::new(
                    span,
                    EData::Index(Box::new(EIndex {
                        target: object_guard,
                        index: index_guard,
                        optional_chain: OptionalChain::None,
                    })),
                );
                let second = Expr::new(
                    span,
                    EData::Index(Box::new(EIndex {
                        target: object_reuse,
                        index: index_reuse,
                        optional_chain: OptionalChain::None,
                    })),
                );
                (first, second)
            }
            other => {
                let expr = Expr::new(span, other);
                (expr.clone(), expr)
            }
        }
    }

    /// Capture a value for reuse: side-effect-free expressions return
    /// themselves twice, everything else assigns into a temporary.
    pub(crate) fn capture(&mut self, value: Expr) -> (Expr, Expr) {
        let span = value.span;
        match &value.data {
            EData::Identifier(identifier) | EData::ImportIdentifier(identifier) => {
                self.record_use(identifier.reference);
                (value.clone(), value)
            }
            EData::This
            | EData::Null
            | EData::Undefined
            | EData::Boolean(_)
            | EData::Number(_)
            | EData::String(_) => (value.clone(), value),
            _ => {
                let temp = self.alloc_temp(span);
                self.record_use(temp);
                let guard = Expr::new(
                    span,
                    EData::Binary(Box::new(EBinary {
                        op: BinOp::Assign,
                        left: Expr::new(span, EData::Identifier(EIdentifier { reference: temp })),
                        right: value,
                    })),
                );
                let reuse = Expr::new(span, EData::Identifier(EIdentifier { reference: temp }));
                (guard, reuse)
            }
        }
    }

    fn math_pow(&mut self, span: Span) -> Expr {
        self.dotted_global(span, &["Math", "pow"])
    }

    /// `Object.assign`-style global member chains, bound through the
    /// scope chain so shadowing still applies.
    pub(crate) fn dotted_global(&mut self, span: Span, path: &[&str]) -> Expr {
        let mut expr = self.bind_identifier(span, path[0]);
        for segment in &path[1..] {
            expr = Expr::new(
                span,
                EData::Dot(Box::new(EDot {
                    target: expr,
                    name: (*segment).to_string(),
                    name_span: span,
                    optional_chain: OptionalChain::None,
                })),
            );
        }
        expr
    }

    // =========================================================================
    // Classes
    // =========================================================================

    /// Visit a class and lower instance/static fields when the target
    /// needs it. Extra statements (static field installs) are only
    /// produced when `as_statement` allows them.
    pub(crate) fn visit_class_inner(
        &mut self,
        class: Class,
        as_statement: bool,
    ) -> (Class, Vec<Stmt>) {
        self.enter_scope(); // class name
        let extends = class.extends.map(|extends| self.visit_expr(extends));
        let has_extends = extends.is_some();
        self.enter_scope(); // class body

        let lower_fields = !self.options.target.supports_class_fields();
        let mut members: Vec<ClassMember> = Vec::new();
        let mut instance_inits: Vec<Stmt> = Vec::new();
        let mut static_inits: Vec<(Expr, Expr)> = Vec::new();
        let mut constructor_index: Option<usize> = None;

        for member in class.members {
            match member {
                ClassMember::Method(method) => {
                    let key = if method.is_computed {
                        self.visit_expr(method.key)
                    } else {
                        method.key
                    };
                    let mut func = self.visit_fn(method.func);

                    // TypeScript parameter properties expand to field
                    // assignments at the top of the constructor
                    if method.kind == MethodKind::Constructor {
                        let mut param_inits = Vec::new();
                        for arg in &func.args {
                            if arg.is_parameter_property {
                                if let BData::Identifier(reference) = arg.binding.data {
                                    let name = self.symbols[reference.inner.idx()]
                                        .original_name
                                        .clone();
                                    self.record_use(reference);
                                    param_inits.push(this_property_assignment(
                                        arg.binding.span,
                                        &name,
                                        Expr::new(
                                            arg.binding.span,
                                            EData::Identifier(EIdentifier { reference }),
                                        ),
                                    ));
                                }
                            }
                        }
                        if !param_inits.is_empty() {
                            let insert_at = super_call_index(&func.body, has_extends);
                            for (offset, init) in param_inits.into_iter().enumerate() {
                                func.body.insert(insert_at + offset, init);
                            }
                        }
                        constructor_index = Some(members.len());
                    }

                    members.push(ClassMember::Method(ClassMethod {
                        kind: method.kind,
                        key,
                        is_computed: method.is_computed,
                        is_static: method.is_static,
                        func,
                    }));
                }
                ClassMember::Field(field) => {
                    let key = if field.is_computed {
                        self.visit_expr(field.key)
                    } else {
                        field.key
                    };
                    let value = field.value.map(|value| self.visit_expr(value));

                    if let EData::PrivateIdentifier(_) = &key.data {
                        if lower_fields {
                            self.warn_lowering_unsupported(key.span, "private class members");
                        }
                        members.push(ClassMember::Field(ClassField {
                            key,
                            is_computed: field.is_computed,
                            is_static: field.is_static,
                            value,
                        }));
                        continue;
                    }

                    if lower_fields && !field.is_computed {
                        if field.is_static {
                            if as_statement && class.name.is_some() {
                                static_inits.push((
                                    key,
                                    value.unwrap_or_else(Expr::undefined),
                                ));
                                continue;
                            }
                            // No statement position to move it to
                            members.push(ClassMember::Field(ClassField {
                                key,
                                is_computed: field.is_computed,
                                is_static: field.is_static,
                                value,
                            }));
                            continue;
                        }
                        let init = self.field_initializer(
                            key,
                            value.unwrap_or_else(Expr::undefined),
                            true,
                        );
                        instance_inits.push(init);
                        continue;
                    }

                    members.push(ClassMember::Field(ClassField {
                        key,
                        is_computed: field.is_computed,
                        is_static: field.is_static,
                        value,
                    }));
                }
                ClassMember::StaticBlock(body) => {
                    self.enter_scope();
                    let body = self.visit_stmts(body);
                    self.leave_scope();
                    members.push(ClassMember::StaticBlock(body));
                }
            }
        }

        // Instance field initializers go at the top of the constructor,
        // after any super() call
        if !instance_inits.is_empty() {
            match constructor_index {
                Some(index) => {
                    if let ClassMember::Method(method) = &mut members[index] {
                        let insert_at = super_call_index(&method.func.body, has_extends);
                        for (offset, init) in instance_inits.into_iter().enumerate() {
                            method.func.body.insert(insert_at + offset, init);
                        }
                    }
                }
                None => {
                    let mut body = Vec::new();
                    if has_extends {
                        // `super(...arguments)` forwards construction
                        body.push(Stmt::new(
                            Span::dummy(),
                            SData::Expr(Expr::new(
                                Span::dummy(),
                                EData::Call(Box::new(ECall {
                                    target: Expr::new(Span::dummy(), EData::Super),
                                    args: vec![Expr::new(
                                        Span::dummy(),
                                        EData::Spread(Box::new(Expr::new(
                                            Span::dummy(),
                                            EData::IdentifierName("arguments".to_string()),
                                        ))),
                                    )],
                                    optional_chain: OptionalChain::None,
                                    is_direct_eval: false,
                                })),
                            )),
                        ));
                        // Bind `arguments` now that the synthetic body
                        // exists
                        if let Some(Stmt {
                            data: SData::Expr(expr),
                            ..
                        }) = body.pop()
                        {
                            let expr = self.visit_expr(expr);
                            body.push(Stmt::new(Span::dummy(), SData::Expr(expr)));
                        }
                    }
                    body.extend(instance_inits);
                    members.insert(
                        0,
                        ClassMember::Method(ClassMethod {
                            kind: MethodKind::Constructor,
                            key: Expr::new(
                                Span::dummy(),
                                EData::String(EString::new("constructor")),
                            ),
                            is_computed: false,
                            is_static: false,
                            func: Func {
                                name: None,
                                args: Vec::new(),
                                has_rest_arg: false,
                                is_async: false,
                                is_generator: false,
                                body,
                            },
                        }),
                    );
                }
            }
        }

        self.leave_scope();
        self.leave_scope();

        // Static field installs follow the class statement
        let mut extra = Vec::new();
        if !static_inits.is_empty() {
            let name_ref = class.name.expect("static lowering requires a name");
            for (key, value) in static_inits {
                self.record_use(name_ref);
                let target = Expr::new(
                    Span::dummy(),
                    EData::Identifier(EIdentifier {
                        reference: name_ref,
                    }),
                );
                let assignment = self.static_field_initializer(target, key, value);
                extra.push(assignment);
            }
        }

        (
            Class {
                name: class.name,
                extends,
                members,
            },
            extra,
        )
    }

    /// One lowered instance-field initializer statement for the
    /// constructor body.
    fn field_initializer(&mut self, key: Expr, value: Expr, instance: bool) -> Stmt {
        debug_assert!(instance);
        let span = key.span;
        match (&key.data, self.options.class_fields) {
            (EData::String(name), jolt_common::options::ClassFieldMode::Assign)
                if jolt_lexer::is_valid_identifier(&name.value) =>
            {
                this_property_assignment(span, &name.value.clone(), value)
            }
            _ => {
                // Define semantics preserve the difference from setters
                // on a base class
                let this = Expr::new(span, EData::This);
                let call = self.runtime_call("__publicField", span, vec![this, key, value]);
                Stmt::new(span, SData::Expr(call))
            }
        }
    }

    fn static_field_initializer(&mut self, target: Expr, key: Expr, value: Expr) -> Stmt {
        let span = key.span;
        match (&key.data, self.options.class_fields) {
            (EData::String(name), jolt_common::options::ClassFieldMode::Assign)
                if jolt_lexer::is_valid_identifier(&name.value) =>
            {
                let name = name.value.clone();
                Stmt::new(
                    span,
                    SData::Expr(Expr::new(
                        span,
                        EData::Binary(Box::new(EBinary {
                            op: BinOp::Assign,
                            left: Expr::new(
                                span,
                                EData::Dot(Box::new(EDot {
                                    target,
                                    name,
                                    name_span: span,
                                    optional_chain: OptionalChain::None,
                                })),
                            ),
                            right: value,
                        })),
                    )),
                )
            }
            _ => {
                let call = self.runtime_call("__publicField", span, vec![target, key, value]);
                Stmt::new(span, SData::Expr(call))
            }
        }
    }
}

fn void_zero(span: Span) -> Expr {
    Expr::new(
        span,
        EData::Unary(Box::new(EUnary {
            op: UnOp::Void,
            value: Expr::new(span, EData::Number(0.0)),
        })),
    )
}

fn this_property_assignment(span: Span, name: &str, value: Expr) -> Stmt {
    Stmt::new(
        span,
        SData::Expr(Expr::new(
            span,
            EData::Binary(Box::new(EBinary {
                op: BinOp::Assign,
                left: Expr::new(
                    span,
                    EData::Dot(Box::new(EDot {
                        target: Expr::new(span, EData::This),
                        name: name.to_string(),
                        name_span: span,
                        optional_chain: OptionalChain::None,
                    })),
                ),
                right: value,
            })),
        )),
    )
}

/// Index just past the `super(...)` call at the start of a constructor
/// body, where lowered initializers must go.
fn super_call_index(body: &[Stmt], has_extends: bool) -> usize {
    if !has_extends {
        return 0;
    }
    for (index, stmt) in body.iter().enumerate() {
        if let SData::Expr(expr) = &stmt.data {
            if let EData::Call(call) = &expr.data {
                if matches!(call.target.data, EData::Super) {
                    return index + 1;
                }
            }
        }
    }
    0
}
