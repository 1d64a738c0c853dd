//! Expression printing.

use jolt_parser::ast::*;
use jolt_parser::ops::{Precedence, binary_op_precedence};

use jolt_lexer::is_valid_identifier;

use crate::printer::{Printer, escape_string};

/// Precedence a finished expression presents to its context.
fn precedence_of(expr: &Expr) -> Precedence {
    match &expr.data {
        EData::Binary(binary) => binary_op_precedence(binary.op),
        EData::Conditional(_) => Precedence::Conditional,
        EData::Arrow(_) => Precedence::Assign,
        EData::Yield(_) => Precedence::Yield,
        EData::Await(_) => Precedence::Prefix,
        EData::Unary(unary) => {
            if unary.op.is_prefix() {
                Precedence::Prefix
            } else {
                Precedence::Postfix
            }
        }
        EData::Call(_) | EData::ImportCall(_) | EData::RequireCall(_) => Precedence::Call,
        EData::New(_) => Precedence::New,
        EData::Dot(_) | EData::Index(_) => Precedence::Member,
        _ => Precedence::Member,
    }
}

/// Strictly-above level, for right operands of left-associative
/// operators (and the mirrored case).
fn above(level: Precedence) -> Precedence {
    use Precedence as P;
    match level {
        P::Lowest => P::Comma,
        P::Comma => P::Spread,
        P::Spread => P::Yield,
        P::Yield => P::Assign,
        P::Assign => P::Conditional,
        P::Conditional => P::NullishCoalescing,
        P::NullishCoalescing => P::LogicalOr,
        P::LogicalOr => P::LogicalAnd,
        P::LogicalAnd => P::BitwiseOr,
        P::BitwiseOr => P::BitwiseXor,
        P::BitwiseXor => P::BitwiseAnd,
        P::BitwiseAnd => P::Equals,
        P::Equals => P::Compare,
        P::Compare => P::Shift,
        P::Shift => P::Add,
        P::Add => P::Multiply,
        P::Multiply => P::Exponentiation,
        P::Exponentiation => P::Prefix,
        P::Prefix => P::Postfix,
        P::Postfix => P::New,
        P::New => P::Call,
        P::Call | P::Member => P::Member,
    }
}

/// Whether this node is the visible head of an optional chain; a plain
/// access over one must parenthesize it to break the chain.
fn is_optional_chain_top(expr: &Expr) -> bool {
    match &expr.data {
        EData::Dot(dot) => dot.optional_chain != OptionalChain::None,
        EData::Index(index) => index.optional_chain != OptionalChain::None,
        EData::Call(call) => call.optional_chain != OptionalChain::None,
        _ => false,
    }
}

impl<'a> Printer<'a> {
    pub(crate) fn print_expr(&mut self, expr: &Expr, level: Precedence) {
        let needs_parens = precedence_of(expr) < level && !is_atom(expr);
        if needs_parens {
            self.write("(");
        }
        self.print_expr_without_parens(expr, level);
        if needs_parens {
            self.write(")");
        }
    }

    fn print_expr_without_parens(&mut self, expr: &Expr, _level: Precedence) {
        self.map_span(expr.span);
        match &expr.data {
            EData::Null => self.write("null"),
            EData::Undefined => self.write("void 0"),
            EData::Boolean(true) => self.write("true"),
            EData::Boolean(false) => self.write("false"),
            EData::Number(value) => self.print_number(*value),
            EData::BigInt(digits) => {
                self.write(digits);
                self.write("n");
            }
            EData::String(string) => self.print_string(&string.value),
            EData::RegExp(raw) => self.write(raw),
            EData::This => self.write("this"),
            EData::Super => self.write("super"),
            EData::NewTarget => self.write("new.target"),
            EData::ImportMeta => self.write("import.meta"),
            EData::Missing => {}

            EData::Identifier(identifier) => {
                let name = self.name_of(identifier.reference);
                self.write(name);
            }
            EData::ImportIdentifier(identifier) => self.print_import_identifier(identifier),
            EData::PrivateIdentifier(identifier) => {
                let name = self.name_of(identifier.reference);
                self.write(name);
            }
            EData::IdentifierName(name) => {
                // Only reachable when printing unbound pass 1 output in
                // tests; bundling always binds first
                self.write(name);
            }
            EData::PrivateIdentifierName(name) => self.write(name),

            EData::Array(array) => {
                self.write("[");
                for (index, item) in array.items.iter().enumerate() {
                    if index > 0 {
                        self.write(",");
                        self.space();
                    }
                    self.print_expr(item, Precedence::Spread);
                }
                self.write("]");
            }
            EData::Object(object) => {
                if object.properties.is_empty() {
                    self.write("{}");
                    return;
                }
                self.write("{");
                for (index, property) in object.properties.iter().enumerate() {
                    if index > 0 {
                        self.write(",");
                    }
                    self.space();
                    self.print_property(property);
                }
                self.space();
                self.write("}");
            }
            EData::Spread(value) => {
                self.write("...");
                self.print_expr(value, Precedence::Spread);
            }

            EData::Unary(unary) => {
                if unary.op.is_prefix() {
                    let text = unary.op.text();
                    self.write(text);
                    if text.chars().last().is_some_and(|c| c.is_ascii_alphabetic()) {
                        self.write(" ");
                    } else {
                        // `- -x` and `+ +x` must not merge into `--`/`++`
                        if matches!(
                            (&unary.value.data, unary.op),
                            (EData::Unary(inner), UnOp::Neg) if matches!(inner.op, UnOp::Neg | UnOp::PreDec)
                        ) || matches!(
                            (&unary.value.data, unary.op),
                            (EData::Unary(inner), UnOp::Pos) if matches!(inner.op, UnOp::Pos | UnOp::PreInc)
                        ) {
                            self.write(" ");
                        }
                    }
                    self.print_expr(&unary.value, Precedence::Prefix);
                } else {
                    self.print_expr(&unary.value, Precedence::Postfix);
                    self.write(unary.op.text());
                }
            }

            EData::Binary(binary) => self.print_binary(binary),
            EData::Conditional(cond) => {
                self.print_expr(&cond.test, Precedence::NullishCoalescing);
                self.space();
                self.write("?");
                self.space();
                self.print_expr(&cond.yes, Precedence::Spread);
                self.space();
                self.write(":");
                self.space();
                self.print_expr(&cond.no, Precedence::Spread);
            }

            EData::Dot(dot) => {
                let wrap = dot.optional_chain == OptionalChain::None
                    && is_optional_chain_top(&dot.target);
                if wrap {
                    self.write("(");
                }
                self.print_member_target(&dot.target);
                if wrap {
                    self.write(")");
                }
                if dot.optional_chain == OptionalChain::Start {
                    self.write("?.");
                } else {
                    self.write(".");
                }
                self.map_span(dot.name_span);
                self.write(&dot.name);
            }
            EData::Index(index) => {
                let wrap = index.optional_chain == OptionalChain::None
                    && is_optional_chain_top(&index.target);
                if wrap {
                    self.write("(");
                }
                self.print_member_target(&index.target);
                if wrap {
                    self.write(")");
                }
                if index.optional_chain == OptionalChain::Start {
                    self.write("?.");
                }
                self.write("[");
                self.print_expr(&index.index, Precedence::Lowest);
                self.write("]");
            }
            EData::Call(call) => {
                let wrap = call.optional_chain == OptionalChain::None
                    && is_optional_chain_top(&call.target);
                if wrap {
                    self.write("(");
                }
                self.print_expr(&call.target, Precedence::Postfix);
                if wrap {
                    self.write(")");
                }
                if call.optional_chain == OptionalChain::Start {
                    self.write("?.");
                }
                self.write("(");
                for (index, arg) in call.args.iter().enumerate() {
                    if index > 0 {
                        self.write(",");
                        self.space();
                    }
                    self.print_expr(arg, Precedence::Spread);
                }
                self.write(")");
            }
            EData::New(new) => {
                self.write("new ");
                self.print_expr(&new.target, Precedence::Call);
                self.write("(");
                for (index, arg) in new.args.iter().enumerate() {
                    if index > 0 {
                        self.write(",");
                        self.space();
                    }
                    self.print_expr(arg, Precedence::Spread);
                }
                self.write(")");
            }

            EData::RequireCall(data) => self.print_require_call(data.import_record_index),
            EData::ImportCall(call) => self.print_import_call(call),

            EData::Function(func) => self.print_fn_decl(func, false),
            EData::Arrow(arrow) => self.print_arrow(arrow),
            EData::Class(class) => self.print_class_decl(class),

            EData::Template(template) => {
                if let Some(tag) = &template.tag {
                    self.print_expr(tag, Precedence::Postfix);
                }
                self.write("`");
                self.write(&template.head_raw.clone());
                for part in &template.parts {
                    self.write("${");
                    self.print_expr(&part.value, Precedence::Lowest);
                    self.write("}");
                    self.write(&part.tail_raw.clone());
                }
                self.write("`");
            }

            EData::Await(value) => {
                self.write("await ");
                self.print_expr(value, Precedence::Prefix);
            }
            EData::Yield(data) => {
                self.write("yield");
                if data.is_star {
                    self.write("*");
                }
                if let Some(value) = &data.value {
                    self.write(" ");
                    self.print_expr(value, Precedence::Yield);
                }
            }

            EData::JsxElement(_) => {
                // Always transformed away during pass 2
            }
        }
    }

    /// Member-access targets need parens in a few extra spots: integer
    /// literals (the dot would read as a decimal point) and `new`
    /// without parens.
    fn print_member_target(&mut self, target: &Expr) {
        let needs_parens = matches!(
            target.data,
            EData::Number(value) if value.fract() == 0.0 && value.is_finite() && !value.is_sign_negative()
        );
        if needs_parens {
            self.write("(");
            self.print_expr_without_parens(target, Precedence::Lowest);
            self.write(")");
        } else {
            self.print_expr(target, Precedence::Postfix);
        }
    }

    fn print_binary(&mut self, binary: &EBinary) {
        let op_level = binary_op_precedence(binary.op);
        let right_assoc = jolt_parser::ops::is_right_associative(binary.op);

        // `??` refuses to associate with `&&`/`||` without parens
        let mixes_nullish = |child: &Expr| {
            binary.op == BinOp::NullishCoalescing
                && matches!(
                    &child.data,
                    EData::Binary(inner)
                        if matches!(inner.op, BinOp::LogicalAnd | BinOp::LogicalOr)
                )
        };
        // A unary left operand of `**` requires parens
        let pow_unary_left = binary.op == BinOp::Pow
            && matches!(&binary.left.data, EData::Unary(unary) if unary.op.is_prefix());

        let left_level = if right_assoc { above(op_level) } else { op_level };
        let right_level = if right_assoc { op_level } else { above(op_level) };

        if mixes_nullish(&binary.left) || pow_unary_left {
            self.write("(");
            self.print_expr(&binary.left, Precedence::Lowest);
            self.write(")");
        } else {
            self.print_expr(&binary.left, left_level);
        }

        if binary.op == BinOp::Comma {
            self.write(",");
            self.space();
        } else {
            let text = binary.op.text();
            if text.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
                self.write(" ");
                self.write(text);
                self.write(" ");
            } else {
                self.space();
                self.write(text);
                self.space();
            }
        }

        if mixes_nullish(&binary.right) {
            self.write("(");
            self.print_expr(&binary.right, Precedence::Lowest);
            self.write(")");
        } else {
            self.print_expr(&binary.right, right_level);
        }
    }

    fn print_property(&mut self, property: &Property) {
        match property.kind {
            PropertyKind::Spread => {
                self.write("...");
                if let Some(value) = &property.value {
                    self.print_expr(value, Precedence::Spread);
                }
                return;
            }
            PropertyKind::Get => self.write("get "),
            PropertyKind::Set => self.write("set "),
            PropertyKind::Normal => {}
        }

        let key = property.key.as_ref();
        if property.is_method || property.kind != PropertyKind::Normal {
            if let Some(key) = key {
                if let Some(Expr {
                    data: EData::Function(func),
                    ..
                }) = &property.value
                {
                    if func.is_async {
                        self.write("async ");
                    }
                    if func.is_generator {
                        self.write("*");
                    }
                    self.print_property_key(key, property.is_computed);
                    self.print_fn_args_and_body(func);
                    return;
                }
            }
        }

        // Shorthand `{x}` when the value's final name still matches
        if property.is_shorthand {
            if let (Some(key), Some(value)) = (key, &property.value) {
                if let (EData::String(key_text), EData::Identifier(identifier))
                | (EData::String(key_text), EData::ImportIdentifier(identifier)) =
                    (&key.data, &value.data)
                {
                    let name = self.name_of(identifier.reference);
                    let is_aliased = self
                        .symbols
                        .get(self.symbols.follow_read(identifier.reference))
                        .namespace_alias
                        .is_some();
                    if !is_aliased && name == key_text.value {
                        self.write(name);
                        if let Some(init) = &property.initializer {
                            self.space();
                            self.write("=");
                            self.space();
                            self.print_expr(init, Precedence::Spread);
                        }
                        return;
                    }
                }
            }
        }

        if let Some(key) = key {
            self.print_property_key(key, property.is_computed);
            self.write(":");
            self.space();
        }
        if let Some(value) = &property.value {
            self.print_expr(value, Precedence::Spread);
        }
        if let Some(init) = &property.initializer {
            self.space();
            self.write("=");
            self.space();
            self.print_expr(init, Precedence::Spread);
        }
    }

    fn print_arrow(&mut self, arrow: &EArrow) {
        if arrow.is_async {
            self.write("async ");
        }
        // Single plain identifier arguments skip the parens
        let single_plain = arrow.args.len() == 1
            && !arrow.has_rest_arg
            && arrow.args[0].default.is_none()
            && matches!(arrow.args[0].binding.data, BData::Identifier(_));
        if single_plain {
            self.print_binding(&arrow.args[0].binding);
        } else {
            self.write("(");
            for (index, arg) in arrow.args.iter().enumerate() {
                if index > 0 {
                    self.write(",");
                    self.space();
                }
                if arrow.has_rest_arg && index == arrow.args.len() - 1 {
                    self.write("...");
                }
                self.print_binding(&arg.binding);
                if let Some(default) = &arg.default {
                    self.space();
                    self.write("=");
                    self.space();
                    self.print_expr(default, Precedence::Spread);
                }
            }
            self.write(")");
        }
        self.space();
        self.write("=>");
        self.space();

        if arrow.prefer_expr {
            if let [Stmt {
                data: SData::Return(Some(value)),
                ..
            }] = arrow.body.as_slice()
            {
                // Object literals as arrow bodies read as blocks
                if matches!(value.data, EData::Object(_)) {
                    self.write("(");
                    self.print_expr(value, Precedence::Spread);
                    self.write(")");
                } else {
                    self.print_expr(value, Precedence::Spread);
                }
                return;
            }
        }
        self.print_block(&arrow.body);
    }

    fn print_import_identifier(&mut self, identifier: &EIdentifier) {
        let canonical = self.symbols.follow_read(identifier.reference);
        let alias = self.symbols.get(canonical).namespace_alias.clone();
        match alias {
            Some(alias) => {
                // Imports into CommonJS modules read through the exports
                // object at runtime, never as bare names
                let namespace = self.name_of(alias.namespace_ref);
                self.write(namespace);
                if is_valid_identifier(&alias.alias) {
                    self.write(".");
                    self.write(&alias.alias);
                } else {
                    self.write("[");
                    self.print_string(&alias.alias);
                    self.write("]");
                }
            }
            None => {
                let name = self.name_of(canonical);
                self.write(name);
            }
        }
    }

    fn print_require_call(&mut self, record_index: u32) {
        let records = self.import_records;
        let record = &records[record_index as usize];
        if self.options.bundle {
            if let Some(source_index) = record.source_index {
                if let Some(&wrapper) = self.wrappers.get(&source_index) {
                    let name = self.name_of(wrapper);
                    self.write(name);
                    self.write("()");
                    return;
                }
            }
        }
        self.write("require(");
        let specifier = record.specifier.clone();
        self.print_string(&specifier);
        self.write(")");
    }

    fn print_import_call(&mut self, call: &EImportCall) {
        if let Some(record_index) = call.import_record_index {
            if let Some(path) = self.dynamic_paths.get(&record_index) {
                self.write("import(");
                let path = path.clone();
                self.print_string(&path);
                self.write(")");
                return;
            }
            let records = self.import_records;
            let record = &records[record_index as usize];
            if self.options.bundle && !record.is_external {
                if let Some(source_index) = record.source_index {
                    if let Some(&wrapper) = self.wrappers.get(&source_index) {
                        // Same-bundle dynamic imports resolve immediately
                        self.write("Promise.resolve().then(()");
                        self.space();
                        self.write("=>");
                        self.space();
                        let name = self.name_of(wrapper);
                        self.write(name);
                        self.write("())");
                        return;
                    }
                }
            }
        }
        self.write("import(");
        self.print_expr(&call.target, Precedence::Spread);
        self.write(")");
    }

    pub(crate) fn print_string(&mut self, value: &str) {
        self.write("\"");
        let escaped = escape_string(value);
        self.write(&escaped);
        self.write("\"");
    }

    pub(crate) fn print_number(&mut self, value: f64) {
        if value.is_nan() {
            self.write("NaN");
            return;
        }
        if value.is_infinite() {
            if value < 0.0 {
                self.write("-Infinity");
            } else {
                self.write("Infinity");
            }
            return;
        }
        if value < 0.0 || (value == 0.0 && value.is_sign_negative()) {
            self.write("-");
            self.print_number(-value);
            return;
        }
        if value.fract() == 0.0 && value.abs() < 9.007199254740992e15 {
            let text = format!("{}", value as u64);
            self.write(&text);
        } else {
            let text = format!("{value}");
            self.write(&text);
        }
    }
}

/// Atoms never need parentheses regardless of context.
fn is_atom(expr: &Expr) -> bool {
    matches!(
        expr.data,
        EData::Null
            | EData::Boolean(_)
            | EData::Number(_)
            | EData::String(_)
            | EData::BigInt(_)
            | EData::RegExp(_)
            | EData::This
            | EData::Identifier(_)
            | EData::ImportIdentifier(_)
            | EData::PrivateIdentifier(_)
            | EData::IdentifierName(_)
            | EData::Array(_)
            | EData::Template(_)
            | EData::NewTarget
            | EData::ImportMeta
            | EData::Missing
    )
}
