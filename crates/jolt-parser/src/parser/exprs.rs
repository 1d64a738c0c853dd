//! Expression parsing (pass 1).

use super::*;
use crate::ops::{Precedence, binary_op_info};

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self, level: Precedence) -> ParseResult<Expr> {
        let left = self.parse_prefix(level)?;
        self.parse_suffix(left, level)
    }

    /// Prefix operators, literals and primary expressions.
    fn parse_prefix(&mut self, level: Precedence) -> ParseResult<Expr> {
        let start = self.lexer.token_start;
        let span = self.lexer.span();

        match self.lexer.token {
            Token::NumericLiteral => {
                let value = self.lexer.number;
                self.check_legacy_octal();
                self.lexer.next();
                Ok(Expr::new(span, EData::Number(value)))
            }
            Token::BigIntLiteral => {
                let digits = self.lexer.bigint.clone();
                self.lexer.next();
                Ok(Expr::new(span, EData::BigInt(digits)))
            }
            Token::StringLiteral => {
                let value = self.lexer.string_value.clone();
                self.check_legacy_octal();
                self.lexer.next();
                Ok(Expr::new(span, EData::String(EString::new(value))))
            }
            Token::NoSubstitutionTemplateLiteral => {
                let cooked = self.lexer.string_value.clone();
                let raw = self.template_raw();
                self.lexer.next();
                Ok(Expr::new(
                    span,
                    EData::Template(Box::new(ETemplate {
                        tag: None,
                        head: cooked,
                        head_raw: raw,
                        parts: Vec::new(),
                    })),
                ))
            }
            Token::TemplateHead => {
                let template = self.parse_template_parts(None)?;
                Ok(Expr::new(
                    Span::new(start, self.lexer.token_end),
                    EData::Template(Box::new(template)),
                ))
            }
            Token::Slash | Token::SlashEquals => {
                self.lexer.rescan_regex();
                if self.lexer.token != Token::RegExpLiteral {
                    return Err(ParseError);
                }
                let raw = self.lexer.raw().to_string();
                let span = self.lexer.span();
                self.lexer.next();
                Ok(Expr::new(span, EData::RegExp(raw)))
            }
            Token::True => {
                self.lexer.next();
                Ok(Expr::new(span, EData::Boolean(true)))
            }
            Token::False => {
                self.lexer.next();
                Ok(Expr::new(span, EData::Boolean(false)))
            }
            Token::Null => {
                self.lexer.next();
                Ok(Expr::new(span, EData::Null))
            }
            Token::This => {
                self.lexer.next();
                Ok(Expr::new(span, EData::This))
            }
            Token::Super => {
                self.lexer.next();
                Ok(Expr::new(span, EData::Super))
            }
            Token::Identifier => {
                let name = self.lexer.identifier.clone();
                self.lexer.next();

                // `async` starts an async function/arrow when nothing
                // separates it from what follows
                if name == "async" && !self.lexer.has_newline_before {
                    if self.lexer.token == Token::Function {
                        return self.parse_function_expr(start, true);
                    }
                    if self.lexer.token == Token::OpenParen {
                        return self.parse_paren_or_arrow(start, true);
                    }
                    if self.lexer.token == Token::Identifier {
                        // `async x => ...`
                        let arg_name = self.lexer.identifier.clone();
                        let arg_span = self.lexer.span();
                        self.lexer.next();
                        if self.lexer.token == Token::Arrow {
                            return self.parse_single_arg_arrow(start, arg_name, arg_span, true);
                        }
                        self.unexpected();
                        return Err(ParseError);
                    }
                }

                // `yield` in generators
                if name == "yield" && self.fn_flags.in_generator {
                    return self.parse_yield(start, span);
                }

                // `await expr` in async contexts
                if name == "await" && self.fn_flags.in_async {
                    let value = self.parse_expr(Precedence::Prefix)?;
                    return Ok(Expr::new(
                        Span::new(start, value.span.end),
                        EData::Await(Box::new(value)),
                    ));
                }

                // Plain identifier, or `x => ...`
                if self.lexer.token == Token::Arrow && level <= Precedence::Assign {
                    return self.parse_single_arg_arrow(start, name, span, false);
                }
                Ok(Expr::new(span, EData::IdentifierName(name)))
            }
            Token::PrivateIdentifier => {
                // Only valid as `#field in obj`
                let name = self.lexer.identifier.clone();
                self.lexer.next();
                Ok(Expr::new(
                    span,
                    EData::PrivateIdentifierName(name),
                ))
            }
            Token::OpenParen => self.parse_paren_or_arrow(start, false),
            Token::OpenBracket => self.parse_array_literal(start),
            Token::OpenBrace => self.parse_object_literal(start),
            Token::Function => self.parse_function_expr(start, false),
            Token::Class => {
                self.lexer.next();
                let class = self.parse_class_tail(None)?;
                Ok(Expr::new(
                    Span::new(start, self.lexer.token_start),
                    EData::Class(Box::new(class)),
                ))
            }
            Token::New => {
                self.lexer.next();
                if self.eat(Token::Dot) {
                    // `new.target`
                    let (name, name_span) = self.expect_identifier()?;
                    if name != "target" {
                        self.error(name_span, format!("invalid property \"{name}\" after new."));
                        return Err(ParseError);
                    }
                    return Ok(Expr::new(Span::new(start, name_span.end), EData::NewTarget));
                }
                let target = self.parse_expr(Precedence::Member)?;
                let mut args = Vec::new();
                if self.lexer.token == Token::OpenParen {
                    args = self.parse_call_args()?;
                }
                Ok(Expr::new(
                    Span::new(start, self.lexer.token_start),
                    EData::New(Box::new(ENew { target, args })),
                ))
            }
            Token::Import => {
                self.lexer.next();
                if self.eat(Token::Dot) {
                    // `import.meta`
                    let (name, name_span) = self.expect_identifier()?;
                    if name != "meta" {
                        self.error(name_span, format!("invalid property \"{name}\" after import."));
                        return Err(ParseError);
                    }
                    return Ok(Expr::new(
                        Span::new(start, name_span.end),
                        EData::ImportMeta,
                    ));
                }
                self.expect(Token::OpenParen)?;
                let target = self.parse_expr(Precedence::Comma)?;
                // Trailing assertion argument is parsed and ignored
                if self.eat(Token::Comma) && self.lexer.token != Token::CloseParen {
                    self.parse_expr(Precedence::Comma)?;
                    self.eat(Token::Comma);
                }
                self.expect(Token::CloseParen)?;
                Ok(Expr::new(
                    Span::new(start, self.lexer.token_start),
                    EData::ImportCall(Box::new(EImportCall {
                        target,
                        import_record_index: None,
                    })),
                ))
            }
            Token::Exclamation => self.parse_unary(start, UnOp::Not),
            Token::Tilde => self.parse_unary(start, UnOp::BitNot),
            Token::Plus => self.parse_unary(start, UnOp::Pos),
            Token::Minus => self.parse_unary(start, UnOp::Neg),
            Token::TypeOf => self.parse_unary(start, UnOp::TypeOf),
            Token::Void => self.parse_unary(start, UnOp::Void),
            Token::Delete => self.parse_unary(start, UnOp::Delete),
            Token::PlusPlus => self.parse_unary(start, UnOp::PreInc),
            Token::MinusMinus => self.parse_unary(start, UnOp::PreDec),
            Token::DotDotDot if level <= Precedence::Spread => {
                self.lexer.next();
                let value = self.parse_expr(Precedence::Comma)?;
                Ok(Expr::new(
                    Span::new(start, value.span.end),
                    EData::Spread(Box::new(value)),
                ))
            }
            Token::LessThan => {
                if self.options.loader.allows_jsx() {
                    return self.parse_jsx_element(start);
                }
                if self.lexer.is_ts() {
                    // `<T>expr` type assertion: skip the type, keep the value
                    self.lexer.next();
                    self.skip_ts_type(true)?;
                    self.expect(Token::GreaterThan)?;
                    return self.parse_expr(Precedence::Prefix);
                }
                self.unexpected();
                Err(ParseError)
            }
            _ => {
                self.unexpected();
                Err(ParseError)
            }
        }
    }

    fn parse_unary(&mut self, start: u32, op: UnOp) -> ParseResult<Expr> {
        self.lexer.next();
        let value = self.parse_expr(Precedence::Prefix)?;
        Ok(Expr::new(
            Span::new(start, value.span.end),
            EData::Unary(Box::new(EUnary { op, value })),
        ))
    }

    fn parse_yield(&mut self, start: u32, span: Span) -> ParseResult<Expr> {
        let is_star = self.eat(Token::Asterisk);
        let value = if is_star
            || (!self.lexer.has_newline_before && self.lexer.token.can_start_expression())
        {
            Some(self.parse_expr(Precedence::Yield)?)
        } else {
            None
        };
        let end = value.as_ref().map(|v| v.span.end).unwrap_or(span.end);
        Ok(Expr::new(
            Span::new(start, end),
            EData::Yield(Box::new(EYield { value, is_star })),
        ))
    }

    /// Raw source of the current template chunk, without its one-byte
    /// leading delimiter (`` ` `` or `}`) and trailing `` ` `` or `${`.
    fn template_raw(&self) -> String {
        let raw = self.lexer.raw();
        let end = if raw.ends_with("${") {
            raw.len() - 2
        } else {
            raw.len() - 1
        };
        raw.get(1..end).unwrap_or("").to_string()
    }

    fn parse_template_parts(&mut self, tag: Option<Expr>) -> ParseResult<ETemplate> {
        debug_assert_eq!(self.lexer.token, Token::TemplateHead);
        let head = self.lexer.string_value.clone();
        let head_raw = self.template_raw();
        self.lexer.next();

        let mut parts = Vec::new();
        loop {
            let value = self.parse_expr(Precedence::Lowest)?;
            if self.lexer.token != Token::CloseBrace {
                self.unexpected();
                return Err(ParseError);
            }
            let token = self.lexer.rescan_template_part();
            let tail = self.lexer.string_value.clone();
            let tail_raw = self.template_raw();
            parts.push(TemplatePart {
                value,
                tail,
                tail_raw,
            });
            match token {
                Token::TemplateTail => {
                    self.lexer.next();
                    break;
                }
                Token::TemplateMiddle => self.lexer.next(),
                _ => return Err(ParseError),
            }
        }
        Ok(ETemplate {
            tag,
            head,
            head_raw,
            parts,
        })
    }

    /// Postfix: member access, calls, optional chains, binary operators,
    /// conditionals and template tags.
    pub(crate) fn parse_suffix(&mut self, mut left: Expr, level: Precedence) -> ParseResult<Expr> {
        loop {
            let start = left.span.start;
            match self.lexer.token {
                Token::Dot => {
                    self.lexer.next();
                    if self.lexer.token == Token::PrivateIdentifier {
                        let name = self.lexer.identifier.clone();
                        let name_span = self.lexer.span();
                        self.lexer.next();
                        left = Expr::new(
                            Span::new(start, name_span.end),
                            EData::Index(Box::new(EIndex {
                                target: left,
                                index: Expr::new(name_span, EData::PrivateIdentifierName(name)),
                                optional_chain: OptionalChain::None,
                            })),
                        );
                        continue;
                    }
                    let (name, name_span) = self.expect_identifier_like()?;
                    left = Expr::new(
                        Span::new(start, name_span.end),
                        EData::Dot(Box::new(EDot {
                            target: left,
                            name,
                            name_span,
                            optional_chain: OptionalChain::None,
                        })),
                    );
                }
                Token::QuestionDot => {
                    self.lexer.next();
                    left = match self.lexer.token {
                        Token::OpenParen => {
                            let args = self.parse_call_args()?;
                            Expr::new(
                                Span::new(start, self.lexer.token_start),
                                EData::Call(Box::new(ECall {
                                    target: left,
                                    args,
                                    optional_chain: OptionalChain::Start,
                                    is_direct_eval: false,
                                })),
                            )
                        }
                        Token::OpenBracket => {
                            self.lexer.next();
                            let index = self.parse_expr(Precedence::Lowest)?;
                            self.expect(Token::CloseBracket)?;
                            Expr::new(
                                Span::new(start, self.lexer.token_start),
                                EData::Index(Box::new(EIndex {
                                    target: left,
                                    index,
                                    optional_chain: OptionalChain::Start,
                                })),
                            )
                        }
                        _ => {
                            let (name, name_span) = self.expect_identifier_like()?;
                            Expr::new(
                                Span::new(start, name_span.end),
                                EData::Dot(Box::new(EDot {
                                    target: left,
                                    name,
                                    name_span,
                                    optional_chain: OptionalChain::Start,
                                })),
                            )
                        }
                    };
                    // Subsequent plain links continue the chain
                    left = self.parse_optional_chain_rest(left)?;
                }
                Token::OpenBracket if level < Precedence::Member => {
                    self.lexer.next();
                    let index = self.parse_expr(Precedence::Lowest)?;
                    self.expect(Token::CloseBracket)?;
                    left = Expr::new(
                        Span::new(start, self.lexer.token_start),
                        EData::Index(Box::new(EIndex {
                            target: left,
                            index,
                            optional_chain: OptionalChain::None,
                        })),
                    );
                }
                Token::OpenParen if level < Precedence::Call => {
                    let is_direct_eval = matches!(&left.data, EData::IdentifierName(n) if n == "eval");
                    let args = self.parse_call_args()?;
                    left = Expr::new(
                        Span::new(start, self.lexer.token_start),
                        EData::Call(Box::new(ECall {
                            target: left,
                            args,
                            optional_chain: OptionalChain::None,
                            is_direct_eval,
                        })),
                    );
                }
                Token::NoSubstitutionTemplateLiteral if level < Precedence::Prefix => {
                    let cooked = self.lexer.string_value.clone();
                    let raw = self.template_raw();
                    let end = self.lexer.token_end;
                    self.lexer.next();
                    left = Expr::new(
                        Span::new(start, end),
                        EData::Template(Box::new(ETemplate {
                            tag: Some(left),
                            head: cooked,
                            head_raw: raw,
                            parts: Vec::new(),
                        })),
                    );
                }
                Token::TemplateHead if level < Precedence::Prefix => {
                    let template = self.parse_template_parts(Some(left))?;
                    left = Expr::new(
                        Span::new(start, self.lexer.token_start),
                        EData::Template(Box::new(template)),
                    );
                }
                Token::PlusPlus if !self.lexer.has_newline_before && level < Precedence::Postfix => {
                    let end = self.lexer.token_end;
                    self.lexer.next();
                    left = Expr::new(
                        Span::new(start, end),
                        EData::Unary(Box::new(EUnary {
                            op: UnOp::PostInc,
                            value: left,
                        })),
                    );
                }
                Token::MinusMinus if !self.lexer.has_newline_before && level < Precedence::Postfix => {
                    let end = self.lexer.token_end;
                    self.lexer.next();
                    left = Expr::new(
                        Span::new(start, end),
                        EData::Unary(Box::new(EUnary {
                            op: UnOp::PostDec,
                            value: left,
                        })),
                    );
                }
                Token::Question if level < Precedence::Conditional => {
                    self.lexer.next();
                    let yes = self.parse_conditional_branch()?;
                    self.expect(Token::Colon)?;
                    let no = self.parse_expr(Precedence::Comma)?;
                    left = Expr::new(
                        Span::new(start, no.span.end),
                        EData::Conditional(Box::new(EConditional { test: left, yes, no })),
                    );
                }
                Token::Exclamation
                    if self.lexer.is_ts() && !self.lexer.has_newline_before
                        && level < Precedence::Postfix =>
                {
                    // TypeScript non-null assertion is erased
                    self.lexer.next();
                }
                Token::In if !self.fn_flags.allow_in => return Ok(left),
                Token::LessThan
                    if self.lexer.is_ts() && !self.options.loader.allows_jsx() =>
                {
                    // `f<T>(x)` / `new Map<K, V>()`: probe a type-argument
                    // list; on mismatch this is an ordinary comparison
                    let snapshot = self.snapshot();
                    if self.probe(|p| p.skip_ts_type_arguments()).is_ok()
                        && matches!(
                            self.lexer.token,
                            Token::OpenParen | Token::NoSubstitutionTemplateLiteral
                                | Token::TemplateHead
                        )
                    {
                        if self.lexer.token == Token::OpenParen && level >= Precedence::Call {
                            // The caller consumes the argument list
                            return Ok(left);
                        }
                        continue;
                    }
                    self.restore(snapshot);
                    let Some((op, op_level, right_assoc)) = binary_op_info(self.lexer.token)
                    else {
                        return Ok(left);
                    };
                    if op_level <= level {
                        return Ok(left);
                    }
                    self.lexer.next();
                    let right_level = if right_assoc { op_level.lower() } else { op_level };
                    let right = self.parse_expr(right_level)?;
                    left = Expr::new(
                        Span::new(start, right.span.end),
                        EData::Binary(Box::new(EBinary { op, left, right })),
                    );
                }
                _ => {
                    // TypeScript `as` / `satisfies` erase to their operand
                    if self.lexer.is_ts()
                        && level < Precedence::Compare
                        && !self.lexer.has_newline_before
                        && (self.lexer.is_contextual("as") || self.lexer.is_contextual("satisfies"))
                    {
                        self.lexer.next();
                        if self.eat_contextual("const") {
                            continue;
                        }
                        self.skip_ts_type(false)?;
                        continue;
                    }

                    let Some((op, op_level, right_assoc)) = binary_op_info(self.lexer.token) else {
                        return Ok(left);
                    };
                    if op_level <= level {
                        return Ok(left);
                    }
                    self.lexer.next();
                    let right_level = if right_assoc { op_level.lower() } else { op_level };
                    let right = self.parse_expr(right_level)?;
                    left = Expr::new(
                        Span::new(start, right.span.end),
                        EData::Binary(Box::new(EBinary { op, left, right })),
                    );
                }
            }
        }
    }

    /// After an optional link, plain `.x`, `[i]` and `(...)` links stay
    /// inside the chain until something else stops it.
    fn parse_optional_chain_rest(&mut self, mut left: Expr) -> ParseResult<Expr> {
        loop {
            let start = left.span.start;
            match self.lexer.token {
                Token::Dot => {
                    self.lexer.next();
                    let (name, name_span) = self.expect_identifier_like()?;
                    left = Expr::new(
                        Span::new(start, name_span.end),
                        EData::Dot(Box::new(EDot {
                            target: left,
                            name,
                            name_span,
                            optional_chain: OptionalChain::Continue,
                        })),
                    );
                }
                Token::OpenBracket => {
                    self.lexer.next();
                    let index = self.parse_expr(Precedence::Lowest)?;
                    self.expect(Token::CloseBracket)?;
                    left = Expr::new(
                        Span::new(start, self.lexer.token_start),
                        EData::Index(Box::new(EIndex {
                            target: left,
                            index,
                            optional_chain: OptionalChain::Continue,
                        })),
                    );
                }
                Token::OpenParen => {
                    let args = self.parse_call_args()?;
                    left = Expr::new(
                        Span::new(start, self.lexer.token_start),
                        EData::Call(Box::new(ECall {
                            target: left,
                            args,
                            optional_chain: OptionalChain::Continue,
                            is_direct_eval: false,
                        })),
                    );
                }
                _ => return Ok(left),
            }
        }
    }

    /// The true branch of `?:` permits `in` regardless of the flag and
    /// parses assignments but not commas.
    fn parse_conditional_branch(&mut self) -> ParseResult<Expr> {
        let old_allow_in = self.fn_flags.allow_in;
        self.fn_flags.allow_in = true;
        let result = self.parse_expr(Precedence::Comma);
        self.fn_flags.allow_in = old_allow_in;
        result
    }

    pub(crate) fn parse_call_args(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect(Token::OpenParen)?;
        let mut args = Vec::new();
        while self.lexer.token != Token::CloseParen {
            args.push(self.parse_expr(Precedence::Comma)?);
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::CloseParen)?;
        Ok(args)
    }

    fn parse_array_literal(&mut self, start: u32) -> ParseResult<Expr> {
        self.expect(Token::OpenBracket)?;
        let mut items = Vec::new();
        while self.lexer.token != Token::CloseBracket {
            if self.lexer.token == Token::Comma {
                items.push(Expr::new(Span::at(self.lexer.token_start), EData::Missing));
                self.lexer.next();
                continue;
            }
            items.push(self.parse_expr(Precedence::Comma)?);
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::CloseBracket)?;
        Ok(Expr::new(
            Span::new(start, self.lexer.token_start),
            EData::Array(EArray { items }),
        ))
    }

    fn parse_object_literal(&mut self, start: u32) -> ParseResult<Expr> {
        self.expect(Token::OpenBrace)?;
        let mut properties = Vec::new();
        while self.lexer.token != Token::CloseBrace {
            properties.push(self.parse_property()?);
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::CloseBrace)?;
        Ok(Expr::new(
            Span::new(start, self.lexer.token_start),
            EData::Object(EObject { properties }),
        ))
    }

    fn parse_property(&mut self) -> ParseResult<Property> {
        if self.eat(Token::DotDotDot) {
            let value = self.parse_expr(Precedence::Comma)?;
            return Ok(Property::spread(value));
        }

        let mut kind = PropertyKind::Normal;
        let mut is_async = false;
        let mut is_generator = false;

        // get / set / async prefixes only count when a key follows
        if self.lexer.token == Token::Identifier {
            let prefix = self.lexer.identifier.clone();
            if matches!(prefix.as_str(), "get" | "set" | "async") {
                let snapshot = self.lexer.snapshot();
                self.lexer.next();
                if self.property_key_follows() {
                    match prefix.as_str() {
                        "get" => kind = PropertyKind::Get,
                        "set" => kind = PropertyKind::Set,
                        _ => is_async = true,
                    }
                } else {
                    self.lexer.restore(snapshot);
                }
            }
        }
        if self.lexer.token == Token::Asterisk {
            is_generator = true;
            self.lexer.next();
        }

        let (key, is_computed) = self.parse_property_key()?;

        // Method shorthand
        if self.lexer.token == Token::OpenParen {
            let func = self.parse_fn_body_for_method(is_async, is_generator)?;
            return Ok(Property {
                kind,
                key: Some(key),
                is_computed,
                is_method: kind == PropertyKind::Normal,
                is_static: false,
                is_shorthand: false,
                value: Some(Expr::new(
                    Span::dummy(),
                    EData::Function(Box::new(func)),
                )),
                initializer: None,
            });
        }

        if kind != PropertyKind::Normal || is_async || is_generator {
            self.unexpected();
            return Err(ParseError);
        }

        // `{key: value}`
        if self.eat(Token::Colon) {
            let value = self.parse_expr(Precedence::Comma)?;
            return Ok(Property {
                kind,
                key: Some(key),
                is_computed,
                is_method: false,
                is_static: false,
                is_shorthand: false,
                value: Some(value),
                initializer: None,
            });
        }

        // Shorthand `{x}` and destructuring default `{x = 1}`
        let name = match &key.data {
            EData::String(string) => string.value.clone(),
            _ => {
                self.unexpected();
                return Err(ParseError);
            }
        };
        let initializer = if self.eat(Token::Equals) {
            Some(self.parse_expr(Precedence::Comma)?)
        } else {
            None
        };
        Ok(Property {
            kind,
            key: Some(key.clone()),
            is_computed: false,
            is_method: false,
            is_static: false,
            is_shorthand: true,
            value: Some(Expr::new(key.span, EData::IdentifierName(name))),
            initializer,
        })
    }

    fn property_key_follows(&self) -> bool {
        matches!(
            self.lexer.token,
            Token::Identifier
                | Token::StringLiteral
                | Token::NumericLiteral
                | Token::OpenBracket
                | Token::Asterisk
                | Token::PrivateIdentifier
        ) || self.lexer.token.is_keyword()
    }

    /// Property keys cook to strings except computed keys, which stay
    /// expressions.
    pub(crate) fn parse_property_key(&mut self) -> ParseResult<(Expr, bool)> {
        let span = self.lexer.span();
        match self.lexer.token {
            Token::OpenBracket => {
                self.lexer.next();
                let key = self.parse_expr(Precedence::Comma)?;
                self.expect(Token::CloseBracket)?;
                Ok((key, true))
            }
            Token::NumericLiteral => {
                let value = self.lexer.number;
                self.lexer.next();
                Ok((Expr::new(span, EData::Number(value)), false))
            }
            Token::StringLiteral => {
                let value = self.lexer.string_value.clone();
                self.lexer.next();
                Ok((Expr::new(span, EData::String(EString::new(value))), false))
            }
            Token::PrivateIdentifier => {
                let name = self.lexer.identifier.clone();
                self.lexer.next();
                Ok((Expr::new(span, EData::PrivateIdentifierName(name)), false))
            }
            _ => {
                let (name, name_span) = self.expect_identifier_like()?;
                Ok((
                    Expr::new(name_span, EData::String(EString::new(name))),
                    false,
                ))
            }
        }
    }

    // =========================================================================
    // Functions and arrows
    // =========================================================================

    fn parse_function_expr(&mut self, start: u32, is_async: bool) -> ParseResult<Expr> {
        self.expect(Token::Function)?;
        let is_generator = self.eat(Token::Asterisk);

        // A function expression's name lives in its own scope
        let name = if self.lexer.token == Token::Identifier {
            let (name, name_span) = self.expect_identifier()?;
            Some((name, name_span))
        } else {
            None
        };

        let args_scope = self.push_scope(ScopeKind::FunctionArgs);
        let name_ref = name.map(|(name, name_span)| {
            self.declare_symbol(SymbolKind::HoistedFunction, name, name_span)
        });
        let func = self.parse_fn_signature_and_body(name_ref, is_async, is_generator)?;
        self.pop_scope();
        let _ = args_scope;

        Ok(Expr::new(
            Span::new(start, self.lexer.token_start),
            EData::Function(Box::new(func)),
        ))
    }

    /// Shared function machinery: assumes the args scope is already
    /// pushed and the name (if any) declared.
    pub(crate) fn parse_fn_signature_and_body(
        &mut self,
        name: Option<Ref>,
        is_async: bool,
        is_generator: bool,
    ) -> ParseResult<Func> {
        if self.lexer.is_ts() && self.lexer.token == Token::LessThan {
            self.skip_ts_type_parameters()?;
        }
        let (args, has_rest_arg) = self.parse_fn_args()?;

        // TypeScript return type
        if self.lexer.is_ts() && self.eat(Token::Colon) {
            self.skip_ts_type_or_predicate()?;
        }

        let old_flags = self.fn_flags;
        self.fn_flags = FnFlags {
            in_async: is_async,
            in_generator: is_generator,
            allow_in: true,
        };

        self.expect(Token::OpenBrace)?;
        self.push_scope(ScopeKind::FunctionBody);
        let body = self.parse_stmts_until_close_brace()?;
        self.pop_scope();
        self.fn_flags = old_flags;

        Ok(Func {
            name,
            args,
            has_rest_arg,
            is_async,
            is_generator,
            body,
        })
    }

    /// Method value: pushes its own args scope.
    pub(crate) fn parse_fn_body_for_method(
        &mut self,
        is_async: bool,
        is_generator: bool,
    ) -> ParseResult<Func> {
        self.push_scope(ScopeKind::FunctionArgs);
        let func = self.parse_fn_signature_and_body(None, is_async, is_generator);
        self.pop_scope();
        func
    }

    pub(crate) fn parse_fn_args(&mut self) -> ParseResult<(Vec<Arg>, bool)> {
        self.expect(Token::OpenParen)?;
        let mut args = Vec::new();
        let mut has_rest_arg = false;
        while self.lexer.token != Token::CloseParen {
            if self.eat(Token::DotDotDot) {
                has_rest_arg = true;
                let binding = self.parse_binding(SymbolKind::Hoisted)?;
                self.skip_ts_annotation()?;
                args.push(Arg {
                    binding,
                    default: None,
                    is_parameter_property: false,
                });
                break;
            }

            // TypeScript parameter properties and `this` parameters
            let mut is_parameter_property = false;
            if self.lexer.is_ts() {
                while self.lexer.token == Token::Identifier
                    && matches!(
                        self.lexer.identifier.as_str(),
                        "public" | "private" | "protected" | "readonly"
                    )
                {
                    let snapshot = self.lexer.snapshot();
                    self.lexer.next();
                    if self.lexer.token == Token::Identifier
                        || self.lexer.token == Token::OpenBrace
                        || self.lexer.token == Token::OpenBracket
                        || matches!(self.lexer.identifier.as_str(), "readonly")
                    {
                        is_parameter_property = true;
                    } else {
                        self.lexer.restore(snapshot);
                        break;
                    }
                }
                if self.lexer.token == Token::This {
                    // `this: Type` is erased entirely
                    self.lexer.next();
                    self.skip_ts_annotation()?;
                    if !self.eat(Token::Comma) {
                        break;
                    }
                    continue;
                }
            }

            let binding = self.parse_binding(SymbolKind::Hoisted)?;
            // Optional marker and type annotation
            if self.lexer.is_ts() {
                self.eat(Token::Question);
            }
            self.skip_ts_annotation()?;
            let default = if self.eat(Token::Equals) {
                Some(self.parse_expr(Precedence::Comma)?)
            } else {
                None
            };
            args.push(Arg {
                binding,
                default,
                is_parameter_property,
            });
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::CloseParen)?;
        Ok((args, has_rest_arg))
    }

    fn parse_single_arg_arrow(
        &mut self,
        start: u32,
        name: String,
        name_span: Span,
        is_async: bool,
    ) -> ParseResult<Expr> {
        self.push_scope(ScopeKind::FunctionArgs);
        let reference = self.declare_symbol(SymbolKind::Hoisted, name, name_span);
        let arrow = self.parse_arrow_body(
            vec![Arg {
                binding: Binding {
                    span: name_span,
                    data: BData::Identifier(reference),
                },
                default: None,
                is_parameter_property: false,
            }],
            false,
            is_async,
        )?;
        self.pop_scope();
        Ok(Expr::new(
            Span::new(start, self.lexer.token_start),
            EData::Arrow(Box::new(arrow)),
        ))
    }

    /// Assumes the args scope is current and the `=>` token is next.
    pub(crate) fn parse_arrow_body(
        &mut self,
        args: Vec<Arg>,
        has_rest_arg: bool,
        is_async: bool,
    ) -> ParseResult<EArrow> {
        self.expect(Token::Arrow)?;
        let scope = self.current_scope();
        self.scopes[scope.idx()].forbids_arguments = true;

        let old_flags = self.fn_flags;
        self.fn_flags = FnFlags {
            in_async: is_async,
            // Arrows inherit the generator-ness of nothing: yield is not
            // allowed in arrow bodies
            in_generator: false,
            allow_in: true,
        };

        let arrow = if self.lexer.token == Token::OpenBrace {
            self.lexer.next();
            self.push_scope(ScopeKind::FunctionBody);
            let body = self.parse_stmts_until_close_brace()?;
            self.pop_scope();
            EArrow {
                args,
                has_rest_arg,
                is_async,
                prefer_expr: false,
                body,
            }
        } else {
            let value = self.parse_expr(Precedence::Comma)?;
            let span = value.span;
            EArrow {
                args,
                has_rest_arg,
                is_async,
                prefer_expr: true,
                body: vec![Stmt::new(span, SData::Return(Some(value)))],
            }
        };
        self.fn_flags = old_flags;
        Ok(arrow)
    }

    /// `(` in expression position: either a parenthesized expression or
    /// an arrow function's argument list. The contents parse inside a
    /// fresh scope as expressions; if no `=>` follows, the scope is
    /// flattened into its parent and the expressions stand on their own.
    fn parse_paren_or_arrow(&mut self, start: u32, is_async: bool) -> ParseResult<Expr> {
        let scope = self.push_scope(ScopeKind::FunctionArgs);
        self.expect(Token::OpenParen)?;

        let mut items = Vec::new();
        let mut spread_span: Option<Span> = None;
        let old_allow_in = self.fn_flags.allow_in;
        self.fn_flags.allow_in = true;
        while self.lexer.token != Token::CloseParen {
            if self.lexer.token == Token::DotDotDot {
                spread_span = Some(self.lexer.span());
            }
            let item = self.parse_expr(Precedence::Spread);
            match item {
                Ok(item) => items.push(item),
                Err(err) => {
                    self.fn_flags.allow_in = old_allow_in;
                    self.pop_and_flatten_scope(scope);
                    return Err(err);
                }
            }
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.fn_flags.allow_in = old_allow_in;
        if self.expect(Token::CloseParen).is_err() {
            self.pop_and_flatten_scope(scope);
            return Err(ParseError);
        }

        // TypeScript: `(x): T => ...` — probe the return type, fall back
        // to a parenthesized expression when no arrow follows. This is
        // the ambiguous `a ? (b) : c => d : e` case.
        let mut is_arrow = self.lexer.token == Token::Arrow;
        if !is_arrow && self.lexer.is_ts() && self.lexer.token == Token::Colon {
            let snapshot = self.snapshot();
            self.lexer.next();
            let probed =
                self.probe(|p| p.skip_ts_type_or_predicate()).is_ok() && self.lexer.token == Token::Arrow;
            if probed {
                is_arrow = true;
            } else {
                self.restore(snapshot);
            }
        }

        if is_arrow {
            let mut args = Vec::new();
            let mut has_rest_arg = false;
            for item in items {
                let (binding, default) = self.expr_to_binding(item, &mut has_rest_arg)?;
                args.push(Arg {
                    binding,
                    default,
                    is_parameter_property: false,
                });
            }
            let arrow = self.parse_arrow_body(args, has_rest_arg, is_async)?;
            self.pop_scope();
            return Ok(Expr::new(
                Span::new(start, self.lexer.token_start),
                EData::Arrow(Box::new(arrow)),
            ));
        }

        // Not an arrow: the scope was never real
        self.pop_and_flatten_scope(scope);

        if let Some(span) = spread_span {
            self.error(span, "unexpected \"...\"");
            return Err(ParseError);
        }
        if is_async {
            // `async(...)` is a plain call
            let target = Expr::new(
                Span::new(start, start + 5),
                EData::IdentifierName("async".to_string()),
            );
            return Ok(Expr::new(
                Span::new(start, self.lexer.token_start),
                EData::Call(Box::new(ECall {
                    target,
                    args: items,
                    optional_chain: OptionalChain::None,
                    is_direct_eval: false,
                })),
            ));
        }
        let mut iter = items.into_iter();
        let Some(mut expr) = iter.next() else {
            self.error(Span::at(start), "unexpected \")\"");
            return Err(ParseError);
        };
        for next in iter {
            let span = Span::new(expr.span.start, next.span.end);
            expr = Expr::new(
                span,
                EData::Binary(Box::new(EBinary {
                    op: BinOp::Comma,
                    left: expr,
                    right: next,
                })),
            );
        }
        Ok(Expr::new(Span::new(start, self.lexer.token_start), expr.data))
    }

    /// Reinterpret an expression parsed in arrow-argument position as a
    /// binding pattern, declaring its symbols in the current scope.
    fn expr_to_binding(
        &mut self,
        expr: Expr,
        has_rest_arg: &mut bool,
    ) -> ParseResult<(Binding, Option<Expr>)> {
        let span = expr.span;
        match expr.data {
            EData::IdentifierName(name) => {
                let reference = self.declare_symbol(SymbolKind::Hoisted, name, span);
                Ok((
                    Binding {
                        span,
                        data: BData::Identifier(reference),
                    },
                    None,
                ))
            }
            EData::Binary(binary) if binary.op == BinOp::Assign => {
                let (binding, _) = self.expr_to_binding(binary.left, has_rest_arg)?;
                Ok((binding, Some(binary.right)))
            }
            EData::Spread(value) => {
                *has_rest_arg = true;
                self.expr_to_binding(*value, has_rest_arg)
            }
            EData::Array(array) => {
                let mut items = Vec::new();
                let mut has_spread = false;
                for item in array.items {
                    match item.data {
                        EData::Missing => items.push(BArrayItem {
                            binding: Binding {
                                span: item.span,
                                data: BData::Missing,
                            },
                            default: None,
                        }),
                        EData::Spread(value) => {
                            has_spread = true;
                            let (binding, default) = self.expr_to_binding(*value, has_rest_arg)?;
                            items.push(BArrayItem { binding, default });
                        }
                        _ => {
                            let (binding, default) = self.expr_to_binding(item, has_rest_arg)?;
                            items.push(BArrayItem { binding, default });
                        }
                    }
                }
                Ok((
                    Binding {
                        span,
                        data: BData::Array(BArray { items, has_spread }),
                    },
                    None,
                ))
            }
            EData::Object(object) => {
                let mut properties = Vec::new();
                for property in object.properties {
                    match property.kind {
                        PropertyKind::Spread => {
                            let value = property.value.expect("spread property with no value");
                            let (binding, _) = self.expr_to_binding(value, has_rest_arg)?;
                            properties.push(BProperty {
                                key: Expr::new(Span::dummy(), EData::Missing),
                                is_computed: false,
                                is_spread: true,
                                binding,
                                default: None,
                            });
                        }
                        PropertyKind::Normal => {
                            let key = property.key.expect("property with no key");
                            let value = property.value.expect("property with no value");
                            let (binding, default) = self.expr_to_binding(value, has_rest_arg)?;
                            properties.push(BProperty {
                                key,
                                is_computed: property.is_computed,
                                is_spread: false,
                                binding,
                                default: default.or(property.initializer),
                            });
                        }
                        _ => {
                            self.error(span, "invalid binding pattern");
                            return Err(ParseError);
                        }
                    }
                }
                Ok((
                    Binding {
                        span,
                        data: BData::Object(BObject { properties }),
                    },
                    None,
                ))
            }
            _ => {
                self.error(span, "invalid binding pattern");
                Err(ParseError)
            }
        }
    }

    // =========================================================================
    // Binding patterns (declaration position)
    // =========================================================================

    /// Parse a binding pattern, declaring identifiers with `kind`.
    pub(crate) fn parse_binding(&mut self, kind: SymbolKind) -> ParseResult<Binding> {
        let start = self.lexer.token_start;
        match self.lexer.token {
            Token::Identifier => {
                let (name, span) = self.expect_identifier()?;
                if self.is_strict_mode() && matches!(name.as_str(), "eval" | "arguments") {
                    self.error(
                        span,
                        format!("\"{name}\" cannot be bound in strict mode"),
                    );
                }
                let reference = self.declare_symbol(kind, name, span);
                Ok(Binding {
                    span,
                    data: BData::Identifier(reference),
                })
            }
            Token::OpenBracket => {
                self.lexer.next();
                let mut items = Vec::new();
                let mut has_spread = false;
                while self.lexer.token != Token::CloseBracket {
                    if self.lexer.token == Token::Comma {
                        items.push(BArrayItem {
                            binding: Binding {
                                span: Span::at(self.lexer.token_start),
                                data: BData::Missing,
                            },
                            default: None,
                        });
                        self.lexer.next();
                        continue;
                    }
                    if self.eat(Token::DotDotDot) {
                        has_spread = true;
                        let binding = self.parse_binding(kind)?;
                        items.push(BArrayItem {
                            binding,
                            default: None,
                        });
                        break;
                    }
                    let binding = self.parse_binding(kind)?;
                    let default = if self.eat(Token::Equals) {
                        Some(self.parse_expr(Precedence::Comma)?)
                    } else {
                        None
                    };
                    items.push(BArrayItem { binding, default });
                    if !self.eat(Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::CloseBracket)?;
                Ok(Binding {
                    span: Span::new(start, self.lexer.token_start),
                    data: BData::Array(BArray { items, has_spread }),
                })
            }
            Token::OpenBrace => {
                self.lexer.next();
                let mut properties = Vec::new();
                while self.lexer.token != Token::CloseBrace {
                    if self.eat(Token::DotDotDot) {
                        let binding = self.parse_binding(kind)?;
                        properties.push(BProperty {
                            key: Expr::new(Span::dummy(), EData::Missing),
                            is_computed: false,
                            is_spread: true,
                            binding,
                            default: None,
                        });
                        break;
                    }
                    let (key, is_computed) = self.parse_property_key()?;
                    let binding = if self.eat(Token::Colon) {
                        self.parse_binding(kind)?
                    } else {
                        // Shorthand: the key doubles as the binding
                        let name = match &key.data {
                            EData::String(string) => string.value.clone(),
                            _ => {
                                self.unexpected();
                                return Err(ParseError);
                            }
                        };
                        let reference = self.declare_symbol(kind, name, key.span);
                        Binding {
                            span: key.span,
                            data: BData::Identifier(reference),
                        }
                    };
                    let default = if self.eat(Token::Equals) {
                        Some(self.parse_expr(Precedence::Comma)?)
                    } else {
                        None
                    };
                    properties.push(BProperty {
                        key,
                        is_computed,
                        is_spread: false,
                        binding,
                        default,
                    });
                    if !self.eat(Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::CloseBrace)?;
                Ok(Binding {
                    span: Span::new(start, self.lexer.token_start),
                    data: BData::Object(BObject { properties }),
                })
            }
            _ => {
                self.unexpected();
                Err(ParseError)
            }
        }
    }
}
