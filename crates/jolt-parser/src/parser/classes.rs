//! Class parsing (pass 1), shared by declarations and expressions.

use super::*;
use crate::ops::Precedence;

impl<'a> Parser<'a> {
    /// Parse everything after the `class` keyword and optional name. The
    /// caller declares a declaration's name in the enclosing scope and
    /// passes it in so the class body can see it.
    pub(crate) fn parse_class_tail(&mut self, name: Option<(String, Ref)>) -> ParseResult<Class> {
        let class_name_scope = self.push_scope(ScopeKind::ClassName);

        let name_ref = match name {
            Some((name, reference)) => {
                // The declaration's symbol doubles as the inner binding
                self.scopes[class_name_scope.idx()]
                    .members
                    .insert(name, reference);
                Some(reference)
            }
            None if self.lexer.token == Token::Identifier => {
                // Class expression with a name: visible only inside
                let (name, name_span) = self.expect_identifier()?;
                Some(self.declare_symbol(SymbolKind::Class, name, name_span))
            }
            None => None,
        };

        if self.lexer.is_ts() && self.lexer.token == Token::LessThan {
            self.skip_ts_type_parameters()?;
        }

        let extends = if self.eat(Token::Extends) {
            let value = self.parse_expr(Precedence::New)?;
            if self.lexer.is_ts() && self.lexer.token == Token::LessThan {
                self.skip_ts_type_arguments()?;
            }
            Some(value)
        } else {
            None
        };
        if self.lexer.is_ts() && self.eat_contextual("implements") {
            loop {
                self.skip_ts_type(false)?;
                if !self.eat(Token::Comma) {
                    break;
                }
            }
        }

        self.expect(Token::OpenBrace)?;
        self.push_scope(ScopeKind::ClassBody);
        // Class bodies are always strict
        let body_scope = self.current_scope();
        self.scopes[body_scope.idx()].strict_mode = true;

        let mut members = Vec::new();
        while self.lexer.token != Token::CloseBrace {
            if self.eat(Token::Semicolon) {
                continue;
            }
            if let Some(member) = self.parse_class_member()? {
                members.push(member);
            }
        }
        self.lexer.next();
        self.pop_scope();
        self.pop_scope();

        Ok(Class {
            name: name_ref,
            extends,
            members,
        })
    }

    /// Returns `None` for members that are erased (TypeScript
    /// declarations, abstract members, index signatures).
    fn parse_class_member(&mut self) -> ParseResult<Option<ClassMember>> {
        if self.lexer.token == Token::At {
            self.error(self.lexer.span(), "decorators are not supported");
            return Err(ParseError);
        }

        let mut is_static = false;
        let mut is_async = false;
        let mut is_generator = false;
        let mut kind_prefix: Option<PropertyKind> = None;

        // TypeScript visibility and ambient modifiers are erased
        loop {
            if self.lexer.is_ts() && self.lexer.token == Token::Identifier {
                match self.lexer.identifier.as_str() {
                    "public" | "private" | "protected" | "readonly" | "override" | "abstract"
                    | "declare" => {
                        let snapshot = self.lexer.snapshot();
                        let was_abstract_or_declare = matches!(
                            self.lexer.identifier.as_str(),
                            "abstract" | "declare"
                        );
                        self.lexer.next();
                        if self.class_member_name_follows() {
                            if was_abstract_or_declare {
                                // Parse the member, then discard it. Any
                                // scopes its initializers pushed rewind
                                // with the snapshot so the pass 2 replay
                                // never sees them.
                                let probe = self.snapshot();
                                let parsed = self.probe(|p| {
                                    p.parse_class_member_core(false, false, false, None)
                                });
                                let lexer_state = self.lexer.snapshot();
                                self.restore(probe);
                                self.lexer.restore(lexer_state);
                                parsed?;
                                return Ok(None);
                            }
                            continue;
                        }
                        self.lexer.restore(snapshot);
                        break;
                    }
                    _ => break,
                }
            } else {
                break;
            }
        }

        if self.lexer.is_contextual("static") {
            let snapshot = self.lexer.snapshot();
            self.lexer.next();
            if self.lexer.token == Token::OpenBrace {
                // Static initialization block
                self.lexer.next();
                self.push_scope(ScopeKind::ClassStaticInit);
                let body = self.parse_stmts_until_close_brace()?;
                self.pop_scope();
                return Ok(Some(ClassMember::StaticBlock(body)));
            }
            if self.class_member_name_follows() || self.lexer.token == Token::Asterisk {
                is_static = true;
            } else {
                self.lexer.restore(snapshot);
            }
        }

        if self.lexer.is_contextual("async") {
            let snapshot = self.lexer.snapshot();
            self.lexer.next();
            if !self.lexer.has_newline_before
                && (self.class_member_name_follows() || self.lexer.token == Token::Asterisk)
            {
                is_async = true;
            } else {
                self.lexer.restore(snapshot);
            }
        }
        if self.eat(Token::Asterisk) {
            is_generator = true;
        }
        if !is_async && !is_generator
            && (self.lexer.is_contextual("get") || self.lexer.is_contextual("set"))
        {
            let prefix = self.lexer.identifier.clone();
            let snapshot = self.lexer.snapshot();
            self.lexer.next();
            if self.class_member_name_follows() {
                kind_prefix = Some(if prefix == "get" {
                    PropertyKind::Get
                } else {
                    PropertyKind::Set
                });
            } else {
                self.lexer.restore(snapshot);
            }
        }

        self.parse_class_member_core(is_static, is_async, is_generator, kind_prefix)
    }

    fn class_member_name_follows(&self) -> bool {
        matches!(
            self.lexer.token,
            Token::Identifier
                | Token::PrivateIdentifier
                | Token::StringLiteral
                | Token::NumericLiteral
                | Token::OpenBracket
        ) || self.lexer.token.is_keyword()
    }

    fn parse_class_member_core(
        &mut self,
        is_static: bool,
        is_async: bool,
        is_generator: bool,
        kind_prefix: Option<PropertyKind>,
    ) -> ParseResult<Option<ClassMember>> {
        let (key, is_computed) = self.parse_property_key()?;

        // Private names declare symbols in the class-body scope so the
        // minifier can slot them independently of regular identifiers
        let key = if let EData::PrivateIdentifierName(name) = &key.data {
            let kind = if self.lexer.token == Token::OpenParen {
                SymbolKind::PrivateMethod
            } else {
                SymbolKind::PrivateField
            };
            let reference = self.declare_symbol(kind, name.clone(), key.span);
            Expr::new(key.span, EData::PrivateIdentifier(EIdentifier { reference }))
        } else {
            key
        };

        // Method?
        let is_method_start = self.lexer.token == Token::OpenParen
            || (self.lexer.is_ts() && self.lexer.token == Token::LessThan);
        if is_method_start {
            let kind = match kind_prefix {
                Some(PropertyKind::Get) => MethodKind::Get,
                Some(PropertyKind::Set) => MethodKind::Set,
                _ => {
                    let is_ctor = !is_computed
                        && !is_static
                        && matches!(&key.data, EData::String(s) if s.value == "constructor");
                    if is_ctor {
                        MethodKind::Constructor
                    } else {
                        MethodKind::Method
                    }
                }
            };

            // TypeScript method overloads have no body; erase them
            if self.lexer.is_ts() {
                let probe = self.snapshot();
                let scope_before = self.current_scope();
                let is_overload = self.probe(|p| {
                    if p.lexer.token == Token::LessThan && p.skip_ts_type_parameters().is_err() {
                        return false;
                    }
                    let scope = p.push_scope(ScopeKind::FunctionArgs);
                    let signature_ok = p.parse_fn_args().is_ok()
                        && (p.lexer.token != Token::Colon || {
                            p.lexer.next();
                            p.skip_ts_type_or_predicate().is_ok()
                        });
                    let _ = scope;
                    signature_ok && p.lexer.token != Token::OpenBrace
                });
                if is_overload {
                    self.eat(Token::Semicolon);
                    // The probe's scopes vanish with the snapshot arenas
                    let lexer_state = self.lexer.snapshot();
                    self.restore(probe);
                    self.lexer.restore(lexer_state);
                    debug_assert_eq!(self.current_scope(), scope_before);
                    return Ok(None);
                }
                self.restore(probe);
            }

            let func = self.parse_fn_body_for_method(is_async, is_generator)?;
            return Ok(Some(ClassMember::Method(ClassMethod {
                kind,
                key,
                is_computed,
                is_static,
                func,
            })));
        }

        if kind_prefix.is_some() || is_async || is_generator {
            self.unexpected();
            return Err(ParseError);
        }

        // Field: optional `?`/`!` markers and type annotation, then an
        // optional initializer
        if self.lexer.is_ts() {
            self.eat(Token::Question);
            self.eat(Token::Exclamation);
        }
        self.skip_ts_annotation()?;
        let value = if self.eat(Token::Equals) {
            Some(self.parse_expr(Precedence::Comma)?)
        } else {
            None
        };
        self.expect_semicolon()?;
        Ok(Some(ClassMember::Field(ClassField {
            key,
            is_computed,
            is_static,
            value,
        })))
    }
}
