//! Statement parsing (pass 1).

use super::*;
use crate::ops::Precedence;

impl<'a> Parser<'a> {
    pub(crate) fn parse_stmts_until_close_brace(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        let mut directive_prologue = true;
        while self.lexer.token != Token::CloseBrace {
            if self.lexer.token == Token::EndOfFile || self.lexer.token == Token::SyntaxError {
                self.unexpected();
                return Err(ParseError);
            }
            let stmt = self.parse_stmt()?;
            if directive_prologue {
                match &stmt.data {
                    SData::Directive(text) => {
                        if text == "use strict" {
                            let scope = self.current_scope();
                            self.scopes[scope.idx()].strict_mode = true;
                        }
                    }
                    _ => directive_prologue = false,
                }
            }
            stmts.push(stmt);
        }
        self.lexer.next();
        Ok(stmts)
    }

    pub(crate) fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.lexer.token_start;
        let span = self.lexer.span();

        match self.lexer.token {
            Token::Semicolon => {
                self.lexer.next();
                Ok(Stmt::new(span, SData::Empty))
            }
            Token::OpenBrace => {
                self.lexer.next();
                self.push_scope(ScopeKind::Block);
                let stmts = self.parse_stmts_until_close_brace()?;
                self.pop_scope();
                Ok(Stmt::new(
                    Span::new(start, self.lexer.token_start),
                    SData::Block(stmts),
                ))
            }
            Token::Var => {
                self.lexer.next();
                let decls = self.parse_decls(SymbolKind::Hoisted)?;
                self.expect_semicolon()?;
                Ok(Stmt::new(
                    Span::new(start, self.lexer.token_start),
                    SData::Local(SLocal {
                        kind: LocalKind::Var,
                        decls,
                        is_export: false,
                    }),
                ))
            }
            Token::Const => {
                self.lexer.next();
                if self.lexer.is_ts() && self.lexer.token == Token::Enum {
                    return self.parse_enum(start, false);
                }
                let decls = self.parse_decls(SymbolKind::Const)?;
                self.expect_semicolon()?;
                self.require_initializers(&decls);
                Ok(Stmt::new(
                    Span::new(start, self.lexer.token_start),
                    SData::Local(SLocal {
                        kind: LocalKind::Const,
                        decls,
                        is_export: false,
                    }),
                ))
            }
            Token::If => self.parse_if(start),
            Token::While => {
                self.lexer.next();
                self.expect(Token::OpenParen)?;
                let test = self.parse_expr(Precedence::Lowest)?;
                self.expect(Token::CloseParen)?;
                let body = self.parse_nested_stmt()?;
                Ok(Stmt::new(
                    Span::new(start, body.span.end),
                    SData::While(Box::new(SWhile { test, body })),
                ))
            }
            Token::Do => {
                self.lexer.next();
                let body = self.parse_nested_stmt()?;
                self.expect(Token::While)?;
                self.expect(Token::OpenParen)?;
                let test = self.parse_expr(Precedence::Lowest)?;
                self.expect(Token::CloseParen)?;
                // The trailing semicolon after do-while is optional
                self.eat(Token::Semicolon);
                Ok(Stmt::new(
                    Span::new(start, self.lexer.token_start),
                    SData::DoWhile(Box::new(SDoWhile { body, test })),
                ))
            }
            Token::For => self.parse_for(start),
            Token::Switch => self.parse_switch(start),
            Token::Try => self.parse_try(start),
            Token::Throw => {
                self.lexer.next();
                if self.lexer.has_newline_before {
                    self.error(span, "no line break is allowed after \"throw\"");
                    return Err(ParseError);
                }
                let value = self.parse_expr(Precedence::Lowest)?;
                self.expect_semicolon()?;
                Ok(Stmt::new(Span::new(start, value.span.end), SData::Throw(value)))
            }
            Token::Return => {
                self.lexer.next();
                let value = if matches!(
                    self.lexer.token,
                    Token::Semicolon | Token::CloseBrace | Token::EndOfFile
                ) {
                    None
                } else if self.lexer.has_newline_before {
                    // ASI terminates the return; the next expression is a
                    // separate statement
                    if self.lexer.token.can_start_expression() {
                        self.warn(
                            self.lexer.span(),
                            "the following expression is not returned because of an \
                             automatically-inserted semicolon",
                        );
                    }
                    None
                } else {
                    Some(self.parse_expr(Precedence::Lowest)?)
                };
                self.expect_semicolon()?;
                if self.current_scope() == self.module_scope {
                    self.has_top_level_return = true;
                }
                Ok(Stmt::new(
                    Span::new(start, self.lexer.token_start),
                    SData::Return(value),
                ))
            }
            Token::Break => {
                self.lexer.next();
                let label = self.parse_label_use()?;
                self.expect_semicolon()?;
                Ok(Stmt::new(Span::new(start, self.lexer.token_start), SData::Break(label)))
            }
            Token::Continue => {
                self.lexer.next();
                let label = self.parse_label_use()?;
                self.expect_semicolon()?;
                Ok(Stmt::new(
                    Span::new(start, self.lexer.token_start),
                    SData::Continue(label),
                ))
            }
            Token::Debugger => {
                self.lexer.next();
                self.expect_semicolon()?;
                Ok(Stmt::new(span, SData::Debugger))
            }
            Token::With => {
                self.lexer.next();
                if self.is_strict_mode() {
                    self.error(span, "\"with\" statements cannot be used in strict mode");
                } else {
                    self.warn(span, "\"with\" statements disable symbol renaming");
                }
                self.expect(Token::OpenParen)?;
                let value = self.parse_expr(Precedence::Lowest)?;
                self.expect(Token::CloseParen)?;
                self.push_scope(ScopeKind::With);
                let body = self.parse_nested_stmt()?;
                self.pop_scope();
                Ok(Stmt::new(
                    Span::new(start, body.span.end),
                    SData::With(Box::new(SWith { value, body })),
                ))
            }
            Token::Function => self.parse_function_decl(start, false, false),
            Token::Class => {
                self.lexer.next();
                let (name, name_span) = self.expect_identifier()?;
                let name_ref = self.declare_symbol(SymbolKind::Class, name.clone(), name_span);
                let mut class = self.parse_class_tail(Some((name, name_ref)))?;
                class.name = Some(name_ref);
                Ok(Stmt::new(
                    Span::new(start, self.lexer.token_start),
                    SData::Class(SClass {
                        class,
                        is_export: false,
                    }),
                ))
            }
            Token::Import => self.parse_import_stmt(start),
            Token::Export => self.parse_export_stmt(start),
            Token::Enum if self.lexer.is_ts() => self.parse_enum(start, false),
            Token::StringLiteral => {
                // Possibly a directive
                let value = self.lexer.string_value.clone();
                let raw_is_simple = !self.lexer.raw().contains('\\');
                let stmt_span = self.lexer.span();
                self.lexer.next();
                if matches!(
                    self.lexer.token,
                    Token::Semicolon | Token::CloseBrace | Token::EndOfFile
                ) || self.lexer.has_newline_before
                {
                    self.eat(Token::Semicolon);
                    if raw_is_simple {
                        return Ok(Stmt::new(stmt_span, SData::Directive(value)));
                    }
                    return Ok(Stmt::new(
                        stmt_span,
                        SData::Expr(Expr::new(stmt_span, EData::String(EString::new(value)))),
                    ));
                }
                // Not a directive: keep parsing the expression
                let left = Expr::new(stmt_span, EData::String(EString::new(value)));
                let expr = self.parse_suffix(left, Precedence::Lowest)?;
                self.expect_semicolon()?;
                Ok(Stmt::new(Span::new(start, expr.span.end), SData::Expr(expr)))
            }
            Token::Identifier => self.parse_identifier_stmt(start),
            Token::At => {
                self.error(span, "decorators are not supported");
                Err(ParseError)
            }
            _ => {
                let expr = self.parse_expr(Precedence::Lowest)?;
                self.expect_semicolon()?;
                Ok(Stmt::new(Span::new(start, expr.span.end), SData::Expr(expr)))
            }
        }
    }

    /// Statements that begin with a plain identifier: `let` declarations,
    /// labels, TypeScript declaration keywords, async functions, or just
    /// an expression statement.
    fn parse_identifier_stmt(&mut self, start: u32) -> ParseResult<Stmt> {
        let name = self.lexer.identifier.clone();

        match name.as_str() {
            "let" => {
                let snapshot = self.lexer.snapshot();
                self.lexer.next();
                if matches!(
                    self.lexer.token,
                    Token::Identifier | Token::OpenBracket | Token::OpenBrace
                ) {
                    let decls = self.parse_decls(SymbolKind::Other)?;
                    self.expect_semicolon()?;
                    return Ok(Stmt::new(
                        Span::new(start, self.lexer.token_start),
                        SData::Local(SLocal {
                            kind: LocalKind::Let,
                            decls,
                            is_export: false,
                        }),
                    ));
                }
                self.lexer.restore(snapshot);
            }
            "async" => {
                let snapshot = self.lexer.snapshot();
                self.lexer.next();
                if self.lexer.token == Token::Function && !self.lexer.has_newline_before {
                    return self.parse_function_decl(start, true, false);
                }
                self.lexer.restore(snapshot);
            }
            "interface" if self.lexer.is_ts() => {
                let snapshot = self.lexer.snapshot();
                self.lexer.next();
                if self.lexer.token == Token::Identifier {
                    self.skip_ts_interface()?;
                    return Ok(Stmt::new(
                        Span::new(start, self.lexer.token_start),
                        SData::TypeScript,
                    ));
                }
                self.lexer.restore(snapshot);
            }
            "type" if self.lexer.is_ts() => {
                let snapshot = self.lexer.snapshot();
                self.lexer.next();
                if self.lexer.token == Token::Identifier && !self.lexer.has_newline_before {
                    self.skip_ts_type_alias()?;
                    return Ok(Stmt::new(
                        Span::new(start, self.lexer.token_start),
                        SData::TypeScript,
                    ));
                }
                self.lexer.restore(snapshot);
            }
            "namespace" | "module" if self.lexer.is_ts() => {
                let snapshot = self.lexer.snapshot();
                self.lexer.next();
                if self.lexer.token == Token::Identifier && !self.lexer.has_newline_before {
                    return self.parse_namespace(start, false);
                }
                self.lexer.restore(snapshot);
            }
            "declare" if self.lexer.is_ts() => {
                let snapshot = self.lexer.snapshot();
                self.lexer.next();
                if !self.lexer.has_newline_before
                    && (matches!(
                        self.lexer.token,
                        Token::Var | Token::Const | Token::Function | Token::Class | Token::Enum
                    ) || self.lexer.is_contextual("let")
                        || self.lexer.is_contextual("namespace")
                        || self.lexer.is_contextual("module")
                        || self.lexer.is_contextual("global")
                        || self.lexer.is_contextual("abstract"))
                {
                    // Ambient declarations produce no output
                    self.skip_ts_ambient_declaration()?;
                    return Ok(Stmt::new(
                        Span::new(start, self.lexer.token_start),
                        SData::TypeScript,
                    ));
                }
                self.lexer.restore(snapshot);
            }
            "abstract" if self.lexer.is_ts() => {
                let snapshot = self.lexer.snapshot();
                self.lexer.next();
                if self.lexer.token == Token::Class {
                    self.lexer.next();
                    let (class_name, name_span) = self.expect_identifier()?;
                    let name_ref =
                        self.declare_symbol(SymbolKind::Class, class_name.clone(), name_span);
                    let mut class = self.parse_class_tail(Some((class_name, name_ref)))?;
                    class.name = Some(name_ref);
                    return Ok(Stmt::new(
                        Span::new(start, self.lexer.token_start),
                        SData::Class(SClass {
                            class,
                            is_export: false,
                        }),
                    ));
                }
                self.lexer.restore(snapshot);
            }
            _ => {}
        }

        // Label?
        let label_snapshot = self.lexer.snapshot();
        self.lexer.next();
        if self.lexer.token == Token::Colon {
            let name_span = Span::new(start, self.lexer.token_start);
            self.lexer.next();
            self.push_scope(ScopeKind::Label);
            let name_ref = self.new_symbol(SymbolKind::Label, name.clone());
            let scope = self.current_scope();
            self.scopes[scope.idx()].label_ref = Some(name_ref);
            self.scopes[scope.idx()].members.insert(name, name_ref);
            let stmt = self.parse_nested_stmt()?;
            self.pop_scope();
            let _ = name_span;
            return Ok(Stmt::new(
                Span::new(start, stmt.span.end),
                SData::Label(Box::new(SLabel { name_ref, stmt })),
            ));
        }
        self.lexer.restore(label_snapshot);

        let expr = self.parse_expr(Precedence::Lowest)?;
        self.expect_semicolon()?;
        Ok(Stmt::new(Span::new(start, expr.span.end), SData::Expr(expr)))
    }

    /// Statement in a nested position (loop/if bodies). Declarations are
    /// not allowed here.
    fn parse_nested_stmt(&mut self) -> ParseResult<Stmt> {
        self.parse_stmt()
    }

    fn parse_label_use(&mut self) -> ParseResult<Option<Ref>> {
        if self.lexer.token != Token::Identifier || self.lexer.has_newline_before {
            return Ok(None);
        }
        let (name, span) = self.expect_identifier()?;
        // Walk label scopes for the target
        let mut scope = Some(self.current_scope());
        while let Some(id) = scope {
            let data = &self.scopes[id.idx()];
            if data.kind == ScopeKind::Label {
                if let Some(label_ref) = data.label_ref {
                    if self.symbols[label_ref.inner.idx()].original_name == name {
                        self.symbols[label_ref.inner.idx()].use_count_estimate += 1;
                        return Ok(Some(label_ref));
                    }
                }
            }
            scope = data.parent;
        }
        self.error(span, format!("there is no containing label named \"{name}\""));
        Ok(None)
    }

    fn require_initializers(&mut self, decls: &[Decl]) {
        for decl in decls {
            if decl.value.is_none() {
                if let BData::Identifier(_) = decl.binding.data {
                    self.error(decl.binding.span, "const declarations must be initialized");
                }
            }
        }
    }

    pub(crate) fn parse_decls(&mut self, kind: SymbolKind) -> ParseResult<Vec<Decl>> {
        let mut decls = Vec::new();
        loop {
            let binding = self.parse_binding(kind)?;
            // TypeScript definite-assignment assertion and annotation
            if self.lexer.is_ts() {
                self.eat(Token::Exclamation);
            }
            self.skip_ts_annotation()?;
            let value = if self.eat(Token::Equals) {
                Some(self.parse_expr(Precedence::Comma)?)
            } else {
                None
            };
            decls.push(Decl { binding, value });
            if !self.eat(Token::Comma) {
                break;
            }
        }
        Ok(decls)
    }

    fn parse_if(&mut self, start: u32) -> ParseResult<Stmt> {
        self.expect(Token::If)?;
        self.expect(Token::OpenParen)?;
        let test = self.parse_expr(Precedence::Lowest)?;
        self.expect(Token::CloseParen)?;
        let yes = self.parse_nested_stmt()?;
        let no = if self.eat(Token::Else) {
            Some(self.parse_nested_stmt()?)
        } else {
            None
        };
        let end = no.as_ref().map(|s| s.span.end).unwrap_or(yes.span.end);
        Ok(Stmt::new(
            Span::new(start, end),
            SData::If(Box::new(SIf { test, yes, no })),
        ))
    }

    fn parse_for(&mut self, start: u32) -> ParseResult<Stmt> {
        self.expect(Token::For)?;
        // `for await (... of ...)`
        let is_await = self.eat_contextual("await");
        self.expect(Token::OpenParen)?;
        self.push_scope(ScopeKind::Block);

        let init: Option<Stmt> = if self.lexer.token == Token::Semicolon {
            None
        } else {
            let init_start = self.lexer.token_start;
            let decl_kind = match self.lexer.token {
                Token::Var => Some((LocalKind::Var, SymbolKind::Hoisted)),
                Token::Const => Some((LocalKind::Const, SymbolKind::Const)),
                Token::Identifier if self.lexer.identifier == "let" => {
                    // Only a declaration when a binding follows
                    let snapshot = self.lexer.snapshot();
                    self.lexer.next();
                    let is_decl = matches!(
                        self.lexer.token,
                        Token::Identifier | Token::OpenBracket | Token::OpenBrace
                    );
                    self.lexer.restore(snapshot);
                    if is_decl {
                        Some((LocalKind::Let, SymbolKind::Other))
                    } else {
                        None
                    }
                }
                _ => None,
            };

            let old_allow_in = self.fn_flags.allow_in;
            self.fn_flags.allow_in = false;
            let init = if let Some((local_kind, symbol_kind)) = decl_kind {
                self.lexer.next();
                let binding = self.parse_binding(symbol_kind)?;
                self.skip_ts_annotation()?;

                // for-in / for-of with a single declaration
                if self.lexer.token == Token::In || self.lexer.is_contextual("of") {
                    self.fn_flags.allow_in = old_allow_in;
                    let decl_stmt = Stmt::new(
                        Span::new(init_start, self.lexer.token_start),
                        SData::Local(SLocal {
                            kind: local_kind,
                            decls: vec![Decl {
                                binding,
                                value: None,
                            }],
                            is_export: false,
                        }),
                    );
                    return self.parse_for_in_of(start, decl_stmt, is_await);
                }

                let value = if self.eat(Token::Equals) {
                    let old = self.fn_flags.allow_in;
                    self.fn_flags.allow_in = false;
                    let v = self.parse_expr(Precedence::Comma)?;
                    self.fn_flags.allow_in = old;
                    Some(v)
                } else {
                    None
                };
                let mut decls = vec![Decl { binding, value }];
                while self.eat(Token::Comma) {
                    let binding = self.parse_binding(symbol_kind)?;
                    self.skip_ts_annotation()?;
                    let value = if self.eat(Token::Equals) {
                        Some(self.parse_expr(Precedence::Comma)?)
                    } else {
                        None
                    };
                    decls.push(Decl { binding, value });
                }
                Stmt::new(
                    Span::new(init_start, self.lexer.token_start),
                    SData::Local(SLocal {
                        kind: local_kind,
                        decls,
                        is_export: false,
                    }),
                )
            } else {
                let expr = self.parse_expr(Precedence::Lowest)?;
                if self.lexer.token == Token::In || self.lexer.is_contextual("of") {
                    self.fn_flags.allow_in = old_allow_in;
                    let expr_stmt = Stmt::new(expr.span, SData::Expr(expr));
                    return self.parse_for_in_of(start, expr_stmt, is_await);
                }
                Stmt::new(expr.span, SData::Expr(expr))
            };
            self.fn_flags.allow_in = old_allow_in;
            Some(init)
        };

        self.expect(Token::Semicolon)?;
        let test = if self.lexer.token == Token::Semicolon {
            None
        } else {
            Some(self.parse_expr(Precedence::Lowest)?)
        };
        self.expect(Token::Semicolon)?;
        let update = if self.lexer.token == Token::CloseParen {
            None
        } else {
            Some(self.parse_expr(Precedence::Lowest)?)
        };
        self.expect(Token::CloseParen)?;
        let body = self.parse_nested_stmt()?;
        self.pop_scope();
        Ok(Stmt::new(
            Span::new(start, body.span.end),
            SData::For(Box::new(SFor {
                init,
                test,
                update,
                body,
            })),
        ))
    }

    /// Current token is `in` or `of`; the loop's binding scope is pushed.
    fn parse_for_in_of(&mut self, start: u32, init: Stmt, is_await: bool) -> ParseResult<Stmt> {
        let is_in = self.lexer.token == Token::In;
        if is_in && is_await {
            self.error(self.lexer.span(), "\"await\" is only valid with for-of loops");
        }
        self.lexer.next();
        let value = if is_in {
            self.parse_expr(Precedence::Lowest)?
        } else {
            self.parse_expr(Precedence::Comma)?
        };
        self.expect(Token::CloseParen)?;
        let body = self.parse_nested_stmt()?;
        self.pop_scope();
        let data = SForInOf { init, value, body };
        Ok(Stmt::new(
            Span::new(start, self.lexer.token_start),
            if is_in {
                SData::ForIn(Box::new(data))
            } else {
                SData::ForOf(Box::new(data))
            },
        ))
    }

    fn parse_switch(&mut self, start: u32) -> ParseResult<Stmt> {
        self.expect(Token::Switch)?;
        self.expect(Token::OpenParen)?;
        let test = self.parse_expr(Precedence::Lowest)?;
        self.expect(Token::CloseParen)?;
        self.expect(Token::OpenBrace)?;
        self.push_scope(ScopeKind::Block);

        let mut cases = Vec::new();
        let mut seen_default = false;
        while self.lexer.token != Token::CloseBrace {
            let case_test = if self.eat(Token::Case) {
                let value = self.parse_expr(Precedence::Lowest)?;
                Some(value)
            } else {
                let default_span = self.lexer.span();
                self.expect(Token::Default)?;
                if seen_default {
                    self.error(default_span, "multiple default clauses are not allowed");
                }
                seen_default = true;
                None
            };
            self.expect(Token::Colon)?;
            let mut body = Vec::new();
            while !matches!(
                self.lexer.token,
                Token::Case | Token::Default | Token::CloseBrace
            ) {
                body.push(self.parse_stmt()?);
            }
            cases.push(SwitchCase {
                test: case_test,
                body,
            });
        }
        self.lexer.next();
        self.pop_scope();
        Ok(Stmt::new(
            Span::new(start, self.lexer.token_start),
            SData::Switch(Box::new(SSwitch { test, cases })),
        ))
    }

    fn parse_try(&mut self, start: u32) -> ParseResult<Stmt> {
        self.expect(Token::Try)?;
        self.expect(Token::OpenBrace)?;
        self.push_scope(ScopeKind::Block);
        let body = self.parse_stmts_until_close_brace()?;
        self.pop_scope();

        let mut catch = None;
        if self.eat(Token::Catch) {
            self.push_scope(ScopeKind::CatchBinding);
            let binding = if self.eat(Token::OpenParen) {
                let binding = self.parse_binding(SymbolKind::CatchIdentifier)?;
                self.skip_ts_annotation()?;
                self.expect(Token::CloseParen)?;
                Some(binding)
            } else {
                // Optional catch binding
                None
            };
            self.expect(Token::OpenBrace)?;
            self.push_scope(ScopeKind::Block);
            let catch_body = self.parse_stmts_until_close_brace()?;
            self.pop_scope();
            self.pop_scope();
            catch = Some(Catch {
                binding,
                body: catch_body,
            });
        }

        let mut finally = None;
        if self.eat(Token::Finally) {
            self.expect(Token::OpenBrace)?;
            self.push_scope(ScopeKind::Block);
            finally = Some(self.parse_stmts_until_close_brace()?);
            self.pop_scope();
        }

        if catch.is_none() && finally.is_none() {
            self.error(
                Span::new(start, start + 3),
                "\"try\" must have either \"catch\" or \"finally\"",
            );
        }
        Ok(Stmt::new(
            Span::new(start, self.lexer.token_start),
            SData::Try(Box::new(STry {
                body,
                catch,
                finally,
            })),
        ))
    }

    pub(crate) fn parse_function_decl(
        &mut self,
        start: u32,
        is_async: bool,
        is_export: bool,
    ) -> ParseResult<Stmt> {
        self.expect(Token::Function)?;
        let is_generator = self.eat(Token::Asterisk);
        let (name, name_span) = self.expect_identifier()?;
        let kind = if is_async || is_generator {
            SymbolKind::GeneratorOrAsyncFunction
        } else {
            SymbolKind::HoistedFunction
        };

        let scope = self.push_scope(ScopeKind::FunctionArgs);

        // TypeScript: a signature with no body is a forward declaration;
        // the pushed scope was spurious
        if self.lexer.is_ts() {
            let probe = self.snapshot();
            let has_body = self.probe(|p| {
                if p.lexer.token == Token::LessThan && p.skip_ts_type_parameters().is_err() {
                    return true;
                }
                if !p.skim_balanced(Token::OpenParen, Token::CloseParen) {
                    return true;
                }
                if p.lexer.token == Token::Colon {
                    p.lexer.next();
                    if p.skip_ts_type_or_predicate().is_err() {
                        return true;
                    }
                }
                p.lexer.token == Token::OpenBrace
            });
            if !has_body {
                self.eat(Token::Semicolon);
                self.pop_and_discard_scope(scope);
                return Ok(Stmt::new(
                    Span::new(start, self.lexer.token_start),
                    SData::TypeScript,
                ));
            }
            self.restore(probe);
        }

        let name_ref = self.declare_symbol_in_parent(kind, &name, name_span);
        let func = self.parse_fn_signature_and_body(Some(name_ref), is_async, is_generator)?;
        self.pop_scope();

        Ok(Stmt::new(
            Span::new(start, self.lexer.token_start),
            SData::Function(SFunction { func, is_export }),
        ))
    }

    /// Function declaration names belong to the scope containing the
    /// declaration, not the function's own args scope.
    fn declare_symbol_in_parent(
        &mut self,
        kind: SymbolKind,
        name: &str,
        span: Span,
    ) -> Ref {
        let top = self.scope_stack.pop().expect("scope stack underflow");
        let reference = self.declare_symbol(kind, name, span);
        self.scope_stack.push(top);
        // Make the name visible inside the function for recursion
        self.scopes[top.idx()]
            .members
            .entry(name.to_string())
            .or_insert(reference);
        reference
    }

    /// Consume a balanced token run starting at `open`. Returns false if
    /// the stream ends first.
    fn skim_balanced(&mut self, open: Token, close: Token) -> bool {
        if self.lexer.token != open {
            return false;
        }
        let mut depth = 0i32;
        loop {
            let token = self.lexer.token;
            if token == Token::EndOfFile || token == Token::SyntaxError {
                return false;
            }
            if token == open {
                depth += 1;
            } else if token == close {
                depth -= 1;
                if depth == 0 {
                    self.lexer.next();
                    return true;
                }
            }
            self.lexer.next();
        }
    }
}
