//! `import` and `export` statement parsing (pass 1).
//!
//! Each statement that names a module specifier allocates an import
//! record; the scanner resolves records after the parse completes. Local
//! bindings for imports are declared with kind `Import` so the linker can
//! rewire them to the exporting module's symbols.

use super::*;
use crate::ops::Precedence;

impl<'a> Parser<'a> {
    /// A short name for generated namespace objects, derived from the
    /// module specifier: `./some/pkg-name.js` → `pkg_name`.
    fn namespace_name_for_specifier(specifier: &str) -> String {
        let base = specifier
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(specifier);
        let stem = base.split('.').next().unwrap_or(base);
        let mut name = String::with_capacity(stem.len());
        for c in stem.chars() {
            if jolt_lexer::is_identifier_continue(c) {
                name.push(c);
            } else {
                name.push('_');
            }
        }
        if name.is_empty() || !jolt_lexer::is_identifier_start(name.chars().next().unwrap()) {
            name.insert(0, '_');
        }
        name
    }

    pub(crate) fn parse_import_stmt(&mut self, start: u32) -> ParseResult<Stmt> {
        self.expect(Token::Import)?;

        // `import(...)` and `import.meta` in expression position
        if matches!(self.lexer.token, Token::OpenParen | Token::Dot) {
            return self.parse_import_expr_stmt(start);
        }

        self.has_es_module_syntax = true;

        // `import "m"`
        if self.lexer.token == Token::StringLiteral {
            let specifier = self.lexer.string_value.clone();
            let specifier_span = self.lexer.span();
            self.lexer.next();
            self.expect_semicolon()?;
            let record = self.add_import_record(ImportKind::Stmt, specifier_span, &specifier);
            let namespace_name = Self::namespace_name_for_specifier(&specifier);
            let namespace_ref = self.generate_symbol(self.module_scope, namespace_name);
            return Ok(Stmt::new(
                Span::new(start, self.lexer.token_start),
                SData::Import(Box::new(SImport {
                    import_record_index: record,
                    default_name: None,
                    items: Vec::new(),
                    namespace_ref,
                    star_name_span: None,
                })),
            ));
        }

        // TypeScript `import type ...` is erased, and `import A = ...`
        // is rejected
        if self.lexer.is_ts() && self.lexer.is_contextual("type") {
            let snapshot = self.lexer.snapshot();
            self.lexer.next();
            let is_type_only = matches!(
                self.lexer.token,
                Token::OpenBrace | Token::Asterisk
            ) || (self.lexer.token == Token::Identifier
                && !self.lexer.is_contextual("from"));
            if is_type_only {
                self.skip_ts_import_clause()?;
                self.expect_contextual("from")?;
                if self.lexer.token != Token::StringLiteral {
                    self.unexpected();
                    return Err(ParseError);
                }
                self.lexer.next();
                self.expect_semicolon()?;
                return Ok(Stmt::new(
                    Span::new(start, self.lexer.token_start),
                    SData::TypeScript,
                ));
            }
            self.lexer.restore(snapshot);
        }

        let mut default_name = None;
        let mut items = Vec::new();
        let mut star_name_span = None;
        let mut explicit_namespace_name = None;

        if self.lexer.token == Token::Identifier {
            // `import def ...`
            let (name, name_span) = self.expect_identifier()?;
            if self.lexer.is_ts() && self.lexer.token == Token::Equals {
                self.error(
                    name_span,
                    "\"import =\" assignments are not supported; use a call to \"require\" instead",
                );
                return Err(ParseError);
            }
            let reference = self.declare_symbol(SymbolKind::Import, name, name_span);
            default_name = Some((reference, name_span));
            if self.lexer.token == Token::Comma {
                self.lexer.next();
            } else {
                self.expect_contextual("from")?;
                return self.finish_import_stmt(start, default_name, items, None, star_name_span);
            }
        }

        match self.lexer.token {
            Token::Asterisk => {
                self.lexer.next();
                self.expect_contextual("as")?;
                let (name, name_span) = self.expect_identifier()?;
                star_name_span = Some(name_span);
                let reference = self.declare_symbol(SymbolKind::Import, name.clone(), name_span);
                explicit_namespace_name = Some(reference);
                self.expect_contextual("from")?;
            }
            Token::OpenBrace => {
                self.lexer.next();
                while self.lexer.token != Token::CloseBrace {
                    // `import {type x}` erases the item in TypeScript
                    if self.lexer.is_ts() && self.lexer.is_contextual("type") {
                        let snapshot = self.lexer.snapshot();
                        self.lexer.next();
                        if self.lexer.token == Token::Identifier
                            || self.lexer.token.is_keyword()
                        {
                            let _ = self.expect_identifier_like()?;
                            if self.eat_contextual("as") {
                                let _ = self.expect_identifier()?;
                            }
                            if !self.eat(Token::Comma) {
                                break;
                            }
                            continue;
                        }
                        self.lexer.restore(snapshot);
                    }

                    let (alias, alias_span) = self.expect_identifier_like()?;
                    let (local_name, local_span) = if self.eat_contextual("as") {
                        self.expect_identifier()?
                    } else {
                        (alias.clone(), alias_span)
                    };
                    let reference =
                        self.declare_symbol(SymbolKind::Import, local_name, local_span);
                    items.push(ImportItem {
                        alias,
                        alias_span,
                        name_ref: reference,
                    });
                    if !self.eat(Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::CloseBrace)?;
                self.expect_contextual("from")?;
            }
            _ => {
                self.unexpected();
                return Err(ParseError);
            }
        }

        self.finish_import_stmt(start, default_name, items, explicit_namespace_name, star_name_span)
    }

    fn finish_import_stmt(
        &mut self,
        start: u32,
        default_name: Option<(Ref, Span)>,
        items: Vec<ImportItem>,
        explicit_namespace: Option<Ref>,
        star_name_span: Option<Span>,
    ) -> ParseResult<Stmt> {
        if self.lexer.token != Token::StringLiteral {
            self.unexpected();
            return Err(ParseError);
        }
        let specifier = self.lexer.string_value.clone();
        let specifier_span = self.lexer.span();
        self.lexer.next();
        self.expect_semicolon()?;

        let record = self.add_import_record(ImportKind::Stmt, specifier_span, &specifier);
        let namespace_ref = match explicit_namespace {
            Some(reference) => reference,
            None => {
                let name = Self::namespace_name_for_specifier(&specifier);
                self.generate_symbol(self.module_scope, name)
            }
        };

        Ok(Stmt::new(
            Span::new(start, self.lexer.token_start),
            SData::Import(Box::new(SImport {
                import_record_index: record,
                default_name,
                items,
                namespace_ref,
                star_name_span,
            })),
        ))
    }

    /// `import(` / `import.` at statement level parse as an expression.
    fn parse_import_expr_stmt(&mut self, start: u32) -> ParseResult<Stmt> {
        let expr = if self.eat(Token::Dot) {
            let (name, name_span) = self.expect_identifier()?;
            if name != "meta" {
                self.error(name_span, format!("invalid property \"{name}\" after import."));
                return Err(ParseError);
            }
            Expr::new(Span::new(start, name_span.end), EData::ImportMeta)
        } else {
            self.expect(Token::OpenParen)?;
            let target = self.parse_expr(Precedence::Comma)?;
            if self.eat(Token::Comma) && self.lexer.token != Token::CloseParen {
                self.parse_expr(Precedence::Comma)?;
                self.eat(Token::Comma);
            }
            self.expect(Token::CloseParen)?;
            Expr::new(
                Span::new(start, self.lexer.token_start),
                EData::ImportCall(Box::new(EImportCall {
                    target,
                    import_record_index: None,
                })),
            )
        };
        let expr = self.parse_suffix(expr, Precedence::Lowest)?;
        self.expect_semicolon()?;
        Ok(Stmt::new(Span::new(start, expr.span.end), SData::Expr(expr)))
    }

    pub(crate) fn parse_export_stmt(&mut self, start: u32) -> ParseResult<Stmt> {
        self.expect(Token::Export)?;
        // Exports inside namespace bodies are namespace members, not
        // module syntax
        if self.current_scope() == self.module_scope {
            self.has_es_module_syntax = true;
        }

        match self.lexer.token {
            Token::Var => {
                self.lexer.next();
                let decls = self.parse_decls(SymbolKind::Hoisted)?;
                self.expect_semicolon()?;
                Ok(Stmt::new(
                    Span::new(start, self.lexer.token_start),
                    SData::Local(SLocal {
                        kind: LocalKind::Var,
                        decls,
                        is_export: true,
                    }),
                ))
            }
            Token::Const => {
                self.lexer.next();
                if self.lexer.is_ts() && self.lexer.token == Token::Enum {
                    return self.parse_enum(start, true);
                }
                let decls = self.parse_decls(SymbolKind::Const)?;
                self.expect_semicolon()?;
                Ok(Stmt::new(
                    Span::new(start, self.lexer.token_start),
                    SData::Local(SLocal {
                        kind: LocalKind::Const,
                        decls,
                        is_export: true,
                    }),
                ))
            }
            Token::Function => self.parse_function_decl(start, false, true),
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
                        is_export: true,
                    }),
                ))
            }
            Token::Enum if self.lexer.is_ts() => self.parse_enum(start, true),
            Token::Default => {
                self.lexer.next();
                let default_ref =
                    self.declare_symbol(SymbolKind::Other, "default", Span::at(start));

                // `export default function` / `export default class`
                if self.lexer.token == Token::Function
                    || (self.lexer.is_contextual("async") && {
                        let snapshot = self.lexer.snapshot();
                        self.lexer.next();
                        let is_fn =
                            self.lexer.token == Token::Function && !self.lexer.has_newline_before;
                        self.lexer.restore(snapshot);
                        is_fn
                    })
                {
                    let is_async = self.eat_contextual("async");
                    self.expect(Token::Function)?;
                    let is_generator = self.eat(Token::Asterisk);
                    self.push_scope(ScopeKind::FunctionArgs);
                    let name_ref = if self.lexer.token == Token::Identifier {
                        let (name, name_span) = self.expect_identifier()?;
                        Some(self.declare_symbol(SymbolKind::HoistedFunction, name, name_span))
                    } else {
                        None
                    };
                    let func =
                        self.parse_fn_signature_and_body(name_ref, is_async, is_generator)?;
                    self.pop_scope();
                    return Ok(Stmt::new(
                        Span::new(start, self.lexer.token_start),
                        SData::ExportDefault(Box::new(SExportDefault {
                            default_name_ref: default_ref,
                            value: ExportDefaultValue::Function(func),
                        })),
                    ));
                }
                if self.lexer.token == Token::Class {
                    self.lexer.next();
                    let name = if self.lexer.token == Token::Identifier {
                        let (name, name_span) = self.expect_identifier()?;
                        let name_ref = self.declare_symbol(SymbolKind::Class, name.clone(), name_span);
                        Some((name, name_ref))
                    } else {
                        None
                    };
                    let mut class = self.parse_class_tail(name.clone())?;
                    class.name = name.map(|(_, r)| r);
                    return Ok(Stmt::new(
                        Span::new(start, self.lexer.token_start),
                        SData::ExportDefault(Box::new(SExportDefault {
                            default_name_ref: default_ref,
                            value: ExportDefaultValue::Class(class),
                        })),
                    ));
                }

                let value = self.parse_expr(Precedence::Comma)?;
                self.expect_semicolon()?;
                Ok(Stmt::new(
                    Span::new(start, self.lexer.token_start),
                    SData::ExportDefault(Box::new(SExportDefault {
                        default_name_ref: default_ref,
                        value: ExportDefaultValue::Expr(value),
                    })),
                ))
            }
            Token::Asterisk => {
                self.lexer.next();
                let star_alias = if self.eat_contextual("as") {
                    let (name, _span) = self.expect_identifier()?;
                    Some(name)
                } else {
                    None
                };
                self.expect_contextual("from")?;
                if self.lexer.token != Token::StringLiteral {
                    self.unexpected();
                    return Err(ParseError);
                }
                let specifier = self.lexer.string_value.clone();
                let specifier_span = self.lexer.span();
                self.lexer.next();
                self.expect_semicolon()?;

                let record = self.add_import_record(ImportKind::Stmt, specifier_span, &specifier);
                if let Some(alias) = star_alias {
                    let namespace_name = Self::namespace_name_for_specifier(&specifier);
                    let namespace_ref = self.generate_symbol(self.module_scope, namespace_name);
                    return Ok(Stmt::new(
                        Span::new(start, self.lexer.token_start),
                        SData::ExportFrom(Box::new(SExportFrom {
                            items: Vec::new(),
                            namespace_ref,
                            import_record_index: record,
                            star_alias: Some(alias),
                        })),
                    ));
                }
                self.import_records[record as usize].is_export_star = true;
                Ok(Stmt::new(
                    Span::new(start, self.lexer.token_start),
                    SData::ExportStar(SExportStar {
                        import_record_index: record,
                    }),
                ))
            }
            Token::OpenBrace => {
                self.lexer.next();
                let mut items = Vec::new();
                while self.lexer.token != Token::CloseBrace {
                    // `export {type x}` is erased in TypeScript
                    if self.lexer.is_ts() && self.lexer.is_contextual("type") {
                        let snapshot = self.lexer.snapshot();
                        self.lexer.next();
                        if self.lexer.token == Token::Identifier {
                            let _ = self.expect_identifier()?;
                            if self.eat_contextual("as") {
                                let _ = self.expect_identifier_like()?;
                            }
                            if !self.eat(Token::Comma) {
                                break;
                            }
                            continue;
                        }
                        self.lexer.restore(snapshot);
                    }

                    let (name, name_span) = self.expect_identifier_like()?;
                    let alias = if self.eat_contextual("as") {
                        let (alias, _) = self.expect_identifier_like()?;
                        alias
                    } else {
                        name.clone()
                    };
                    items.push(ExportItem {
                        name,
                        alias,
                        name_span,
                    });
                    if !self.eat(Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::CloseBrace)?;

                if self.eat_contextual("from") {
                    if self.lexer.token != Token::StringLiteral {
                        self.unexpected();
                        return Err(ParseError);
                    }
                    let specifier = self.lexer.string_value.clone();
                    let specifier_span = self.lexer.span();
                    self.lexer.next();
                    self.expect_semicolon()?;
                    let record =
                        self.add_import_record(ImportKind::Stmt, specifier_span, &specifier);
                    let namespace_name = Self::namespace_name_for_specifier(&specifier);
                    let namespace_ref = self.generate_symbol(self.module_scope, namespace_name);
                    return Ok(Stmt::new(
                        Span::new(start, self.lexer.token_start),
                        SData::ExportFrom(Box::new(SExportFrom {
                            items,
                            namespace_ref,
                            import_record_index: record,
                            star_alias: None,
                        })),
                    ));
                }
                self.expect_semicolon()?;
                Ok(Stmt::new(
                    Span::new(start, self.lexer.token_start),
                    SData::ExportClause(items),
                ))
            }
            Token::Identifier => {
                // export let / async function / TS declarations
                if self.lexer.is_contextual("let") {
                    self.lexer.next();
                    let decls = self.parse_decls(SymbolKind::Other)?;
                    self.expect_semicolon()?;
                    return Ok(Stmt::new(
                        Span::new(start, self.lexer.token_start),
                        SData::Local(SLocal {
                            kind: LocalKind::Let,
                            decls,
                            is_export: true,
                        }),
                    ));
                }
                if self.lexer.is_contextual("async") {
                    self.lexer.next();
                    return self.parse_function_decl(start, true, true);
                }
                if self.lexer.is_ts() {
                    if self.lexer.is_contextual("interface") {
                        self.lexer.next();
                        self.skip_ts_interface()?;
                        return Ok(Stmt::new(
                            Span::new(start, self.lexer.token_start),
                            SData::TypeScript,
                        ));
                    }
                    if self.lexer.is_contextual("type") {
                        self.lexer.next();
                        self.skip_ts_type_alias()?;
                        return Ok(Stmt::new(
                            Span::new(start, self.lexer.token_start),
                            SData::TypeScript,
                        ));
                    }
                    if self.lexer.is_contextual("namespace") || self.lexer.is_contextual("module")
                    {
                        self.lexer.next();
                        return self.parse_namespace(start, true);
                    }
                    if self.lexer.is_contextual("declare") {
                        self.lexer.next();
                        self.skip_ts_ambient_declaration()?;
                        return Ok(Stmt::new(
                            Span::new(start, self.lexer.token_start),
                            SData::TypeScript,
                        ));
                    }
                    if self.lexer.is_contextual("abstract") {
                        self.lexer.next();
                        self.expect(Token::Class)?;
                        let (name, name_span) = self.expect_identifier()?;
                        let name_ref =
                            self.declare_symbol(SymbolKind::Class, name.clone(), name_span);
                        let mut class = self.parse_class_tail(Some((name, name_ref)))?;
                        class.name = Some(name_ref);
                        return Ok(Stmt::new(
                            Span::new(start, self.lexer.token_start),
                            SData::Class(SClass {
                                class,
                                is_export: true,
                            }),
                        ));
                    }
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
}
