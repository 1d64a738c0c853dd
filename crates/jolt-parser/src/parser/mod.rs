//! Pass 1: lexing, parsing, scope construction and symbol declaration.
//!
//! The parser is recursive descent over the lexer's token stream. While
//! building the tree it pushes and pops scopes, declares symbols into
//! them (hoisting `var` and function declarations upward to the nearest
//! boundary), and records the scope push order in a side array so pass 2
//! can replay the exact traversal without scope ids on AST nodes.
//!
//! Identifier *references* are not resolved here; they parse as
//! `EData::IdentifierName` and pass 2 binds them to symbols.

use jolt_common::logger::{DiagnosticKind, Log, LogLevel};
use jolt_common::options::{ClassFieldMode, JsxOptions, LoaderKind, Target};
use jolt_common::refs::{InnerIndex, Ref, SourceIndex};
use jolt_common::span::Span;
use jolt_lexer::{Lexer, LexerSnapshot, Token};

use indexmap::IndexMap;

use crate::ast::*;
use crate::parts::{ImportKind, ImportRecord};
use crate::scopes::{Scope, ScopeId, ScopeKind};
use crate::symbols::{Symbol, SymbolKind};

mod classes;
mod exprs;
mod jsx;
mod modules;
mod stmts;
mod ts;

/// Parse failed at the current token; the diagnostic is already logged.
/// Statement parsing recovers at the next safe boundary.
pub(crate) type ParseResult<T> = Result<T, ParseError>;

#[derive(Clone, Copy, Debug)]
pub(crate) struct ParseError;

/// Per-file parse configuration, distilled from the build options.
#[derive(Clone, Debug, Default)]
pub struct ParseOptions {
    pub loader: LoaderKind,
    pub target: Target,
    pub jsx: JsxOptions,
    pub define: IndexMap<String, String>,
    pub class_fields: ClassFieldMode,
    /// Fold and simplify beyond what dead-branch elimination needs.
    pub minify_syntax: bool,
}

/// A complete copy of the parser state that speculative parsing mutates.
/// Restoring truncates the symbol/scope/record arenas back to their
/// recorded lengths, which also discards any scopes pushed by the probe.
pub(crate) struct ParserSnapshot {
    lexer: LexerSnapshot,
    symbols_len: usize,
    scopes_len: usize,
    scope_stack_len: usize,
    scope_order_len: usize,
    import_records_len: usize,
    fn_flags: FnFlags,
}

/// Function-context flags threaded through parsing.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FnFlags {
    pub in_async: bool,
    pub in_generator: bool,
    pub allow_in: bool,
}

pub struct Parser<'a> {
    pub(crate) lexer: Lexer<'a>,
    pub(crate) log: &'a Log,
    pub(crate) path: String,
    pub(crate) source_index: SourceIndex,
    pub(crate) options: ParseOptions,

    // Symbol and scope arenas
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) scopes: Vec<Scope>,
    pub(crate) scope_stack: Vec<ScopeId>,
    /// Pre-order scope push record replayed by pass 2.
    pub(crate) scopes_in_order: Vec<ScopeId>,

    pub(crate) import_records: Vec<ImportRecord>,

    // Module-level facts discovered while parsing
    pub(crate) module_scope: ScopeId,
    pub(crate) exports_ref: Ref,
    pub(crate) module_ref: Ref,
    pub(crate) has_es_module_syntax: bool,
    pub(crate) has_top_level_return: bool,
    pub(crate) hashbang: Option<String>,
    /// Legacy octal ranges at module level, validated once module
    /// strictness is known.
    pub(crate) module_legacy_octals: Vec<Span>,

    pub(crate) fn_flags: FnFlags,
    /// Set while speculatively parsing; diagnostics are suppressed
    /// because the probe may be abandoned.
    pub(crate) suppress_errors: bool,
}

impl<'a> Parser<'a> {
    pub fn new(
        contents: &'a str,
        path: impl Into<String>,
        source_index: SourceIndex,
        options: ParseOptions,
        log: &'a Log,
    ) -> Self {
        let path = path.into();
        let lexer = Lexer::new(contents, path.clone(), log, options.loader.is_typescript());

        let mut parser = Parser {
            lexer,
            log,
            path,
            source_index,
            options,
            symbols: Vec::new(),
            scopes: Vec::new(),
            scope_stack: Vec::new(),
            scopes_in_order: Vec::new(),
            import_records: Vec::new(),
            module_scope: ScopeId(0),
            exports_ref: Ref::NONE,
            module_ref: Ref::NONE,
            has_es_module_syntax: false,
            has_top_level_return: false,
            hashbang: None,
            module_legacy_octals: Vec::new(),
            fn_flags: FnFlags {
                allow_in: true,
                ..FnFlags::default()
            },
            suppress_errors: false,
        };

        // The module scope is an `Entry` scope: hoisting stops here.
        let module_scope = parser.push_scope(ScopeKind::Entry);
        parser.module_scope = module_scope;
        // Strip the module scope's push record; pass 2 enters it
        // explicitly before replay starts.
        parser.scopes_in_order.clear();

        // CommonJS module variables are ordinary hoisted symbols so user
        // references bind to them; their use marks the file as CommonJS.
        parser.exports_ref = parser.declare_symbol(SymbolKind::Hoisted, "exports", Span::dummy());
        parser.module_ref = parser.declare_symbol(SymbolKind::Hoisted, "module", Span::dummy());

        parser
    }

    /// Parse the whole file. Returns top-level statements; scopes,
    /// symbols and import records accumulate on the parser.
    pub fn parse_program(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        let mut directive_prologue = true;

        while self.lexer.token != Token::EndOfFile {
            if self.lexer.token == Token::SyntaxError {
                break;
            }
            match self.parse_stmt() {
                Ok(stmt) => {
                    if directive_prologue {
                        match &stmt.data {
                            SData::Directive(text) => {
                                if text == "use strict" {
                                    self.scopes[self.module_scope.idx()].strict_mode = true;
                                }
                            }
                            _ => directive_prologue = false,
                        }
                    }
                    stmts.push(stmt);
                }
                Err(ParseError) => self.recover_at_statement_boundary(),
            }
        }

        // ES modules are always strict; validate deferred octals now
        if self.has_es_module_syntax {
            self.scopes[self.module_scope.idx()].strict_mode = true;
        }
        if self.scopes[self.module_scope.idx()].strict_mode {
            for span in std::mem::take(&mut self.module_legacy_octals) {
                self.log.add_kind(
                    LogLevel::Error,
                    DiagnosticKind::Syntax,
                    &self.path,
                    span,
                    "legacy octal syntax cannot be used in strict mode",
                );
            }
        }

        stmts
    }

    /// Skip tokens until a statement can plausibly start again.
    fn recover_at_statement_boundary(&mut self) {
        if self.lexer.token == Token::SyntaxError {
            // Lexical errors poison the rest of the file
            self.lexer.token = Token::EndOfFile;
            return;
        }
        loop {
            match self.lexer.token {
                Token::EndOfFile | Token::SyntaxError => break,
                Token::Semicolon => {
                    self.lexer.next();
                    break;
                }
                Token::CloseBrace => {
                    self.lexer.next();
                    break;
                }
                _ => self.lexer.next(),
            }
        }
        if self.lexer.token == Token::SyntaxError {
            self.lexer.token = Token::EndOfFile;
        }
    }

    /// The `default` export symbol for synthetic single-value modules.
    pub(crate) fn synthetic_default_ref(&mut self) -> Ref {
        self.has_es_module_syntax = true;
        self.declare_symbol(SymbolKind::Other, "default", Span::dummy())
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    pub(crate) fn expect(&mut self, token: Token) -> ParseResult<()> {
        if self.lexer.token != token {
            self.unexpected();
            return Err(ParseError);
        }
        self.lexer.next();
        Ok(())
    }

    pub(crate) fn eat(&mut self, token: Token) -> bool {
        if self.lexer.token == token {
            self.lexer.next();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_contextual(&mut self, name: &str) -> bool {
        if self.lexer.is_contextual(name) {
            self.lexer.next();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_contextual(&mut self, name: &str) -> ParseResult<()> {
        if !self.eat_contextual(name) {
            self.unexpected();
            return Err(ParseError);
        }
        Ok(())
    }

    /// Current token must carry identifier text (identifier or keyword).
    pub(crate) fn expect_identifier_like(&mut self) -> ParseResult<(String, Span)> {
        if self.lexer.token == Token::Identifier || self.lexer.token.is_keyword() {
            let name = if self.lexer.token == Token::Identifier {
                self.lexer.identifier.clone()
            } else {
                self.lexer.raw().to_string()
            };
            let span = self.lexer.span();
            self.lexer.next();
            Ok((name, span))
        } else {
            self.unexpected();
            Err(ParseError)
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> ParseResult<(String, Span)> {
        if self.lexer.token != Token::Identifier {
            self.unexpected();
            return Err(ParseError);
        }
        let name = self.lexer.identifier.clone();
        let span = self.lexer.span();
        self.lexer.next();
        Ok((name, span))
    }

    pub(crate) fn unexpected(&mut self) {
        if self.suppress_errors {
            return;
        }
        let found = match self.lexer.token {
            Token::EndOfFile => "end of file".to_string(),
            Token::SyntaxError => return,
            _ => format!("\"{}\"", self.lexer.raw()),
        };
        let span = self.lexer.span();
        self.log.add_kind(
            LogLevel::Error,
            DiagnosticKind::Syntax,
            &self.path,
            span,
            format!("unexpected {found}"),
        );
    }

    pub(crate) fn error(&self, span: Span, text: impl Into<String>) {
        if self.suppress_errors {
            return;
        }
        self.log
            .add_kind(LogLevel::Error, DiagnosticKind::Syntax, &self.path, span, text);
    }

    pub(crate) fn warn(&self, span: Span, text: impl Into<String>) {
        if self.suppress_errors {
            return;
        }
        self.log
            .add_kind(LogLevel::Warning, DiagnosticKind::Syntax, &self.path, span, text);
    }

    /// Run a speculative parse with diagnostics suppressed. The caller
    /// restores state itself when the probe fails.
    pub(crate) fn probe<T>(&mut self, body: impl FnOnce(&mut Self) -> T) -> T {
        let old = self.suppress_errors;
        self.suppress_errors = true;
        let result = body(self);
        self.suppress_errors = old;
        result
    }

    /// Automatic semicolon insertion: consume `;` or accept a statement
    /// boundary (newline, `}` or end of file).
    pub(crate) fn expect_semicolon(&mut self) -> ParseResult<()> {
        match self.lexer.token {
            Token::Semicolon => {
                self.lexer.next();
                Ok(())
            }
            Token::CloseBrace | Token::EndOfFile => Ok(()),
            _ if self.lexer.has_newline_before => Ok(()),
            _ => {
                self.unexpected();
                Err(ParseError)
            }
        }
    }

    /// Record module-level legacy octal spans for the late strict check;
    /// inside an already-strict scope the error is immediate.
    pub(crate) fn check_legacy_octal(&mut self) {
        if let Some(span) = self.lexer.legacy_octal {
            if self.is_strict_mode() {
                self.error(span, "legacy octal syntax cannot be used in strict mode");
            } else {
                self.module_legacy_octals.push(span);
            }
        }
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    pub(crate) fn current_scope(&self) -> ScopeId {
        *self.scope_stack.last().unwrap()
    }

    pub(crate) fn push_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let parent = self.scope_stack.last().copied();
        let id = ScopeId(self.scopes.len() as u32);
        let mut scope = Scope::new(kind, parent);
        if let Some(parent_id) = parent {
            scope.strict_mode = self.scopes[parent_id.idx()].strict_mode;
            self.scopes[parent_id.idx()].children.push(id);
        }
        self.scopes.push(scope);
        self.scope_stack.push(id);
        self.scopes_in_order.push(id);
        id
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scope_stack.pop();
    }

    /// Drop a scope that turned out to be spurious (a TypeScript function
    /// signature without a body). Any scopes nested inside it (parameter
    /// default closures) occupy later arena slots and are dropped with
    /// it. The recorded push order is fixed up so pass 2 never sees them.
    pub(crate) fn pop_and_discard_scope(&mut self, id: ScopeId) {
        debug_assert_eq!(self.current_scope(), id);
        self.scope_stack.pop();
        self.scopes.truncate(id.idx());
        let limit = id.0;
        for scope in &mut self.scopes {
            scope.children.retain(|c| c.0 < limit);
        }
        self.scopes_in_order.retain(|s| s.0 < limit);
    }

    /// Fold a scope into its parent, moving members and children. Used
    /// when a speculative arrow-function scope turns out to belong to a
    /// parenthesized expression that stays in the enclosing scope.
    pub(crate) fn pop_and_flatten_scope(&mut self, id: ScopeId) {
        debug_assert_eq!(self.current_scope(), id);
        self.scope_stack.pop();
        let parent = self.scopes[id.idx()].parent.expect("flattening the root");

        let members: Vec<(String, Ref)> = self.scopes[id.idx()].members.drain().collect();
        let children: Vec<ScopeId> = self.scopes[id.idx()].children.drain(..).collect();
        let generated: Vec<Ref> = self.scopes[id.idx()].generated.drain(..).collect();

        for (name, reference) in members {
            self.scopes[parent.idx()].members.insert(name, reference);
        }
        for child in &children {
            self.scopes[child.idx()].parent = Some(parent);
        }
        let parent_scope = &mut self.scopes[parent.idx()];
        parent_scope.children.retain(|c| *c != id);
        parent_scope.children.extend(children);
        parent_scope.generated.extend(generated);

        // Rewrite the replay record in place: the scope no longer exists
        // for pass 2
        self.scopes_in_order.retain(|&s| s != id);
        self.scopes[id.idx()].kind = ScopeKind::Block;
        self.scopes[id.idx()].members.clear();
    }

    // =========================================================================
    // Symbols
    // =========================================================================

    pub(crate) fn new_symbol(&mut self, kind: SymbolKind, name: impl Into<String>) -> Ref {
        let inner = InnerIndex(self.symbols.len() as u32);
        self.symbols.push(Symbol::new(kind, name));
        Ref::new(self.source_index, inner)
    }

    /// Create a symbol that has no source binding and attach it to a
    /// scope for renaming purposes.
    pub(crate) fn generate_symbol(&mut self, scope: ScopeId, name: impl Into<String>) -> Ref {
        let reference = self.new_symbol(SymbolKind::Injected, name);
        self.scopes[scope.idx()].generated.push(reference);
        reference
    }

    /// Declare a symbol in the current scope, applying hoisting and
    /// duplicate rules.
    pub(crate) fn declare_symbol(
        &mut self,
        kind: SymbolKind,
        name: impl Into<String>,
        span: Span,
    ) -> Ref {
        let name = name.into();
        let reference = self.new_symbol(kind, name.clone());

        let mut scope = self.current_scope();
        if kind.is_hoisted() {
            // Walk upward until a hoisting boundary. A `var` that crosses
            // a catch binding with the same name merges into the catch
            // identifier instead of escaping past it.
            loop {
                let scope_data = &self.scopes[scope.idx()];
                if scope_data.kind == ScopeKind::CatchBinding {
                    if let Some(&existing) = scope_data.members.get(&name) {
                        let inner = existing.inner.idx();
                        if self.symbols[inner].kind == SymbolKind::CatchIdentifier {
                            self.symbols[reference.inner.idx()].link = existing;
                            return existing;
                        }
                    }
                }
                if scope_data.kind.stops_hoisting() {
                    break;
                }
                scope = scope_data.parent.expect("hoisting walked past the root");
            }
        }

        if let Some(&existing) = self.scopes[scope.idx()].members.get(&name) {
            let existing_kind = self.symbols[existing.inner.idx()].kind;
            match merge_decision(existing_kind, kind) {
                MergeKind::KeepExisting => {
                    self.symbols[reference.inner.idx()].link = existing;
                    return existing;
                }
                MergeKind::ReplaceExisting => {
                    self.symbols[existing.inner.idx()].link = reference;
                }
                MergeKind::Forbidden => {
                    self.error(
                        span,
                        format!("the symbol \"{name}\" has already been declared"),
                    );
                    return existing;
                }
            }
        }
        self.scopes[scope.idx()].members.insert(name, reference);
        reference
    }

    pub(crate) fn is_strict_mode(&self) -> bool {
        self.scopes[self.current_scope().idx()].strict_mode
    }

    // =========================================================================
    // Import records
    // =========================================================================

    pub(crate) fn add_import_record(
        &mut self,
        kind: ImportKind,
        span: Span,
        specifier: impl Into<String>,
    ) -> u32 {
        let index = self.import_records.len() as u32;
        self.import_records
            .push(ImportRecord::new(span, specifier, kind));
        index
    }

    // =========================================================================
    // Speculative parsing
    // =========================================================================

    pub(crate) fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot {
            lexer: self.lexer.snapshot(),
            symbols_len: self.symbols.len(),
            scopes_len: self.scopes.len(),
            scope_stack_len: self.scope_stack.len(),
            scope_order_len: self.scopes_in_order.len(),
            import_records_len: self.import_records.len(),
            fn_flags: self.fn_flags,
        }
    }

    pub(crate) fn restore(&mut self, snapshot: ParserSnapshot) {
        let ParserSnapshot {
            lexer,
            symbols_len,
            scopes_len,
            scope_stack_len,
            scope_order_len,
            import_records_len,
            fn_flags,
        } = snapshot;
        self.lexer.restore(lexer);
        self.symbols.truncate(symbols_len);
        self.scopes.truncate(scopes_len);
        self.scope_stack.truncate(scope_stack_len);
        self.scopes_in_order.truncate(scope_order_len);
        self.import_records.truncate(import_records_len);
        self.fn_flags = fn_flags;
        // Scopes pushed by the probe are gone; scrub dangling child links
        // and member refs pointing at discarded arenas
        let scope_limit = scopes_len as u32;
        let symbol_limit = symbols_len as u32;
        for scope in &mut self.scopes {
            scope.children.retain(|c| c.0 < scope_limit);
            scope.members.retain(|_, r| r.inner.0 < symbol_limit);
            scope.generated.retain(|r| r.inner.0 < symbol_limit);
        }
    }

    /// Skim tokens from the current position, balancing brackets, and
    /// report what follows the matching `)`. Restores the lexer.
    pub(crate) fn token_after_matching_paren(&mut self) -> Token {
        debug_assert_eq!(self.lexer.token, Token::OpenParen);
        let snapshot = self.lexer.snapshot();
        let mut depth = 0i32;
        loop {
            match self.lexer.token {
                Token::OpenParen | Token::OpenBracket | Token::OpenBrace => depth += 1,
                Token::CloseParen | Token::CloseBracket | Token::CloseBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.lexer.next();
                        break;
                    }
                }
                Token::EndOfFile | Token::SyntaxError => break,
                _ => {}
            }
            self.lexer.next();
        }
        let after = self.lexer.token;
        self.lexer.restore(snapshot);
        after
    }
}

/// What to do when a name is declared twice in one scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MergeKind {
    KeepExisting,
    ReplaceExisting,
    Forbidden,
}

fn merge_decision(existing: SymbolKind, new: SymbolKind) -> MergeKind {
    use SymbolKind::*;
    match (existing, new) {
        // `var` freely re-declares over itself and over functions
        (Hoisted, Hoisted) => MergeKind::KeepExisting,
        (HoistedFunction | GeneratorOrAsyncFunction, Hoisted) => MergeKind::KeepExisting,
        (Hoisted, HoistedFunction | GeneratorOrAsyncFunction) => MergeKind::ReplaceExisting,
        // Later function declarations win
        (
            HoistedFunction | GeneratorOrAsyncFunction,
            HoistedFunction | GeneratorOrAsyncFunction,
        ) => MergeKind::ReplaceExisting,
        // A catch identifier tolerates a hoisted var of the same name
        (CatchIdentifier, Hoisted) => MergeKind::KeepExisting,
        // TypeScript declaration merging
        (TsNamespace, TsNamespace | Class | HoistedFunction | TsEnum) => MergeKind::KeepExisting,
        (Class | HoistedFunction | TsEnum, TsNamespace) => MergeKind::KeepExisting,
        (TsEnum, TsEnum) => MergeKind::KeepExisting,
        _ => MergeKind::Forbidden,
    }
}
