//! Pass 2: bind, fold, lower, and split into parts.
//!
//! This pass replays the scope order recorded by pass 1, resolves every
//! identifier reference to a symbol, performs compile-time substitution
//! and constant folding, eliminates dead branches, lowers syntax past the
//! configured target, applies the JSX and TypeScript transforms, and
//! finally groups top-level statements into [`Part`]s for tree-shaking.
//!
//! Visiting rebuilds each statement and expression bottom-up; the pass 1
//! tree itself is never mutated.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use jolt_common::charfreq::CharFreq;
use jolt_common::logger::{DiagnosticKind, Log, LogLevel};
use jolt_common::refs::{InnerIndex, Ref, SourceIndex};
use jolt_common::span::Span;

use crate::ast::*;
use crate::parser::{ParseOptions, Parser};
use crate::parts::{
    Ast, ExportsKind, ImportKind, ImportRecord, NS_EXPORT_PART_INDEX, NamedExport, NamedImport,
    Part,
};
use crate::scopes::{Scope, ScopeId, ScopeKind};
use crate::symbols::{Symbol, SymbolKind};

mod exprs;
mod fold;
mod jsx;
mod lower;
mod ts;

/// Import record specifier that always resolves to the runtime-helper
/// library (source index zero).
pub const RUNTIME_SPECIFIER: &str = "<runtime>";

pub(crate) struct Binder<'a> {
    pub(crate) log: &'a Log,
    pub(crate) path: String,
    pub(crate) source_index: SourceIndex,
    pub(crate) options: ParseOptions,

    pub(crate) symbols: Vec<Symbol>,
    pub(crate) scopes: Vec<Scope>,
    scope_order: Vec<ScopeId>,
    scope_cursor: usize,
    scope_stack: Vec<ScopeId>,

    pub(crate) import_records: Vec<ImportRecord>,

    module_scope: ScopeId,
    exports_ref: Ref,
    module_ref: Ref,

    // Per-part accumulation
    current_uses: FxHashMap<Ref, u32>,
    current_records: SmallVec<[u32; 2]>,
    current_mutations: SmallVec<[Ref; 1]>,

    // Module-level outputs
    named_imports: IndexMap<Ref, NamedImport>,
    named_exports: IndexMap<String, NamedExport>,
    export_star_records: SmallVec<[u32; 2]>,
    static_import_records: SmallVec<[u32; 4]>,
    runtime_imports: IndexMap<String, Ref>,
    runtime_record: Option<u32>,
    /// `(namespace, property)` → synthetic import item, so repeated
    /// `ns.prop` accesses share one symbol.
    import_items_cache: FxHashMap<(Ref, String), Ref>,

    /// Inside an eliminated branch: uses and records are not collected.
    is_control_flow_dead: bool,

    /// Temporaries allocated by lowering, per enclosing function.
    temp_stack: Vec<Vec<Ref>>,
    temp_counter: u32,

    has_top_level_return: bool,
    has_es_module_syntax: bool,
    hashbang: Option<String>,
}

/// Run pass 2 over the pass 1 output and produce the final [`Ast`].
pub(crate) fn finish(parser: Parser<'_>, stmts: Vec<Stmt>) -> Ast {
    let Parser {
        lexer,
        log,
        path,
        source_index,
        options,
        symbols,
        scopes,
        scopes_in_order,
        import_records,
        module_scope,
        exports_ref,
        module_ref,
        has_es_module_syntax,
        has_top_level_return,
        hashbang,
        ..
    } = parser;
    let source_text = lexer.source();

    let mut binder = Binder {
        log,
        path,
        source_index,
        options,
        symbols,
        scopes,
        scope_order: scopes_in_order,
        scope_cursor: 0,
        scope_stack: vec![module_scope],
        import_records,
        module_scope,
        exports_ref,
        module_ref,
        current_uses: FxHashMap::default(),
        current_records: SmallVec::new(),
        current_mutations: SmallVec::new(),
        named_imports: IndexMap::new(),
        named_exports: IndexMap::new(),
        export_star_records: SmallVec::new(),
        static_import_records: SmallVec::new(),
        runtime_imports: IndexMap::new(),
        runtime_record: None,
        import_items_cache: FxHashMap::default(),
        is_control_flow_dead: false,
        temp_stack: vec![Vec::new()],
        temp_counter: 0,
        has_top_level_return,
        has_es_module_syntax,
        hashbang,
    };

    let parts = binder.visit_top_level(stmts);
    binder.into_ast(parts, source_text)
}

impl<'a> Binder<'a> {
    // =========================================================================
    // Scope replay
    // =========================================================================

    fn enter_scope(&mut self) -> ScopeId {
        // Error recovery in pass 1 can leave the recorded order short of
        // the tree being visited; reusing the current scope keeps the
        // walk total so diagnostics still drain normally
        let id = if self.scope_cursor < self.scope_order.len() {
            let id = self.scope_order[self.scope_cursor];
            self.scope_cursor += 1;
            id
        } else {
            self.current_scope()
        };
        self.scope_stack.push(id);
        id
    }

    fn leave_scope(&mut self) {
        self.scope_stack.pop();
    }

    fn current_scope(&self) -> ScopeId {
        *self.scope_stack.last().unwrap()
    }

    /// The nearest scope `var` declarations land in; temporaries go there.
    fn hoist_target_scope(&self) -> ScopeId {
        for &id in self.scope_stack.iter().rev() {
            if self.scopes[id.idx()].kind.stops_hoisting() {
                return id;
            }
        }
        self.module_scope
    }

    pub(crate) fn is_top_level(&self) -> bool {
        self.current_scope() == self.module_scope
    }

    // =========================================================================
    // Symbols and uses
    // =========================================================================

    pub(crate) fn new_symbol(&mut self, kind: SymbolKind, name: impl Into<String>) -> Ref {
        let inner = InnerIndex(self.symbols.len() as u32);
        self.symbols.push(Symbol::new(kind, name));
        Ref::new(self.source_index, inner)
    }

    pub(crate) fn record_use(&mut self, reference: Ref) {
        if self.is_control_flow_dead {
            return;
        }
        self.symbols[reference.inner.idx()].use_count_estimate += 1;
        *self.current_uses.entry(reference).or_insert(0) += 1;
    }

    pub(crate) fn record_import_record(&mut self, index: u32) {
        if !self.is_control_flow_dead {
            self.current_records.push(index);
        }
    }

    /// Note an assignment to a symbol, for the code-splitting rule that
    /// keeps writers in the declaring part's chunk.
    pub(crate) fn record_mutation(&mut self, reference: Ref) {
        if !self.is_control_flow_dead && !self.current_mutations.contains(&reference) {
            self.current_mutations.push(reference);
        }
    }

    /// Resolve a name through the scope chain; unresolved names become
    /// unbound symbols in the module scope so every reference has one.
    pub(crate) fn resolve_name(&mut self, name: &str) -> Ref {
        for &id in self.scope_stack.iter().rev() {
            if let Some(&reference) = self.scopes[id.idx()].members.get(name) {
                return reference;
            }
        }
        let reference = self.new_symbol(SymbolKind::Unbound, name);
        self.symbols[reference.inner.idx()].must_not_be_renamed = true;
        self.scopes[self.module_scope.idx()]
            .members
            .insert(name.to_string(), reference);
        reference
    }

    /// Bind an identifier reference, producing the right variant for the
    /// printer (`ImportIdentifier` when the target is an import binding).
    pub(crate) fn bind_identifier(&mut self, span: Span, name: &str) -> Expr {
        let reference = self.resolve_name(name);
        self.record_use(reference);
        let identifier = EIdentifier { reference };
        let data = if self.symbols[reference.inner.idx()].kind == SymbolKind::Import {
            EData::ImportIdentifier(identifier)
        } else {
            EData::Identifier(identifier)
        };
        Expr::new(span, data)
    }

    /// A reference to a runtime-library helper, importing it on first use.
    pub(crate) fn runtime_ref(&mut self, helper: &str) -> Ref {
        if let Some(&reference) = self.runtime_imports.get(helper) {
            self.record_use(reference);
            return reference;
        }
        let record_index = match self.runtime_record {
            Some(index) => index,
            None => {
                let index = self.import_records.len() as u32;
                self.import_records.push(ImportRecord::new(
                    Span::dummy(),
                    RUNTIME_SPECIFIER,
                    ImportKind::Stmt,
                ));
                self.static_import_records.push(index);
                self.runtime_record = Some(index);
                index
            }
        };
        let reference = self.new_symbol(SymbolKind::Import, helper);
        self.scopes[self.module_scope.idx()].generated.push(reference);
        self.named_imports.insert(
            reference,
            NamedImport {
                alias: helper.to_string(),
                alias_span: Span::dummy(),
                namespace_ref: Ref::NONE,
                import_record_index: record_index,
            },
        );
        self.runtime_imports.insert(helper.to_string(), reference);
        self.record_use(reference);
        self.record_import_record(record_index);
        reference
    }

    /// Expression calling a runtime helper.
    pub(crate) fn runtime_call(&mut self, helper: &str, span: Span, args: Vec<Expr>) -> Expr {
        let reference = self.runtime_ref(helper);
        Expr::new(
            span,
            EData::Call(Box::new(ECall {
                target: Expr::new(span, EData::ImportIdentifier(EIdentifier { reference })),
                args,
                optional_chain: OptionalChain::None,
                is_direct_eval: false,
            })),
        )
    }

    /// Allocate a lowering temporary in the nearest hoisting scope. The
    /// declaration statement is flushed at the top of that function (or
    /// of the current part at module level).
    pub(crate) fn alloc_temp(&mut self, span: Span) -> Ref {
        let name = format!("_{}", temp_name_suffix(self.temp_counter));
        self.temp_counter += 1;
        let reference = self.new_symbol(SymbolKind::Hoisted, name);
        let scope = self.hoist_target_scope();
        self.scopes[scope.idx()].generated.push(reference);
        self.temp_stack
            .last_mut()
            .expect("temp stack underflow")
            .push(reference);
        self.record_use(reference);
        let _ = span;
        reference
    }

    /// `var _a, _b;` for any temporaries allocated while visiting a
    /// function body, prepended to that body.
    fn flush_temp_decls(&mut self, body: &mut Vec<Stmt>) {
        let temps = self.temp_stack.last_mut().expect("temp stack underflow");
        if temps.is_empty() {
            return;
        }
        let decls = std::mem::take(temps)
            .into_iter()
            .map(|reference| Decl {
                binding: Binding {
                    span: Span::dummy(),
                    data: BData::Identifier(reference),
                },
                value: None,
            })
            .collect();
        body.insert(
            0,
            Stmt::new(
                Span::dummy(),
                SData::Local(SLocal {
                    kind: LocalKind::Var,
                    decls,
                    is_export: false,
                }),
            ),
        );
    }

    // =========================================================================
    // Top level: parts
    // =========================================================================

    fn visit_top_level(&mut self, stmts: Vec<Stmt>) -> Vec<Part> {
        // Part 0 is reserved for the linker's export-getter installation
        let mut parts = vec![Part {
            can_be_removed_if_unused: true,
            ..Part::default()
        }];
        debug_assert_eq!(NS_EXPORT_PART_INDEX, 0);

        for stmt in stmts {
            self.current_uses.clear();
            self.current_records.clear();
            self.current_mutations.clear();
            let mut visited = self.visit_stmt(stmt);
            self.flush_temp_decls(&mut visited);
            if visited.is_empty() {
                continue;
            }

            let mut declared_symbols = Vec::new();
            for stmt in &visited {
                collect_declared_symbols(stmt, &mut declared_symbols);
            }
            let can_be_removed_if_unused =
                visited.iter().all(|stmt| self.stmt_can_be_removed_if_unused(stmt));

            let mut mutated_symbols = std::mem::take(&mut self.current_mutations);
            mutated_symbols.retain(|reference| !declared_symbols.contains(reference));
            parts.push(Part {
                stmts: visited,
                declared_symbols,
                symbol_uses: std::mem::take(&mut self.current_uses),
                import_record_indices: std::mem::take(&mut self.current_records),
                mutated_symbols,
                local_dependencies: SmallVec::new(),
                can_be_removed_if_unused,
                force_include: false,
                is_live: false,
            });
        }

        self.drop_unused_ts_imports(&mut parts);
        parts
    }

    /// TypeScript erases type-only uses; an import statement whose
    /// bindings all went unused existed only for types and is dropped.
    fn drop_unused_ts_imports(&mut self, parts: &mut [Part]) {
        if !self.options.loader.is_typescript() {
            return;
        }
        for part in parts.iter_mut() {
            let Some(stmt) = part.stmts.first() else {
                continue;
            };
            let SData::Import(import) = &stmt.data else {
                continue;
            };
            let import = import.clone();
            let span = stmt.span;

            let keep_item = |binder: &Binder<'_>, reference: Ref| {
                binder.symbols[reference.inner.idx()].use_count_estimate > 0
            };
            let default_used = import
                .default_name
                .map(|(reference, _)| keep_item(self, reference))
                .unwrap_or(false);
            let star_used = import.star_name_span.is_some()
                && keep_item(self, import.namespace_ref);
            let used_items: Vec<ImportItem> = import
                .items
                .iter()
                .filter(|item| keep_item(self, item.name_ref))
                .cloned()
                .collect();

            let had_bindings = import.default_name.is_some()
                || import.star_name_span.is_some()
                || !import.items.is_empty();
            if !had_bindings {
                // Bare imports are side-effect imports; keep them
                continue;
            }
            if default_used || star_used || !used_items.is_empty() {
                if used_items.len() != import.items.len() {
                    for item in &import.items {
                        if !keep_item(self, item.name_ref) {
                            self.named_imports.shift_remove(&item.name_ref);
                        }
                    }
                    let mut new_import = (*import).clone();
                    new_import.items = used_items;
                    part.stmts[0] = Stmt::new(span, SData::Import(Box::new(new_import)));
                }
                continue;
            }

            // Everything was type-only: drop the statement and its record
            for item in &import.items {
                self.named_imports.shift_remove(&item.name_ref);
            }
            if let Some((reference, _)) = import.default_name {
                self.named_imports.shift_remove(&reference);
            }
            self.named_imports.shift_remove(&import.namespace_ref);
            self.import_records[import.import_record_index as usize].is_unused = true;
            self.static_import_records
                .retain(|index| *index != import.import_record_index);
            part.stmts.clear();
            part.declared_symbols.clear();
            part.import_record_indices.clear();
            part.can_be_removed_if_unused = true;
        }
    }

    fn into_ast(mut self, parts: Vec<Part>, source_text: &str) -> Ast {
        // Character frequencies: everything in the file counts, minus the
        // names of symbols that renaming will replace
        let mut char_freq = CharFreq::default();
        char_freq.scan(source_text, 1);
        for symbol in &self.symbols {
            if symbol.kind != SymbolKind::Unbound
                && !symbol.must_not_be_renamed
                && symbol.use_count_estimate > 0
            {
                char_freq.scan(&symbol.original_name, -(symbol.use_count_estimate as i32));
            }
        }

        let mut top_level_symbols_to_parts: FxHashMap<Ref, SmallVec<[u32; 1]>> =
            FxHashMap::default();
        for (index, part) in parts.iter().enumerate() {
            for &declared in &part.declared_symbols {
                top_level_symbols_to_parts
                    .entry(declared)
                    .or_default()
                    .push(index as u32);
            }
        }

        let uses_exports_ref = self.symbols[self.exports_ref.inner.idx()].use_count_estimate > 0;
        let uses_module_ref = self.symbols[self.module_ref.inner.idx()].use_count_estimate > 0;

        let wrapper_name = format!("require_{}", module_stem(&self.path));
        let wrapper_ref = self.new_symbol(SymbolKind::Other, wrapper_name);
        self.scopes[self.module_scope.idx()].generated.push(wrapper_ref);

        Ast {
            parts,
            symbols: self.symbols,
            scopes: self.scopes,
            import_records: self.import_records,
            named_imports: self.named_imports,
            named_exports: self.named_exports,
            export_star_records: self.export_star_records,
            static_import_records: self.static_import_records,
            exports_kind: ExportsKind::None, // classified by the linker
            exports_ref: self.exports_ref,
            module_ref: self.module_ref,
            wrapper_ref,
            top_level_symbols_to_parts,
            runtime_imports: self.runtime_imports,
            char_freq,
            has_es_module_syntax: self.has_es_module_syntax,
            has_top_level_return: self.has_top_level_return,
            uses_exports_ref,
            uses_module_ref,
            hashbang: self.hashbang,
        }
    }

    // =========================================================================
    // Statement visiting
    // =========================================================================

    /// Visit one statement; lowering may expand it into several.
    pub(crate) fn visit_stmt(&mut self, stmt: Stmt) -> Vec<Stmt> {
        let span = stmt.span;
        match stmt.data {
            SData::Empty | SData::Debugger | SData::Directive(_) => vec![stmt],
            SData::TypeScript => Vec::new(),
            SData::Expr(expr) => {
                let expr = self.visit_expr(expr);
                // A bare string that folded out of a template keeps its
                // statement position harmlessly; drop pure literals when
                // minifying syntax
                if self.options.minify_syntax && expr.is_primitive_literal() {
                    return Vec::new();
                }
                vec![Stmt::new(span, SData::Expr(expr))]
            }
            SData::Block(stmts) => {
                self.enter_scope();
                let stmts = self.visit_stmts(stmts);
                self.leave_scope();
                vec![Stmt::new(span, SData::Block(stmts))]
            }
            SData::Local(local) => self.visit_local(span, local),
            SData::If(data) => self.visit_if(span, *data),
            SData::While(data) => {
                let test = self.visit_expr(data.test);
                let body = self.visit_stmt_single(data.body);
                vec![Stmt::new(span, SData::While(Box::new(SWhile { test, body })))]
            }
            SData::DoWhile(data) => {
                let body = self.visit_stmt_single(data.body);
                let test = self.visit_expr(data.test);
                vec![Stmt::new(span, SData::DoWhile(Box::new(SDoWhile { body, test })))]
            }
            SData::For(data) => {
                self.enter_scope();
                let data = *data;
                let init = data.init.map(|init| self.visit_stmt_single(init));
                let test = data.test.map(|test| self.visit_expr(test));
                let update = data.update.map(|update| self.visit_expr(update));
                let body = self.visit_stmt_single(data.body);
                self.leave_scope();
                vec![Stmt::new(
                    span,
                    SData::For(Box::new(SFor {
                        init,
                        test,
                        update,
                        body,
                    })),
                )]
            }
            SData::ForIn(data) => {
                self.enter_scope();
                let data = *data;
                let init = self.visit_stmt_single(data.init);
                let value = self.visit_expr(data.value);
                let body = self.visit_stmt_single(data.body);
                self.leave_scope();
                vec![Stmt::new(
                    span,
                    SData::ForIn(Box::new(SForInOf { init, value, body })),
                )]
            }
            SData::ForOf(data) => {
                self.enter_scope();
                let data = *data;
                let init = self.visit_stmt_single(data.init);
                let value = self.visit_expr(data.value);
                let body = self.visit_stmt_single(data.body);
                self.leave_scope();
                vec![Stmt::new(
                    span,
                    SData::ForOf(Box::new(SForInOf { init, value, body })),
                )]
            }
            SData::Switch(data) => {
                let data = *data;
                let test = self.visit_expr(data.test);
                self.enter_scope();
                let cases = data
                    .cases
                    .into_iter()
                    .map(|case| SwitchCase {
                        test: case.test.map(|test| self.visit_expr(test)),
                        body: self.visit_stmts(case.body),
                    })
                    .collect();
                self.leave_scope();
                vec![Stmt::new(span, SData::Switch(Box::new(SSwitch { test, cases })))]
            }
            SData::Try(data) => {
                let data = *data;
                self.enter_scope();
                let body = self.visit_stmts(data.body);
                self.leave_scope();
                let catch = data.catch.map(|catch| {
                    self.enter_scope();
                    let binding = catch.binding.map(|binding| self.visit_binding(binding));
                    self.enter_scope();
                    let catch_body = self.visit_stmts(catch.body);
                    self.leave_scope();
                    self.leave_scope();
                    Catch {
                        binding,
                        body: catch_body,
                    }
                });
                let catch = match catch {
                    Some(catch) if catch.binding.is_none()
                        && !self.options.target.supports_optional_catch_binding() =>
                    {
                        Some(self.lower_optional_catch_binding(catch))
                    }
                    other => other,
                };
                let finally = data.finally.map(|finally| {
                    self.enter_scope();
                    let stmts = self.visit_stmts(finally);
                    self.leave_scope();
                    stmts
                });
                vec![Stmt::new(
                    span,
                    SData::Try(Box::new(STry {
                        body,
                        catch,
                        finally,
                    })),
                )]
            }
            SData::Return(value) => {
                let value = value.map(|value| self.visit_expr(value));
                vec![Stmt::new(span, SData::Return(value))]
            }
            SData::Throw(value) => {
                let value = self.visit_expr(value);
                vec![Stmt::new(span, SData::Throw(value))]
            }
            SData::Break(label) => vec![Stmt::new(span, SData::Break(label))],
            SData::Continue(label) => vec![Stmt::new(span, SData::Continue(label))],
            SData::Label(data) => {
                self.enter_scope();
                let data = *data;
                let inner = self.visit_stmt_single(data.stmt);
                self.leave_scope();
                vec![Stmt::new(
                    span,
                    SData::Label(Box::new(SLabel {
                        name_ref: data.name_ref,
                        stmt: inner,
                    })),
                )]
            }
            SData::With(data) => {
                let data = *data;
                let value = self.visit_expr(data.value);
                self.enter_scope();
                // Nothing visible from a with body may be renamed
                self.disable_renaming_in_scope_chain();
                let body = self.visit_stmt_single(data.body);
                self.leave_scope();
                vec![Stmt::new(span, SData::With(Box::new(SWith { value, body })))]
            }
            SData::Function(data) => {
                if data.is_export && self.is_top_level() {
                    if let Some(name_ref) = data.func.name {
                        let name = self.symbols[name_ref.inner.idx()].original_name.clone();
                        self.named_exports.insert(
                            name,
                            NamedExport {
                                reference: name_ref,
                                alias_span: span,
                            },
                        );
                    }
                }
                let func = self.visit_fn(data.func);
                vec![Stmt::new(
                    span,
                    SData::Function(SFunction {
                        func,
                        is_export: data.is_export,
                    }),
                )]
            }
            SData::Class(data) => self.visit_class_stmt(span, data),
            SData::Enum(data) => self.lower_enum(span, *data),
            SData::Namespace(data) => self.lower_namespace(span, *data),
            SData::Import(import) => self.visit_import(span, *import),
            SData::ExportClause(items) => self.visit_export_clause(span, items),
            SData::ExportDefault(data) => self.visit_export_default(span, *data),
            SData::ExportFrom(data) => self.visit_export_from(span, *data),
            SData::ExportStar(data) => {
                self.record_import_record(data.import_record_index);
                self.export_star_records.push(data.import_record_index);
                self.static_import_records.push(data.import_record_index);
                vec![Stmt::new(span, SData::ExportStar(data))]
            }
        }
    }

    pub(crate) fn visit_stmts(&mut self, stmts: Vec<Stmt>) -> Vec<Stmt> {
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            out.extend(self.visit_stmt(stmt));
        }
        out
    }

    /// Visit a statement in single-statement position (loop bodies);
    /// expansion wraps in a block.
    fn visit_stmt_single(&mut self, stmt: Stmt) -> Stmt {
        let span = stmt.span;
        let mut visited = self.visit_stmt(stmt);
        match visited.len() {
            0 => Stmt::new(span, SData::Empty),
            1 => visited.remove(0),
            _ => Stmt::new(span, SData::Block(visited)),
        }
    }

    fn visit_local(&mut self, span: Span, local: SLocal) -> Vec<Stmt> {
        let SLocal {
            kind,
            decls,
            is_export,
        } = local;
        let decls: Vec<Decl> = decls
            .into_iter()
            .map(|decl| {
                let binding = self.visit_binding(decl.binding);
                let value = decl.value.map(|value| self.visit_expr(value));
                Decl { binding, value }
            })
            .collect();

        if is_export && self.is_top_level() {
            for decl in &decls {
                self.export_binding_symbols(&decl.binding);
            }
        }
        vec![Stmt::new(
            span,
            SData::Local(SLocal {
                kind,
                decls,
                is_export,
            }),
        )]
    }

    /// Register every identifier of an exported binding pattern as a
    /// named export under its own name.
    fn export_binding_symbols(&mut self, binding: &Binding) {
        match &binding.data {
            BData::Identifier(reference) => {
                let name = self.symbols[reference.inner.idx()].original_name.clone();
                self.named_exports.insert(
                    name,
                    NamedExport {
                        reference: *reference,
                        alias_span: binding.span,
                    },
                );
            }
            BData::Array(array) => {
                for item in &array.items {
                    self.export_binding_symbols(&item.binding);
                }
            }
            BData::Object(object) => {
                for property in &object.properties {
                    self.export_binding_symbols(&property.binding);
                }
            }
            BData::Missing => {}
        }
    }

    fn visit_class_stmt(&mut self, span: Span, data: SClass) -> Vec<Stmt> {
        let SClass { class, is_export } = data;
        let name_ref = class.name;
        let (class, extra_stmts) = self.visit_class_inner(class, true);
        if is_export && self.is_top_level() {
            if let Some(reference) = name_ref {
                let name = self.symbols[reference.inner.idx()].original_name.clone();
                self.named_exports.insert(
                    name,
                    NamedExport {
                        reference,
                        alias_span: span,
                    },
                );
            }
        }
        let mut out = vec![Stmt::new(span, SData::Class(SClass { class, is_export }))];
        out.extend(extra_stmts);
        out
    }

    fn visit_if(&mut self, span: Span, data: SIf) -> Vec<Stmt> {
        let test = self.visit_expr(data.test);

        // Dead-branch elimination: a literal test leaves one branch
        if let Some(truthy) = fold::known_truthiness(&test.data) {
            let (live, dead) = if truthy {
                (Some(data.yes), data.no)
            } else {
                (data.no, Some(data.yes))
            };

            // The dead branch is still visited (with collection off) so
            // the scope replay stays aligned, then reduced to its hoisted
            // declarations, which remain visible by hoisting semantics
            let mut out = Vec::new();
            let mut hoisted = Vec::new();
            if let Some(dead_stmt) = dead {
                let was_dead = self.is_control_flow_dead;
                self.is_control_flow_dead = true;
                let visited = self.visit_stmt(dead_stmt);
                self.is_control_flow_dead = was_dead;
                for stmt in &visited {
                    collect_hoisted_declarations(stmt, &mut hoisted);
                }
            }
            if !hoisted.is_empty() {
                let decls = hoisted
                    .into_iter()
                    .map(|reference| Decl {
                        binding: Binding {
                            span: Span::dummy(),
                            data: BData::Identifier(reference),
                        },
                        value: None,
                    })
                    .collect();
                out.push(Stmt::new(
                    Span::dummy(),
                    SData::Local(SLocal {
                        kind: LocalKind::Var,
                        decls,
                        is_export: false,
                    }),
                ));
            }
            if let Some(live_stmt) = live {
                out.push(self.visit_stmt_single(live_stmt));
            }
            return out;
        }

        let yes = self.visit_stmt_single(data.yes);
        let no = data.no.map(|no| self.visit_stmt_single(no));
        vec![Stmt::new(span, SData::If(Box::new(SIf { test, yes, no })))]
    }

    fn visit_import(&mut self, span: Span, import: SImport) -> Vec<Stmt> {
        self.record_import_record(import.import_record_index);
        self.static_import_records.push(import.import_record_index);

        if let Some((reference, name_span)) = import.default_name {
            self.named_imports.insert(
                reference,
                NamedImport {
                    alias: "default".to_string(),
                    alias_span: name_span,
                    namespace_ref: import.namespace_ref,
                    import_record_index: import.import_record_index,
                },
            );
        }
        if import.star_name_span.is_some() {
            self.named_imports.insert(
                import.namespace_ref,
                NamedImport {
                    alias: "*".to_string(),
                    alias_span: import.star_name_span.unwrap_or(span),
                    namespace_ref: import.namespace_ref,
                    import_record_index: import.import_record_index,
                },
            );
        }
        for item in &import.items {
            self.named_imports.insert(
                item.name_ref,
                NamedImport {
                    alias: item.alias.clone(),
                    alias_span: item.alias_span,
                    namespace_ref: import.namespace_ref,
                    import_record_index: import.import_record_index,
                },
            );
        }
        vec![Stmt::new(span, SData::Import(Box::new(import)))]
    }

    fn visit_export_clause(&mut self, span: Span, items: Vec<ExportItem>) -> Vec<Stmt> {
        let mut out_items = Vec::with_capacity(items.len());
        for item in items {
            let reference = self.resolve_name(&item.name);
            self.record_use(reference);
            self.named_exports.insert(
                item.alias.clone(),
                NamedExport {
                    reference,
                    alias_span: item.name_span,
                },
            );
            out_items.push(item);
        }
        vec![Stmt::new(span, SData::ExportClause(out_items))]
    }

    fn visit_export_default(&mut self, span: Span, data: SExportDefault) -> Vec<Stmt> {
        let default_ref = data.default_name_ref;
        self.named_exports.insert(
            "default".to_string(),
            NamedExport {
                reference: default_ref,
                alias_span: span,
            },
        );
        let value = match data.value {
            ExportDefaultValue::Expr(expr) => ExportDefaultValue::Expr(self.visit_expr(expr)),
            ExportDefaultValue::Function(func) => {
                let func = self.visit_fn(func);
                // The function's own name (if any) is an alias of the
                // default export
                if let Some(name_ref) = func.name {
                    self.symbols[default_ref.inner.idx()].link = name_ref;
                }
                ExportDefaultValue::Function(func)
            }
            ExportDefaultValue::Class(class) => {
                let (class, extra) = self.visit_class_inner(class, true);
                if let Some(name_ref) = class.name {
                    self.symbols[default_ref.inner.idx()].link = name_ref;
                }
                if !extra.is_empty() {
                    // Static lowering pieces follow the export statement
                    let mut out = vec![Stmt::new(
                        span,
                        SData::ExportDefault(Box::new(SExportDefault {
                            default_name_ref: default_ref,
                            value: ExportDefaultValue::Class(class),
                        })),
                    )];
                    out.extend(extra);
                    return out;
                }
                ExportDefaultValue::Class(class)
            }
        };
        vec![Stmt::new(
            span,
            SData::ExportDefault(Box::new(SExportDefault {
                default_name_ref: default_ref,
                value,
            })),
        )]
    }

    fn visit_export_from(&mut self, span: Span, data: SExportFrom) -> Vec<Stmt> {
        self.record_import_record(data.import_record_index);
        self.static_import_records.push(data.import_record_index);

        if let Some(alias) = &data.star_alias {
            // `export * as ns from "m"`: import the namespace, export it
            self.named_imports.insert(
                data.namespace_ref,
                NamedImport {
                    alias: "*".to_string(),
                    alias_span: span,
                    namespace_ref: data.namespace_ref,
                    import_record_index: data.import_record_index,
                },
            );
            self.named_exports.insert(
                alias.clone(),
                NamedExport {
                    reference: data.namespace_ref,
                    alias_span: span,
                },
            );
        } else {
            for item in &data.items {
                // Each re-exported name is an import binding plus an
                // export of that binding
                let reference = self.new_symbol(SymbolKind::Import, item.name.clone());
                self.scopes[self.module_scope.idx()].generated.push(reference);
                self.named_imports.insert(
                    reference,
                    NamedImport {
                        alias: item.name.clone(),
                        alias_span: item.name_span,
                        namespace_ref: data.namespace_ref,
                        import_record_index: data.import_record_index,
                    },
                );
                self.named_exports.insert(
                    item.alias.clone(),
                    NamedExport {
                        reference,
                        alias_span: item.name_span,
                    },
                );
            }
        }
        vec![Stmt::new(span, SData::ExportFrom(Box::new(data)))]
    }

    // =========================================================================
    // Functions, classes, bindings
    // =========================================================================

    pub(crate) fn visit_fn(&mut self, func: Func) -> Func {
        self.enter_scope(); // args
        let args = func
            .args
            .into_iter()
            .map(|arg| Arg {
                binding: self.visit_binding(arg.binding),
                default: arg.default.map(|default| self.visit_expr(default)),
                is_parameter_property: arg.is_parameter_property,
            })
            .collect();
        self.enter_scope(); // body
        self.temp_stack.push(Vec::new());
        let mut body = self.visit_stmts(func.body);
        self.flush_temp_decls(&mut body);
        self.temp_stack.pop();
        self.leave_scope();
        self.leave_scope();
        Func {
            name: func.name,
            args,
            has_rest_arg: func.has_rest_arg,
            is_async: func.is_async,
            is_generator: func.is_generator,
            body,
        }
    }

    pub(crate) fn visit_arrow(&mut self, arrow: EArrow) -> EArrow {
        self.enter_scope(); // args
        let args = arrow
            .args
            .into_iter()
            .map(|arg| Arg {
                binding: self.visit_binding(arg.binding),
                default: arg.default.map(|default| self.visit_expr(default)),
                is_parameter_property: arg.is_parameter_property,
            })
            .collect();
        let has_body_scope = !arrow.prefer_expr;
        if has_body_scope {
            self.enter_scope();
        }
        self.temp_stack.push(Vec::new());
        let mut body = self.visit_stmts(arrow.body);
        self.flush_temp_decls(&mut body);
        self.temp_stack.pop();
        if has_body_scope {
            self.leave_scope();
        }
        self.leave_scope();
        let prefer_expr = arrow.prefer_expr
            && matches!(body.as_slice(), [Stmt { data: SData::Return(Some(_)), .. }]);
        EArrow {
            args,
            has_rest_arg: arrow.has_rest_arg,
            is_async: arrow.is_async,
            prefer_expr,
            body,
        }
    }

    pub(crate) fn visit_binding(&mut self, binding: Binding) -> Binding {
        let span = binding.span;
        let data = match binding.data {
            BData::Identifier(reference) => BData::Identifier(reference),
            BData::Missing => BData::Missing,
            BData::Array(array) => BData::Array(BArray {
                items: array
                    .items
                    .into_iter()
                    .map(|item| BArrayItem {
                        binding: self.visit_binding(item.binding),
                        default: item.default.map(|default| self.visit_expr(default)),
                    })
                    .collect(),
                has_spread: array.has_spread,
            }),
            BData::Object(object) => BData::Object(BObject {
                properties: object
                    .properties
                    .into_iter()
                    .map(|property| BProperty {
                        key: self.visit_expr(property.key),
                        is_computed: property.is_computed,
                        is_spread: property.is_spread,
                        binding: self.visit_binding(property.binding),
                        default: property.default.map(|default| self.visit_expr(default)),
                    })
                    .collect(),
            }),
        };
        Binding { span, data }
    }

    fn disable_renaming_in_scope_chain(&mut self) {
        for &id in self.scope_stack.clone().iter() {
            let members: Vec<Ref> = self.scopes[id.idx()].members.values().copied().collect();
            for reference in members {
                if reference.source == self.source_index {
                    self.symbols[reference.inner.idx()].must_not_be_renamed = true;
                }
            }
        }
    }

    /// Mark every scope on the stack as containing a direct eval, which
    /// disables renaming for everything those scopes can see.
    pub(crate) fn mark_direct_eval(&mut self) {
        for &id in self.scope_stack.clone().iter() {
            self.scopes[id.idx()].contains_direct_eval = true;
            let members: Vec<Ref> = self.scopes[id.idx()].members.values().copied().collect();
            for reference in members {
                if reference.source == self.source_index {
                    self.symbols[reference.inner.idx()].must_not_be_renamed = true;
                }
            }
        }
    }

    /// Whether dropping this statement (when nothing references its
    /// declarations) can change program behavior.
    fn stmt_can_be_removed_if_unused(&self, stmt: &Stmt) -> bool {
        match &stmt.data {
            SData::Function(_) | SData::Empty | SData::TypeScript | SData::Directive(_) => true,
            SData::Class(class) => self.class_can_be_removed_if_unused(&class.class),
            // Importing a module evaluates it; the statement must stay
            // so the target's side effects run
            SData::Import(_) => false,
            SData::ExportClause(_) => true,
            SData::ExportFrom(_) | SData::ExportStar(_) => false,
            SData::ExportDefault(data) => match &data.value {
                ExportDefaultValue::Expr(expr) => self.expr_can_be_removed_if_unused(expr),
                ExportDefaultValue::Function(_) => true,
                ExportDefaultValue::Class(class) => self.class_can_be_removed_if_unused(class),
            },
            SData::Local(local) => local.decls.iter().all(|decl| {
                decl.value
                    .as_ref()
                    .map(|value| self.expr_can_be_removed_if_unused(value))
                    .unwrap_or(true)
            }),
            _ => false,
        }
    }

    fn class_can_be_removed_if_unused(&self, class: &Class) -> bool {
        let extends_ok = class
            .extends
            .as_ref()
            .map(|extends| self.expr_can_be_removed_if_unused(extends))
            .unwrap_or(true);
        extends_ok
            && class.members.iter().all(|member| match member {
                ClassMember::Method(_) => true,
                ClassMember::Field(field) => {
                    !field.is_static
                        || field
                            .value
                            .as_ref()
                            .map(|value| self.expr_can_be_removed_if_unused(value))
                            .unwrap_or(true)
                }
                ClassMember::StaticBlock(body) => body.is_empty(),
            })
    }

    /// Side-effect-free expressions for tree-shaking classification.
    pub(crate) fn expr_can_be_removed_if_unused(&self, expr: &Expr) -> bool {
        match &expr.data {
            EData::Null
            | EData::Undefined
            | EData::Boolean(_)
            | EData::Number(_)
            | EData::String(_)
            | EData::BigInt(_)
            | EData::RegExp(_)
            | EData::Identifier(_)
            | EData::ImportIdentifier(_)
            | EData::Function(_)
            | EData::Arrow(_)
            | EData::This
            | EData::ImportMeta
            | EData::Missing => true,
            EData::Array(array) => array
                .items
                .iter()
                .all(|item| self.expr_can_be_removed_if_unused(item)),
            EData::Object(object) => object.properties.iter().all(|property| {
                !property.is_computed
                    && property.kind != PropertyKind::Spread
                    && property
                        .value
                        .as_ref()
                        .map(|value| self.expr_can_be_removed_if_unused(value))
                        .unwrap_or(true)
            }),
            EData::Template(template) => {
                template.tag.is_none()
                    && template
                        .parts
                        .iter()
                        .all(|part| self.expr_can_be_removed_if_unused(&part.value))
            }
            EData::Unary(unary) => {
                !matches!(unary.op, UnOp::Delete | UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec)
                    && self.expr_can_be_removed_if_unused(&unary.value)
            }
            EData::Binary(binary) => {
                !binary.op.is_assign()
                    && self.expr_can_be_removed_if_unused(&binary.left)
                    && self.expr_can_be_removed_if_unused(&binary.right)
            }
            EData::Conditional(cond) => {
                self.expr_can_be_removed_if_unused(&cond.test)
                    && self.expr_can_be_removed_if_unused(&cond.yes)
                    && self.expr_can_be_removed_if_unused(&cond.no)
            }
            EData::Class(class) => self.class_can_be_removed_if_unused(class),
            EData::Spread(value) => self.expr_can_be_removed_if_unused(value),
            _ => false,
        }
    }
}

/// Collect refs declared by a top-level statement for part bookkeeping.
fn collect_declared_symbols(stmt: &Stmt, out: &mut Vec<Ref>) {
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

    match &stmt.data {
        SData::Local(local) => {
            for decl in &local.decls {
                from_binding(&decl.binding, out);
            }
        }
        SData::Function(func) => {
            if let Some(name) = func.func.name {
                out.push(name);
            }
        }
        SData::Class(class) => {
            if let Some(name) = class.class.name {
                out.push(name);
            }
        }
        SData::Import(import) => {
            if let Some((reference, _)) = import.default_name {
                out.push(reference);
            }
            out.push(import.namespace_ref);
            for item in &import.items {
                out.push(item.name_ref);
            }
        }
        SData::ExportDefault(data) => {
            out.push(data.default_name_ref);
            match &data.value {
                ExportDefaultValue::Function(func) => {
                    if let Some(name) = func.name {
                        out.push(name);
                    }
                }
                ExportDefaultValue::Class(class) => {
                    if let Some(name) = class.name {
                        out.push(name);
                    }
                }
                ExportDefaultValue::Expr(_) => {}
            }
        }
        SData::ExportFrom(data) => {
            out.push(data.namespace_ref);
        }
        SData::Label(label) => collect_declared_symbols(&label.stmt, out),
        _ => {}
    }
}

/// `var` and function declarations that must survive dead-branch
/// elimination because hoisting makes them visible outside the branch.
fn collect_hoisted_declarations(stmt: &Stmt, out: &mut Vec<Ref>) {
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

    match &stmt.data {
        SData::Local(local) if local.kind == LocalKind::Var => {
            for decl in &local.decls {
                from_binding(&decl.binding, out);
            }
        }
        SData::Function(func) => {
            if let Some(name) = func.func.name {
                out.push(name);
            }
        }
        SData::Block(stmts) => {
            for stmt in stmts {
                collect_hoisted_declarations(stmt, out);
            }
        }
        SData::If(data) => {
            collect_hoisted_declarations(&data.yes, out);
            if let Some(no) = &data.no {
                collect_hoisted_declarations(no, out);
            }
        }
        SData::While(data) => collect_hoisted_declarations(&data.body, out),
        SData::DoWhile(data) => collect_hoisted_declarations(&data.body, out),
        SData::For(data) => {
            if let Some(init) = &data.init {
                collect_hoisted_declarations(init, out);
            }
            collect_hoisted_declarations(&data.body, out);
        }
        SData::ForIn(data) | SData::ForOf(data) => {
            collect_hoisted_declarations(&data.init, out);
            collect_hoisted_declarations(&data.body, out);
        }
        SData::Try(data) => {
            for stmt in &data.body {
                collect_hoisted_declarations(stmt, out);
            }
            if let Some(catch) = &data.catch {
                for stmt in &catch.body {
                    collect_hoisted_declarations(stmt, out);
                }
            }
            if let Some(finally) = &data.finally {
                for stmt in finally {
                    collect_hoisted_declarations(stmt, out);
                }
            }
        }
        SData::Label(label) => collect_hoisted_declarations(&label.stmt, out),
        SData::Switch(data) => {
            for case in &data.cases {
                for stmt in &case.body {
                    collect_hoisted_declarations(stmt, out);
                }
            }
        }
        _ => {}
    }
}

fn temp_name_suffix(counter: u32) -> String {
    let letters = b"abcdefghijklmnopqrstuvwxyz";
    let mut remaining = counter as usize;
    let mut out = String::new();
    loop {
        out.insert(0, letters[remaining % 26] as char);
        remaining /= 26;
        if remaining == 0 {
            break;
        }
        remaining -= 1;
    }
    out
}

fn module_stem(path: &str) -> String {
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let stem = base.split('.').next().unwrap_or(base);
    let mut out = String::with_capacity(stem.len());
    for c in stem.chars() {
        if jolt_lexer::is_identifier_continue(c) {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}
