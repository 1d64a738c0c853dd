//! The linker: composes per-file ASTs into bundles.
//!
//! Phases run in order, each internally parallel or sharded by file but
//! serialized against the others:
//!
//! 1. classify — CommonJS-style vs ES-module-style per file
//! 2. wrappers — which modules need a lazy `require_*` closure
//! 3. resolve exports — own exports plus `export *` expansion
//! 4. match imports — union-find symbol merging (scope hoisting) and
//!    namespace aliases for CommonJS targets
//! 5. tree-shake — part-level reachability from each entry point
//! 6. chunk — partition live parts, assign names, print, concatenate
//!
//! `follow_all` runs after import matching so later phases can traverse
//! symbol links without writes.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use jolt_common::logger::{DiagnosticKind, Log, LogLevel};
use jolt_common::options::BuildOptions;
use jolt_common::refs::{Ref, SourceIndex};
use jolt_common::source::Source;

use jolt_parser::parts::{Ast, ExportsKind, ImportKind};
use jolt_parser::symbols::{NamespaceAlias, SymbolMap};

mod chunks;
mod shake;

pub use chunks::OutputFile;

#[derive(Clone, Debug, Default)]
pub struct FileMeta {
    pub exports_kind: ExportsKind,
    /// Wrapped in a `__commonJS` closure with a `require_*` accessor.
    pub wrap: bool,
    /// Needs a materialized exports object (`var x_exports = {}` plus
    /// `__export(...)` getter installation in part 0).
    pub needs_exports_object: bool,
    /// Export name → canonical symbol, including `export *` expansion.
    pub resolved_exports: IndexMap<String, Ref>,
}

pub struct Linker<'a> {
    pub options: &'a BuildOptions,
    pub log: &'a Log,
    pub sources: Vec<Source>,
    pub asts: Vec<Ast>,
    pub symbols: SymbolMap,
    pub entry_points: Vec<SourceIndex>,
    pub meta: Vec<FileMeta>,
}

impl<'a> Linker<'a> {
    pub fn new(
        options: &'a BuildOptions,
        log: &'a Log,
        sources: Vec<Source>,
        mut asts: Vec<Ast>,
        entry_points: Vec<SourceIndex>,
    ) -> Self {
        // Assemble the two-level symbol map; the per-file arrays are
        // complete now and only `link`/`name` mutate from here on
        let mut symbols = SymbolMap::with_source_count(asts.len());
        for (index, ast) in asts.iter_mut().enumerate() {
            symbols.outer[index] = std::mem::take(&mut ast.symbols);
        }
        symbols.seed_output_names();

        let meta = vec![FileMeta::default(); asts.len()];
        Linker {
            options,
            log,
            sources,
            asts,
            symbols,
            entry_points,
            meta,
        }
    }

    pub fn link(mut self) -> Vec<OutputFile> {
        let _span = tracing::info_span!("link").entered();

        self.classify_modules();
        self.decide_wrappers();
        self.resolve_exports();
        self.match_imports();
        // Pre-walk every chain once: later phases (and parallel
        // printing) may then follow links without any writes
        self.symbols.follow_all();
        chunks::generate(self)
    }

    // =========================================================================
    // Phase: classify
    // =========================================================================

    /// CommonJS-style when the parser saw `exports`/`module` usage or a
    /// top-level return; otherwise ES-module-style.
    fn classify_modules(&mut self) {
        for index in 0..self.asts.len() {
            let ast = &self.asts[index];
            let kind = if ast.uses_exports_ref || ast.uses_module_ref || ast.has_top_level_return {
                ExportsKind::CommonJs
            } else if ast.has_es_module_syntax || !ast.named_exports.is_empty() {
                ExportsKind::Esm
            } else {
                ExportsKind::None
            };
            self.meta[index].exports_kind = kind;
        }
    }

    // =========================================================================
    // Phase: wrappers
    // =========================================================================

    /// CommonJS modules and every `require()`/dynamic-import target get
    /// the lazy wrapper: repeated requires must be idempotent, and a
    /// dynamically imported module needs a callable handle.
    fn decide_wrappers(&mut self) {
        let mut force_cjs: FxHashSet<SourceIndex> = FxHashSet::default();
        for ast in &self.asts {
            for record in &ast.import_records {
                if record.is_unused {
                    continue;
                }
                let Some(target) = record.source_index else {
                    continue;
                };
                match record.kind {
                    ImportKind::Require => {
                        force_cjs.insert(target);
                    }
                    ImportKind::Dynamic if !self.options.splitting => {
                        force_cjs.insert(target);
                    }
                    _ => {}
                }
            }
        }

        for index in 0..self.asts.len() {
            let source_index = SourceIndex(index as u32);
            let meta = &mut self.meta[index];
            if meta.exports_kind == ExportsKind::CommonJs {
                meta.wrap = true;
            } else if force_cjs.contains(&source_index) {
                // An ES module consumed through require() keeps its
                // statements but gains a wrapper plus a materialized
                // exports object
                meta.wrap = true;
                meta.needs_exports_object = !self.asts[index].named_exports.is_empty();
            }
        }
    }

    /// Whether importers must reach this module through its exports
    /// object instead of bare identifiers.
    fn is_consumed_as_commonjs(&self, index: usize) -> bool {
        self.meta[index].exports_kind == ExportsKind::CommonJs || self.meta[index].wrap
    }

    // =========================================================================
    // Phase: resolve exports
    // =========================================================================

    fn resolve_exports(&mut self) {
        // Step 1: every module's own named exports
        for index in 0..self.asts.len() {
            let mut resolved = IndexMap::new();
            for (name, export) in &self.asts[index].named_exports {
                resolved.insert(name.clone(), export.reference);
            }
            self.meta[index].resolved_exports = resolved;
        }

        // Step 2: expand `export * from`, transitively with cycle
        // detection. A wildcard over a CommonJS or external module
        // cannot be expanded statically; the exporter falls back to
        // runtime lookups.
        for index in 0..self.asts.len() {
            if self.asts[index].export_star_records.is_empty() {
                continue;
            }
            let mut seen = FxHashSet::default();
            let mut gathered: Vec<(String, Ref)> = Vec::new();
            let mut has_dynamic_fallback = false;
            self.gather_star_exports(index, &mut seen, &mut gathered, &mut has_dynamic_fallback);

            let meta = &mut self.meta[index];
            for (name, reference) in gathered {
                if name != "default" && !meta.resolved_exports.contains_key(&name) {
                    meta.resolved_exports.insert(name, reference);
                }
            }
            if has_dynamic_fallback && meta.exports_kind == ExportsKind::Esm {
                meta.exports_kind = ExportsKind::EsmWithDynamicFallback;
            }
        }
    }

    fn gather_star_exports(
        &self,
        index: usize,
        seen: &mut FxHashSet<usize>,
        out: &mut Vec<(String, Ref)>,
        has_dynamic_fallback: &mut bool,
    ) {
        if !seen.insert(index) {
            return;
        }
        for &record_index in &self.asts[index].export_star_records {
            let record = &self.asts[index].import_records[record_index as usize];
            if record.is_external {
                *has_dynamic_fallback = true;
                continue;
            }
            let Some(target) = record.source_index else {
                continue;
            };
            let target_index = target.idx();
            if self.meta[target_index].exports_kind == ExportsKind::CommonJs
                || self.meta[target_index].wrap
            {
                *has_dynamic_fallback = true;
                continue;
            }
            for (name, export) in &self.asts[target_index].named_exports {
                out.push((name.clone(), export.reference));
            }
            self.gather_star_exports(target_index, seen, out, has_dynamic_fallback);
        }
    }

    // =========================================================================
    // Phase: match imports
    // =========================================================================

    /// Wire every named import to its source: merge symbols for
    /// ES-module targets (scope hoisting) or attach namespace aliases
    /// for CommonJS and external targets.
    fn match_imports(&mut self) {
        for index in 0..self.asts.len() {
            let imports: Vec<(Ref, jolt_parser::parts::NamedImport)> = self.asts[index]
                .named_imports
                .iter()
                .map(|(reference, import)| (*reference, import.clone()))
                .collect();

            for (import_ref, import) in imports {
                let record =
                    &self.asts[index].import_records[import.import_record_index as usize];
                if record.is_unused {
                    continue;
                }

                if record.is_external || record.source_index.is_none() {
                    // External imports keep their statement. In require-
                    // capable formats the statement becomes a namespace
                    // binding, so item references read through it; in
                    // ESM output the named bindings print directly.
                    if import.alias != "*"
                        && import.namespace_ref.is_some()
                        && self.options.format != jolt_common::options::OutputFormat::EsModule
                    {
                        self.symbols.get_mut(import_ref).namespace_alias =
                            Some(NamespaceAlias {
                                namespace_ref: import.namespace_ref,
                                alias: import.alias.clone(),
                            });
                    }
                    continue;
                }

                let target = record.source_index.unwrap();
                let target_index = target.idx();

                if import.alias == "*" {
                    if self.is_consumed_as_commonjs(target_index) {
                        // `var ns = __toESM(require_target())` appears at
                        // emission; the local symbol is that binding
                        continue;
                    }
                    // A namespace binding whose every use collapsed into
                    // named items needs no object at all
                    let is_reexported = self.asts[index]
                        .named_exports
                        .values()
                        .any(|export| export.reference == import_ref);
                    if self.symbols.get(import_ref).use_count_estimate == 0 && !is_reexported {
                        continue;
                    }
                    // Namespace of an ES module: materialize the exports
                    // object and alias the local name to it
                    self.meta[target_index].needs_exports_object = true;
                    let target_exports = self.asts[target_index].exports_ref;
                    self.symbols.merge(import_ref, target_exports);
                    continue;
                }

                if self.is_consumed_as_commonjs(target_index) {
                    // Property access over the interop binding; whether
                    // the name exists is only knowable at runtime
                    self.symbols.get_mut(import_ref).namespace_alias = Some(NamespaceAlias {
                        namespace_ref: import.namespace_ref,
                        alias: import.alias.clone(),
                    });
                    continue;
                }

                match self.meta[target_index].resolved_exports.get(&import.alias) {
                    Some(&export_ref) => {
                        self.symbols.merge(import_ref, export_ref);
                    }
                    None => {
                        let target_exports_kind = self.meta[target_index].exports_kind;
                        let is_generated = import.alias_span.is_dummy();
                        if target_exports_kind == ExportsKind::EsmWithDynamicFallback
                            || is_generated
                        {
                            // Runtime fallback through the exports
                            // object; generated namespace-property items
                            // simply read `undefined` when absent
                            self.meta[target_index].needs_exports_object = true;
                            let target_exports = self.asts[target_index].exports_ref;
                            self.symbols.merge(import.namespace_ref, target_exports);
                            self.symbols.get_mut(import_ref).namespace_alias =
                                Some(NamespaceAlias {
                                    namespace_ref: import.namespace_ref,
                                    alias: import.alias.clone(),
                                });
                            if is_generated
                                && target_exports_kind == ExportsKind::Esm
                            {
                                self.log.add_kind(
                                    LogLevel::Warning,
                                    DiagnosticKind::ExportMismatch,
                                    &self.sources[index].pretty_path,
                                    record.span,
                                    format!(
                                        "import \"{}\" will always be undefined because \
                                         \"{}\" has no such export",
                                        import.alias, self.sources[target_index].pretty_path
                                    ),
                                );
                            }
                        } else {
                            self.log.add_kind(
                                LogLevel::Error,
                                DiagnosticKind::ExportMismatch,
                                &self.sources[index].pretty_path,
                                import.alias_span,
                                format!(
                                    "no matching export in \"{}\" for import \"{}\"",
                                    self.sources[target_index].pretty_path, import.alias
                                ),
                            );
                        }
                    }
                }
            }
        }
    }

    // =========================================================================
    // Shared lookups used by tree-shaking and chunking
    // =========================================================================

    /// Parts of `canonical`'s file that declare it. The exports object
    /// symbol is declared by the synthetic part 0.
    pub(crate) fn declaring_parts(&self, canonical: Ref) -> (SourceIndex, Vec<u32>) {
        let file = canonical.source;
        let ast = &self.asts[file.idx()];
        if let Some(parts) = ast.top_level_symbols_to_parts.get(&canonical) {
            return (file, parts.to_vec());
        }
        if canonical == ast.exports_ref || canonical == ast.module_ref {
            return (file, vec![jolt_parser::parts::NS_EXPORT_PART_INDEX]);
        }
        (file, Vec::new())
    }

    /// The canonical symbol for a runtime helper, used when synthesizing
    /// wrapper and interop statements.
    pub(crate) fn runtime_helper_ref(&self, name: &str) -> Option<Ref> {
        self.asts[SourceIndex::RUNTIME.idx()]
            .named_exports
            .get(name)
            .map(|export| export.reference)
    }

    /// Record a use of a runtime helper from synthesized code so
    /// tree-shaking keeps it and renaming sees realistic counts.
    pub(crate) fn helper_uses(&self) -> FxHashMap<&'static str, Ref> {
        let mut map = FxHashMap::default();
        for name in ["__export", "__commonJS", "__toESM", "__defProp", "__publicField"] {
            if let Some(reference) = self.runtime_helper_ref(name) {
                map.insert(name, reference);
            }
        }
        map
    }
}
