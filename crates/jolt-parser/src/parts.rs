//! The per-file parse product: parts, import records, and the `Ast`
//! container handed to the linker.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use jolt_common::charfreq::CharFreq;
use jolt_common::refs::Ref;
use jolt_common::span::Span;

use crate::ast::Stmt;
use crate::scopes::Scope;
use crate::symbols::Symbol;

/// How a dependency edge was written in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportKind {
    /// `import ... from "m"` or `export ... from "m"`
    Stmt,
    /// `require("m")`
    Require,
    /// `import("m")`
    Dynamic,
}

#[derive(Clone, Debug)]
pub struct ImportRecord {
    pub span: Span,
    pub specifier: String,
    pub kind: ImportKind,
    /// Filled by the scanner once the specifier resolves.
    pub source_index: Option<jolt_common::refs::SourceIndex>,
    /// Left as a runtime import (configured external, platform builtin,
    /// or disabled package).
    pub is_external: bool,
    /// `export * from` records re-export everything from the target,
    /// which forces the whole target file live during tree-shaking.
    pub is_export_star: bool,
    /// Records inside a dead conditional branch are never resolved.
    pub is_unused: bool,
}

impl ImportRecord {
    pub fn new(span: Span, specifier: impl Into<String>, kind: ImportKind) -> Self {
        ImportRecord {
            span,
            specifier: specifier.into(),
            kind,
            source_index: None,
            is_external: false,
            is_export_star: false,
            is_unused: false,
        }
    }
}

/// One entry of a file's `import {alias}` bindings, keyed by the local
/// symbol in [`Ast::named_imports`].
#[derive(Clone, Debug)]
pub struct NamedImport {
    /// The name as exported by the target module; "*" for namespaces.
    pub alias: String,
    pub alias_span: Span,
    pub namespace_ref: Ref,
    pub import_record_index: u32,
}

#[derive(Clone, Debug)]
pub struct NamedExport {
    /// Local symbol that holds the exported value.
    pub reference: Ref,
    pub alias_span: Span,
}

/// How this module exposes its exports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportsKind {
    /// No exports at all; importable for side effects only.
    #[default]
    None,
    /// Assigns to `exports` / `module`, top-level `return`, or other
    /// CommonJS tells; consumed through a lazily evaluated wrapper.
    CommonJs,
    /// Static `import`/`export` only; eligible for scope hoisting.
    Esm,
    /// ESM with a wildcard re-export of a CommonJS or external module;
    /// named lookups may need to fall through at runtime.
    EsmWithDynamicFallback,
}

impl ExportsKind {
    #[must_use]
    pub const fn is_esm(self) -> bool {
        matches!(self, ExportsKind::Esm | ExportsKind::EsmWithDynamicFallback)
    }
}

/// A self-contained group of top-level statements: the unit of
/// tree-shaking and code splitting.
#[derive(Clone, Debug, Default)]
pub struct Part {
    pub stmts: Vec<Stmt>,
    pub declared_symbols: Vec<Ref>,
    /// Symbol → number of uses within this part.
    pub symbol_uses: FxHashMap<Ref, u32>,
    /// Which import records this part references.
    pub import_record_indices: SmallVec<[u32; 2]>,
    /// Symbols this part assigns to (not counting its own declarations).
    /// Code splitting must keep such a part in the same chunk as the
    /// declaring part: an export binding is read-only in importers, so a
    /// cross-chunk assignment would throw at runtime.
    pub mutated_symbols: SmallVec<[Ref; 1]>,
    /// Parts in the same file this part depends on (by declared symbol).
    pub local_dependencies: SmallVec<[u32; 2]>,
    /// A part with no side effects can be dropped when nothing uses its
    /// declarations.
    pub can_be_removed_if_unused: bool,
    /// Forces the part to survive even when unused (entry-point exports).
    pub force_include: bool,
    /// Liveness flag written by the linker during tree-shaking.
    pub is_live: bool,
}

/// Index of the synthetic part holding the `__export(...)` call that
/// installs export getters. Always present, possibly empty.
pub const NS_EXPORT_PART_INDEX: u32 = 0;

/// Everything the parser produces for one file. Immutable once built;
/// the linker only touches symbol fields and part liveness through its
/// own storage.
#[derive(Clone, Debug, Default)]
pub struct Ast {
    pub parts: Vec<Part>,
    pub symbols: Vec<Symbol>,
    pub scopes: Vec<Scope>,
    pub import_records: Vec<ImportRecord>,

    /// Local import binding → where it came from.
    pub named_imports: IndexMap<Ref, NamedImport>,
    /// Export name → local symbol.
    pub named_exports: IndexMap<String, NamedExport>,
    /// Record indices of `export * from` statements.
    pub export_star_records: SmallVec<[u32; 2]>,
    /// Record indices of every `import`/`export ... from` statement,
    /// in source order (used for module-group classification).
    pub static_import_records: SmallVec<[u32; 4]>,

    pub exports_kind: ExportsKind,
    /// Synthetic `exports` object symbol for this module.
    pub exports_ref: Ref,
    /// Synthetic `module` symbol.
    pub module_ref: Ref,
    /// Lazily-initialized wrapper closure symbol (CommonJS modules).
    pub wrapper_ref: Ref,

    /// Top-level declared symbol → indices of parts declaring it.
    pub top_level_symbols_to_parts: FxHashMap<Ref, SmallVec<[u32; 1]>>,

    /// Runtime helpers this file needs, by helper name → local alias
    /// symbol. Wired to the runtime module's exports by the linker.
    pub runtime_imports: IndexMap<String, Ref>,

    pub char_freq: CharFreq,
    pub has_es_module_syntax: bool,
    pub has_top_level_return: bool,
    pub uses_exports_ref: bool,
    pub uses_module_ref: bool,
    pub hashbang: Option<String>,
}

impl Ast {
    /// Parts in index order with their statements, for printing.
    pub fn live_parts(&self) -> impl Iterator<Item = (u32, &Part)> {
        self.parts
            .iter()
            .enumerate()
            .filter(|(_, part)| part.is_live)
            .map(|(i, part)| (i as u32, part))
    }
}
