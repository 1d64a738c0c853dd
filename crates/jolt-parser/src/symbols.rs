//! Symbols and the cross-file symbol map.
//!
//! Every identifier in a file resolves to a symbol; unbound names get a
//! symbol of kind `Unbound` so downstream phases never deal with missing
//! bindings. Symbols are owned by their declaring file's symbol array and
//! addressed with `(source, inner)` pairs.
//!
//! The `link` field forms a disjoint-set forest across all files: the
//! linker unions import bindings with the exported symbols they resolve
//! to, and `follow` path-compresses to the canonical representative. This
//! is what merges ES-module scopes into one ("scope hoisting").

use jolt_common::refs::{InnerIndex, Ref, SourceIndex};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    /// Referenced but never declared; may be a global or a typo.
    Unbound,
    /// `var` declarations, hoisted to the nearest enclosing boundary.
    Hoisted,
    /// Function declarations, hoisted like `var`.
    HoistedFunction,
    /// The binding of a `catch (e)` clause.
    CatchIdentifier,
    /// Generator or async function declarations; these are hoisted but
    /// must not cross certain boundaries in sloppy mode.
    GeneratorOrAsyncFunction,
    /// The implicit `arguments` binding of a function scope.
    Arguments,
    Class,
    PrivateField,
    PrivateMethod,
    Label,
    TsEnum,
    TsNamespace,
    Import,
    Const,
    /// Created by lowering or linking rather than source text.
    Injected,
    Other,
}

impl SymbolKind {
    /// Which renaming slot namespace this symbol competes in. Private
    /// names and labels cannot collide with regular identifiers at
    /// runtime, so each gets an independent slot space.
    #[must_use]
    pub const fn slot_namespace(self) -> SlotNamespace {
        match self {
            SymbolKind::PrivateField | SymbolKind::PrivateMethod => SlotNamespace::PrivateName,
            SymbolKind::Label => SlotNamespace::Label,
            _ => SlotNamespace::Default,
        }
    }

    #[must_use]
    pub const fn is_private(self) -> bool {
        matches!(self, SymbolKind::PrivateField | SymbolKind::PrivateMethod)
    }

    #[must_use]
    pub const fn is_hoisted(self) -> bool {
        matches!(
            self,
            SymbolKind::Hoisted | SymbolKind::HoistedFunction | SymbolKind::GeneratorOrAsyncFunction
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SlotNamespace {
    Default = 0,
    Label = 1,
    PrivateName = 2,
}

pub const SLOT_NAMESPACE_COUNT: usize = 3;

/// Alias attached by the linker when an import resolves into a CommonJS
/// module: the printer emits `namespace.alias` instead of a bare name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceAlias {
    pub namespace_ref: Ref,
    pub alias: String,
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub kind: SymbolKind,
    /// Name as written in the source; replaced during renaming.
    pub original_name: String,
    /// Union-find parent; `Ref::NONE` while unmerged.
    pub link: Ref,
    /// Estimated number of uses, for minified slot ranking. An estimate
    /// because dead branches are counted before elimination.
    pub use_count_estimate: u32,
    /// Set for symbols that must keep their name (direct eval in scope,
    /// `with` targets, export bindings in some formats).
    pub must_not_be_renamed: bool,
    pub namespace_alias: Option<NamespaceAlias>,
    /// Which chunk this symbol was assigned to, filled during chunking.
    pub chunk_index: Option<u32>,
    /// Slot for minified renaming, filled by the name assigner.
    pub slot: Option<u32>,
}

impl Symbol {
    pub fn new(kind: SymbolKind, original_name: impl Into<String>) -> Self {
        Symbol {
            kind,
            original_name: original_name.into(),
            link: Ref::NONE,
            use_count_estimate: 0,
            must_not_be_renamed: false,
            namespace_alias: None,
            chunk_index: None,
            slot: None,
        }
    }
}

/// Two-level symbol storage: outer index is the source, inner index the
/// symbol within that source. The outer array is fixed after scanning;
/// inner arrays are fixed after each file's parse. Only `link`, `name`
/// and merge bookkeeping mutate afterwards, each confined to one linker
/// phase.
#[derive(Clone, Debug, Default)]
pub struct SymbolMap {
    pub outer: Vec<Vec<Symbol>>,
    /// Final output names, assigned late; indexed like `outer`. Empty
    /// until the name assigner runs.
    pub names: Vec<Vec<String>>,
}

impl SymbolMap {
    pub fn with_source_count(count: usize) -> Self {
        SymbolMap {
            outer: vec![Vec::new(); count],
            names: Vec::new(),
        }
    }

    #[inline]
    pub fn get(&self, reference: Ref) -> &Symbol {
        &self.outer[reference.source.idx()][reference.inner.idx()]
    }

    #[inline]
    pub fn get_mut(&mut self, reference: Ref) -> &mut Symbol {
        &mut self.outer[reference.source.idx()][reference.inner.idx()]
    }

    /// Follow the link chain to the canonical symbol, compressing the
    /// path so later follows are O(1).
    ///
    /// Writes to `link`, so the linker runs `follow_all` once before any
    /// phase that reads symbols concurrently.
    pub fn follow(&mut self, mut reference: Ref) -> Ref {
        let mut chain = Vec::new();
        loop {
            let link = self.get(reference).link;
            if link.is_none() {
                break;
            }
            chain.push(reference);
            reference = link;
        }
        for visited in chain {
            self.get_mut(visited).link = reference;
        }
        reference
    }

    /// Read-only follow for phases after `follow_all` has flattened every
    /// chain to depth one.
    pub fn follow_read(&self, reference: Ref) -> Ref {
        let mut current = reference;
        loop {
            let link = self.get(current).link;
            if link.is_none() {
                return current;
            }
            current = link;
        }
    }

    /// Flatten every link chain. Called once at the end of symbol
    /// merging so concurrent phases can traverse without writes.
    pub fn follow_all(&mut self) {
        for source in 0..self.outer.len() {
            for inner in 0..self.outer[source].len() {
                let reference = Ref::new(SourceIndex(source as u32), InnerIndex(inner as u32));
                self.follow(reference);
            }
        }
    }

    /// Union two symbols: `old` will follow to `new`'s representative.
    /// Use counts accumulate on the representative and the no-rename
    /// flag propagates.
    pub fn merge(&mut self, old: Ref, new: Ref) -> Ref {
        let old_root = self.follow(old);
        let new_root = self.follow(new);
        if old_root == new_root {
            return new_root;
        }

        let old_symbol = self.get(old_root).clone();
        {
            let target = self.get_mut(new_root);
            target.use_count_estimate += old_symbol.use_count_estimate;
            target.must_not_be_renamed |= old_symbol.must_not_be_renamed;
        }
        self.get_mut(old_root).link = new_root;
        new_root
    }

    /// The output name for a symbol, valid after the name assigner ran.
    pub fn name_of(&self, reference: Ref) -> &str {
        let canonical = self.follow_read(reference);
        if let Some(inner) = self.names.get(canonical.source.idx()) {
            if let Some(name) = inner.get(canonical.inner.idx()) {
                if !name.is_empty() {
                    return name;
                }
            }
        }
        &self.get(canonical).original_name
    }

    /// Install the original names as output names; the name assigner
    /// overwrites entries it renames.
    pub fn seed_output_names(&mut self) {
        self.names = self
            .outer
            .iter()
            .map(|symbols| symbols.iter().map(|s| s.original_name.clone()).collect())
            .collect();
    }

    pub fn set_name(&mut self, reference: Ref, name: String) {
        self.names[reference.source.idx()][reference.inner.idx()] = name;
    }
}

#[cfg(test)]
#[path = "../tests/symbols_unit.rs"]
mod tests;
