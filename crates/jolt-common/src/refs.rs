//! Symbol handles.
//!
//! A symbol is addressed by a `(source_index, inner_index)` pair. Symbols
//! never move between files, so a `Ref` stays valid across linking even
//! after symbols are merged; merging only rewrites the `link` field of the
//! symbol the `Ref` points at.

use serde::Serialize;

/// Index of a source file in the registry, assigned at first discovery.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SourceIndex(pub u32);

impl SourceIndex {
    /// The runtime-helper library always occupies index zero.
    pub const RUNTIME: SourceIndex = SourceIndex(0);

    #[inline]
    pub const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SourceIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a symbol within its file's symbol array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct InnerIndex(pub u32);

impl InnerIndex {
    #[inline]
    pub const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// The canonical handle on a symbol: which file declared it and where in
/// that file's symbol array it lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Ref {
    pub source: SourceIndex,
    pub inner: InnerIndex,
}

impl Ref {
    /// Sentinel for "no symbol". Used for unlinked `link` fields and
    /// optional AST slots.
    pub const NONE: Ref = Ref {
        source: SourceIndex(u32::MAX),
        inner: InnerIndex(u32::MAX),
    };

    #[inline]
    pub const fn new(source: SourceIndex, inner: InnerIndex) -> Self {
        Ref { source, inner }
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.source.0 == u32::MAX && self.inner.0 == u32::MAX
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        !self.is_none()
    }
}

impl Default for Ref {
    fn default() -> Self {
        Ref::NONE
    }
}

impl std::fmt::Display for Ref {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "Ref(none)")
        } else {
            write!(f, "Ref({}:{})", self.source.0, self.inner.0)
        }
    }
}
