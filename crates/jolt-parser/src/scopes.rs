//! Lexical scopes.
//!
//! Scopes form a tree per file, stored in a flat arena and addressed by
//! `ScopeId`. Pass 1 builds the tree while parsing; pass 2 replays the
//! recorded push order to walk it again without attaching scope ids to
//! AST nodes.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use jolt_common::refs::Ref;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    #[inline]
    pub const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Scope kinds, ordered so that everything from `Entry` on stops `var`
/// hoisting: a hoisted symbol is re-parented upward until it reaches a
/// scope whose kind is at or above `Entry`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ScopeKind {
    Block = 0,
    With,
    Label,
    ClassName,
    ClassBody,
    CatchBinding,

    // Everything below stops hoisting
    Entry,
    FunctionArgs,
    FunctionBody,
    ClassStaticInit,
}

impl ScopeKind {
    #[must_use]
    pub const fn stops_hoisting(self) -> bool {
        (self as u8) >= (ScopeKind::Entry as u8)
    }
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub children: SmallVec<[ScopeId; 4]>,
    /// Declared names → symbol handle.
    pub members: FxHashMap<String, Ref>,
    /// Symbols created by lowering that live here without a source name
    /// binding (temporaries, helper aliases).
    pub generated: SmallVec<[Ref; 2]>,
    /// The label symbol for `Label` scopes.
    pub label_ref: Option<Ref>,
    /// Set when a direct `eval()` call was seen in this scope; disables
    /// renaming for everything visible from here.
    pub contains_direct_eval: bool,
    /// Arrow-function scopes forbid an `arguments` binding of their own.
    pub forbids_arguments: bool,
    pub strict_mode: bool,
}

impl Scope {
    pub fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Scope {
            kind,
            parent,
            children: SmallVec::new(),
            members: FxHashMap::default(),
            generated: SmallVec::new(),
            label_ref: None,
            contains_direct_eval: false,
            forbids_arguments: false,
            strict_mode: false,
        }
    }
}

#[cfg(test)]
#[path = "../tests/scopes_unit.rs"]
mod tests;
