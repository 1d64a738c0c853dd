//! The source registry: canonical path → source index.
//!
//! Append-only. Writers coordinate through a mutex around insertion and
//! index allocation, so the index order is exactly first-discovery
//! order; after scanning completes the registry is read without locks.

use std::sync::Mutex;

use rustc_hash::FxHashMap;

use jolt_common::refs::SourceIndex;

#[derive(Default)]
struct RegistryState {
    by_path: FxHashMap<String, SourceIndex>,
    paths: Vec<String>,
}

pub struct SourceRegistry {
    state: Mutex<RegistryState>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        SourceRegistry {
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Intern a canonical path. Returns the index and whether this was
    /// the first sighting (in which case the caller owns scanning it).
    pub fn intern(&self, path: &str) -> (SourceIndex, bool) {
        let mut state = self.state.lock().unwrap();
        if let Some(&index) = state.by_path.get(path) {
            return (index, false);
        }
        let index = SourceIndex(state.paths.len() as u32);
        state.by_path.insert(path.to_string(), index);
        state.paths.push(path.to_string());
        (index, true)
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path_of(&self, index: SourceIndex) -> String {
        self.state.lock().unwrap().paths[index.idx()].clone()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        SourceRegistry::new()
    }
}

#[cfg(test)]
#[path = "../tests/registry_unit.rs"]
mod tests;
