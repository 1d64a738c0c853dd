//! Filesystem abstraction for the resolver and scanner.
//!
//! Resolution and scanning go through this trait so builds can run
//! against the real disk or an in-memory tree (tests, programmatic use).

use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};

pub trait FileSystem: Send + Sync {
    /// Read a file as bytes. `None` when missing or unreadable.
    fn read_file(&self, path: &str) -> Option<Vec<u8>>;

    /// Names of a directory's entries. `None` when the directory does
    /// not exist.
    fn read_dir(&self, path: &str) -> Option<Vec<String>>;

    fn is_file(&self, path: &str) -> bool {
        self.read_file(path).is_some()
    }

    fn is_dir(&self, path: &str) -> bool {
        self.read_dir(path).is_some()
    }

    fn read_file_text(&self, path: &str) -> Option<String> {
        String::from_utf8(self.read_file(path)?).ok()
    }
}

/// The real filesystem.
#[derive(Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_file(&self, path: &str) -> Option<Vec<u8>> {
        std::fs::read(Path::new(path)).ok()
    }

    fn read_dir(&self, path: &str) -> Option<Vec<String>> {
        let entries = std::fs::read_dir(Path::new(path)).ok()?;
        Some(
            entries
                .filter_map(|entry| entry.ok())
                .filter_map(|entry| entry.file_name().into_string().ok())
                .collect(),
        )
    }

    fn is_file(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn is_dir(&self, path: &str) -> bool {
        Path::new(path).is_dir()
    }
}

/// In-memory tree keyed by absolute `/`-separated paths.
#[derive(Default)]
pub struct MemoryFileSystem {
    files: FxHashMap<String, Vec<u8>>,
    dirs: FxHashSet<String>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        MemoryFileSystem::default()
    }

    pub fn add_file(&mut self, path: &str, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.to_string(), contents.into());
        // Register every ancestor directory
        let mut dir = parent_dir(path);
        loop {
            if !self.dirs.insert(dir.clone()) || dir == "/" {
                break;
            }
            dir = parent_dir(&dir);
        }
    }

    pub fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.add_file(path, contents.as_bytes().to_vec());
        self
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.get(path).cloned()
    }

    fn read_dir(&self, path: &str) -> Option<Vec<String>> {
        if !self.dirs.contains(path) {
            return None;
        }
        let prefix = if path.ends_with('/') {
            path.to_string()
        } else {
            format!("{path}/")
        };
        let mut entries: FxHashSet<String> = FxHashSet::default();
        for file in self.files.keys() {
            if let Some(rest) = file.strip_prefix(&prefix) {
                if let Some(name) = rest.split('/').next() {
                    entries.insert(name.to_string());
                }
            }
        }
        for dir in &self.dirs {
            if let Some(rest) = dir.strip_prefix(&prefix) {
                if let Some(name) = rest.split('/').next() {
                    if !name.is_empty() {
                        entries.insert(name.to_string());
                    }
                }
            }
        }
        Some(entries.into_iter().collect())
    }
}

/// Directory containing a path, with `/` for roots.
pub fn parent_dir(path: &str) -> String {
    match path.rfind('/') {
        Some(0) => "/".to_string(),
        Some(index) => path[..index].to_string(),
        None => "/".to_string(),
    }
}

/// Collapse `.` and `..` segments. Input is expected to be absolute.
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    let mut out = String::from("/");
    out.push_str(&segments.join("/"));
    out
}

/// Join a (possibly relative) specifier onto a base directory and
/// normalize.
pub fn join_paths(base_dir: &str, relative: &str) -> String {
    if relative.starts_with('/') {
        normalize_path(relative)
    } else {
        normalize_path(&format!("{base_dir}/{relative}"))
    }
}
