//! Module specifier resolution.
//!
//! Resolution is a pure function of the importer's directory, the
//! specifier, and the configuration. Relative and absolute specifiers
//! join onto the importer; bare specifiers search `node_modules` up the
//! directory tree (after an optional TypeScript `baseUrl` root).
//! `package.json` `browser` fields remap or disable modules, directory
//! imports consult `main` and fall back to `index.*`, and extensionless
//! imports probe the configured extension order.
//!
//! A per-directory cache memoizes directory listings and manifest
//! parses; it is a `DashMap` so concurrent scan workers share it freely.

use std::sync::Arc;

use dashmap::DashMap;

use jolt_common::options::{LoaderKind, Platform};
use rustc_hash::FxHashMap;

pub mod fs;
pub mod package_json;
pub mod tsconfig;

pub use fs::{FileSystem, MemoryFileSystem, OsFileSystem, join_paths, normalize_path, parent_dir};
use package_json::PackageJson;
use tsconfig::TsConfig;

/// Node's built-in modules: externals on the node platform, hard errors
/// on browser unless configured external.
const NODE_BUILTINS: &[&str] = &[
    "assert", "buffer", "child_process", "cluster", "console", "constants", "crypto", "dgram",
    "dns", "domain", "events", "fs", "http", "http2", "https", "module", "net", "os", "path",
    "perf_hooks", "process", "punycode", "querystring", "readline", "repl", "stream",
    "string_decoder", "sys", "timers", "tls", "tty", "url", "util", "v8", "vm", "worker_threads",
    "zlib",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveResult {
    /// Canonical path plus the loader for its extension.
    Found { path: String, loader: LoaderKind },
    /// Leave as a runtime import.
    External,
    /// `browser: false` — module resolves to an empty stub.
    Disabled,
    /// A node builtin that does not exist on the browser platform.
    BuiltinNotAvailable,
    NotFound,
}

#[derive(Clone, Debug, Default)]
pub struct ResolverOptions {
    /// Tried in order for extensionless imports (with leading dot).
    pub extension_order: Vec<String>,
    pub platform: Platform,
    /// Specifiers to leave as runtime imports.
    pub external: Vec<String>,
    /// Extension (no dot) → loader override.
    pub loader_overrides: FxHashMap<String, LoaderKind>,
}

impl ResolverOptions {
    fn loader_for(&self, path: &str) -> LoaderKind {
        let ext = path.rsplit('.').next().unwrap_or("");
        if let Some(&loader) = self.loader_overrides.get(ext) {
            return loader;
        }
        LoaderKind::for_extension(ext)
    }
}

/// Cached per-directory facts.
struct DirInfo {
    package_json: Option<Arc<PackageJson>>,
    tsconfig: Option<Arc<TsConfig>>,
    has_node_modules: bool,
}

pub struct Resolver<'fs> {
    fs: &'fs dyn FileSystem,
    options: ResolverOptions,
    dir_cache: DashMap<String, Arc<DirInfo>>,
}

impl<'fs> Resolver<'fs> {
    pub fn new(fs: &'fs dyn FileSystem, options: ResolverOptions) -> Self {
        Resolver {
            fs,
            options,
            dir_cache: DashMap::new(),
        }
    }

    /// Resolve `specifier` as imported from a file in `importer_dir`.
    pub fn resolve(&self, importer_dir: &str, specifier: &str) -> ResolveResult {
        let _span = tracing::trace_span!("resolve", specifier).entered();

        if self.options.external.iter().any(|e| e == specifier) {
            return ResolveResult::External;
        }

        // Browser-field redirects from the importer's own package.
        // Relative replacements are relative to the manifest's directory.
        if self.options.platform == Platform::Browser {
            if let Some((package_dir, package)) = self.nearest_package_json(importer_dir) {
                if let Some(redirect) = package.browser_redirect(specifier) {
                    match redirect {
                        None => return ResolveResult::Disabled,
                        Some(replacement) => {
                            let replacement = replacement.to_string();
                            if replacement != specifier {
                                return self.resolve(&package_dir, &replacement);
                            }
                        }
                    }
                }
            }
        }

        if specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/')
        {
            let joined = join_paths(importer_dir, specifier);
            return self.finish(self.load_file_or_directory(&joined));
        }

        if NODE_BUILTINS.contains(&specifier) {
            return match self.options.platform {
                Platform::Node => ResolveResult::External,
                Platform::Browser => ResolveResult::BuiltinNotAvailable,
            };
        }

        // TypeScript baseUrl root, discovered by walking toward the
        // filesystem root
        if let Some(base_url) = self.nearest_base_url(importer_dir) {
            let candidate = join_paths(&base_url, specifier);
            if let Some(found) = self.load_file_or_directory(&candidate) {
                return self.finish(Some(found));
            }
        }

        // node_modules search up the directory tree
        let mut dir = importer_dir.to_string();
        loop {
            if self.dir_info(&dir).has_node_modules {
                let candidate = format!("{}/node_modules/{specifier}", dir.trim_end_matches('/'));
                if let Some(found) = self.load_package(&candidate) {
                    return self.finish(Some(found));
                }
            }
            if dir == "/" {
                break;
            }
            dir = parent_dir(&dir);
        }

        ResolveResult::NotFound
    }

    fn finish(&self, path: Option<String>) -> ResolveResult {
        match path {
            Some(path) => {
                let loader = self.options.loader_for(&path);
                ResolveResult::Found { path, loader }
            }
            None => ResolveResult::NotFound,
        }
    }

    /// A resolved package directory, honoring its own browser map for
    /// relative redirects of the chosen file.
    fn load_package(&self, path: &str) -> Option<String> {
        let result = self.load_file_or_directory(path)?;

        if self.options.platform == Platform::Browser {
            // The package may remap the very file its `main` points at
            if let Some(package_dir) = package_root_of(&result) {
                if let Some(package) = self.dir_info(&package_dir).package_json.clone() {
                    if let Some(relative) = result.strip_prefix(&format!("{package_dir}/")) {
                        if let Some(redirect) = package.browser_redirect(relative) {
                            return match redirect {
                                None => None,
                                Some(replacement) => {
                                    let replacement = replacement.to_string();
                                    self.load_file_or_directory(&join_paths(
                                        &package_dir,
                                        &replacement,
                                    ))
                                }
                            };
                        }
                    }
                }
            }
        }
        Some(result)
    }

    fn load_file_or_directory(&self, path: &str) -> Option<String> {
        if let Some(found) = self.load_file(path) {
            return Some(found);
        }
        if self.fs.is_dir(path) {
            return self.load_directory(path);
        }
        None
    }

    /// Exact path, then each configured extension appended.
    fn load_file(&self, path: &str) -> Option<String> {
        if self.fs.is_file(path) {
            return Some(path.to_string());
        }
        for ext in &self.options.extension_order {
            let candidate = format!("{path}{ext}");
            if self.fs.is_file(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    /// `main` from the directory's manifest, else `index.*`.
    fn load_directory(&self, dir: &str) -> Option<String> {
        if let Some(package) = self.dir_info(dir).package_json.clone() {
            let entry = if self.options.platform == Platform::Browser {
                package
                    .browser
                    .entry
                    .clone()
                    .or_else(|| package.module.clone())
                    .or_else(|| package.main.clone())
            } else {
                package.main.clone().or_else(|| package.module.clone())
            };
            if let Some(main) = entry {
                let main_path = join_paths(dir, &main);
                if let Some(found) = self.load_file(&main_path) {
                    return Some(found);
                }
                if self.fs.is_dir(&main_path) {
                    if let Some(found) = self.load_index(&main_path) {
                        return Some(found);
                    }
                }
            }
        }
        self.load_index(dir)
    }

    fn load_index(&self, dir: &str) -> Option<String> {
        for ext in &self.options.extension_order {
            let candidate = format!("{}/index{ext}", dir.trim_end_matches('/'));
            if self.fs.is_file(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    // =========================================================================
    // Cached directory facts
    // =========================================================================

    fn dir_info(&self, dir: &str) -> Arc<DirInfo> {
        if let Some(info) = self.dir_cache.get(dir) {
            return info.clone();
        }
        let entries = self.fs.read_dir(dir).unwrap_or_default();
        let package_json = if entries.iter().any(|name| name == "package.json") {
            self.fs
                .read_file_text(&format!("{}/package.json", dir.trim_end_matches('/')))
                .and_then(|text| PackageJson::parse(&text))
                .map(Arc::new)
        } else {
            None
        };
        let tsconfig = if entries.iter().any(|name| name == "tsconfig.json") {
            self.fs
                .read_file_text(&format!("{}/tsconfig.json", dir.trim_end_matches('/')))
                .and_then(|text| TsConfig::parse(&text))
                .map(Arc::new)
        } else {
            None
        };
        let info = Arc::new(DirInfo {
            package_json,
            tsconfig,
            has_node_modules: entries.iter().any(|name| name == "node_modules"),
        });
        self.dir_cache.insert(dir.to_string(), info.clone());
        info
    }

    fn nearest_package_json(&self, start_dir: &str) -> Option<(String, Arc<PackageJson>)> {
        let mut dir = start_dir.to_string();
        loop {
            if let Some(package) = self.dir_info(&dir).package_json.clone() {
                return Some((dir, package));
            }
            if dir == "/" {
                return None;
            }
            dir = parent_dir(&dir);
        }
    }

    fn nearest_base_url(&self, start_dir: &str) -> Option<String> {
        let mut dir = start_dir.to_string();
        loop {
            if let Some(tsconfig) = self.dir_info(&dir).tsconfig.clone() {
                if let Some(base_url) = &tsconfig.base_url {
                    return Some(join_paths(&dir, base_url));
                }
            }
            if dir == "/" {
                return None;
            }
            dir = parent_dir(&dir);
        }
    }
}

/// The `node_modules/<name>` root containing a resolved file.
fn package_root_of(path: &str) -> Option<String> {
    let marker = "/node_modules/";
    let index = path.rfind(marker)?;
    let after = &path[index + marker.len()..];
    let name_len = if after.starts_with('@') {
        // Scoped packages span two segments
        let mut parts = after.splitn(3, '/');
        let scope = parts.next()?.len();
        let name = parts.next()?.len();
        scope + 1 + name
    } else {
        after.split('/').next()?.len()
    };
    Some(path[..index + marker.len() + name_len].to_string())
}

#[cfg(test)]
#[path = "../tests/paths_unit.rs"]
mod tests;
