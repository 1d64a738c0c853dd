//! `package.json` fields the resolver consults.

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// The `browser` field: either a single replacement entry point or a map
/// of redirects. Map values of `false` disable the module entirely.
#[derive(Clone, Debug, Default)]
pub struct BrowserMap {
    /// Replacement entry point when `browser` was a plain string.
    pub entry: Option<String>,
    /// Specifier or relative path → replacement; `None` means disabled.
    pub redirects: FxHashMap<String, Option<String>>,
}

#[derive(Clone, Debug, Default)]
pub struct PackageJson {
    pub main: Option<String>,
    pub module: Option<String>,
    pub browser: BrowserMap,
}

#[derive(Deserialize)]
struct RawPackageJson {
    main: Option<String>,
    module: Option<String>,
    #[serde(default)]
    browser: Option<serde_json::Value>,
}

impl PackageJson {
    pub fn parse(text: &str) -> Option<PackageJson> {
        let raw: RawPackageJson = serde_json::from_str(text).ok()?;
        let mut browser = BrowserMap::default();
        match raw.browser {
            Some(serde_json::Value::String(entry)) => browser.entry = Some(entry),
            Some(serde_json::Value::Object(entries)) => {
                for (key, value) in entries {
                    match value {
                        serde_json::Value::String(replacement) => {
                            browser.redirects.insert(key, Some(replacement));
                        }
                        serde_json::Value::Bool(false) => {
                            browser.redirects.insert(key, None);
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
        Some(PackageJson {
            main: raw.main,
            module: raw.module,
            browser,
        })
    }

    /// Look up a browser redirect for a specifier or relative path.
    /// Returns `Some(None)` for disabled modules.
    pub fn browser_redirect(&self, specifier: &str) -> Option<Option<&str>> {
        let candidates = [
            specifier.to_string(),
            format!("./{}", specifier.trim_start_matches("./")),
            specifier.trim_start_matches("./").to_string(),
        ];
        for candidate in &candidates {
            if let Some(replacement) = self.browser.redirects.get(candidate) {
                return Some(replacement.as_deref());
            }
        }
        None
    }
}
