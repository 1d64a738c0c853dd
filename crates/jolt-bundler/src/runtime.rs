//! The runtime-helper library.
//!
//! This source is parsed like any other file and always occupies source
//! index zero. Helpers are plain named exports, so unreferenced ones
//! fall to ordinary tree-shaking. Parsing happens with the build's own
//! options, which also lowers the helpers themselves to the configured
//! target.

/// Specifier that scan resolution maps to the runtime source.
pub use jolt_parser::RUNTIME_SPECIFIER;

/// Pretty path shown for runtime frames in diagnostics and source maps.
pub const RUNTIME_PATH: &str = "<runtime>";

pub const RUNTIME_SOURCE: &str = r#"
export var __defProp = Object.defineProperty;

// Installs lazy getters for a module's named exports.
export var __export = (target, all) => {
  for (var name in all)
    __defProp(target, name, { get: all[name], enumerable: true });
};

// Wraps a CommonJS module body; repeated calls reuse the first result.
export var __commonJS = (cb, mod) => () =>
  (mod || cb((mod = { exports: {} }).exports, mod), mod.exports);

// Adapts a CommonJS exports object for an ES-module importer: the
// module sees a default binding plus whatever named properties exist.
export var __toESM = (mod) =>
  mod && mod.__esModule ? mod : { default: mod, ...mod };

// Standards-mode class field: define semantics, not assign semantics.
export var __publicField = (obj, key, value) => {
  __defProp(obj, key, {
    value,
    enumerable: true,
    configurable: true,
    writable: true,
  });
  return value;
};
"#;

/// Helper names a given helper depends on, itself last. Used by the
/// single-file transform, which has no runtime module to import from.
pub fn standalone_helpers(name: &str) -> &'static [&'static str] {
    match name {
        "__defProp" => &["__defProp"],
        "__export" => &["__defProp", "__export"],
        "__publicField" => &["__defProp", "__publicField"],
        "__toESM" => &["__toESM"],
        "__commonJS" => &["__commonJS"],
        _ => &[],
    }
}

/// A self-contained (non-exported) definition of one helper.
pub fn helper_definition(name: &str) -> Option<&'static str> {
    Some(match name {
        "__defProp" => "var __defProp = Object.defineProperty;",
        "__export" => {
            "var __export = (target, all) => {\n  for (var name in all)\n    __defProp(target, name, { get: all[name], enumerable: true });\n};"
        }
        "__commonJS" => {
            "var __commonJS = (cb, mod) => () => (mod || cb((mod = { exports: {} }).exports, mod), mod.exports);"
        }
        "__toESM" => {
            "var __toESM = (mod) => mod && mod.__esModule ? mod : Object.assign({ default: mod }, mod);"
        }
        "__publicField" => {
            "var __publicField = (obj, key, value) => {\n  __defProp(obj, key, { value, enumerable: true, configurable: true, writable: true });\n  return value;\n};"
        }
        _ => return None,
    })
}
