//! Build and transform configuration.
//!
//! These types are filled in by the CLI (or an embedding program) and
//! threaded through the pipeline explicitly. There is no global state.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

/// ECMAScript language version floor for the emitted output.
///
/// Syntax newer than the target is lowered during parsing; syntax that
/// cannot be lowered produces a warning and passes through verbatim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Target {
    /// ECMAScript 2015 (6th Edition)
    ES2015 = 0,
    /// ECMAScript 2016 (adds `**`)
    ES2016 = 1,
    /// ECMAScript 2017 (adds async functions)
    ES2017 = 2,
    /// ECMAScript 2018 (adds spread properties, async iteration)
    ES2018 = 3,
    /// ECMAScript 2019 (adds optional catch binding)
    ES2019 = 4,
    /// ECMAScript 2020 (adds `?.` and `??`)
    ES2020 = 5,
    /// ECMAScript 2021 (adds logical assignment)
    ES2021 = 6,
    /// ECMAScript 2022 (adds class fields)
    ES2022 = 7,
    /// Latest language features; nothing is lowered
    #[default]
    ESNext = 99,
}

impl Target {
    /// Exponentiation operator (`**`).
    #[must_use]
    pub const fn supports_exponent_operator(self) -> bool {
        (self as u8) >= (Self::ES2016 as u8)
    }

    /// Object spread / rest properties (`{...a}`).
    #[must_use]
    pub const fn supports_object_spread(self) -> bool {
        (self as u8) >= (Self::ES2018 as u8)
    }

    /// `catch {}` without a binding.
    #[must_use]
    pub const fn supports_optional_catch_binding(self) -> bool {
        (self as u8) >= (Self::ES2019 as u8)
    }

    /// Async functions (`async`/`await`).
    #[must_use]
    pub const fn supports_async(self) -> bool {
        (self as u8) >= (Self::ES2017 as u8)
    }

    /// Optional chaining (`?.`) and nullish coalescing (`??`).
    #[must_use]
    pub const fn supports_optional_chaining(self) -> bool {
        (self as u8) >= (Self::ES2020 as u8)
    }

    /// Logical assignment operators (`&&=`, `||=`, `??=`).
    #[must_use]
    pub const fn supports_logical_assignment(self) -> bool {
        (self as u8) >= (Self::ES2021 as u8)
    }

    /// Class instance and static fields.
    #[must_use]
    pub const fn supports_class_fields(self) -> bool {
        (self as u8) >= (Self::ES2022 as u8)
    }

    pub fn parse(name: &str) -> Option<Target> {
        Some(match name.to_ascii_lowercase().as_str() {
            "es2015" | "es6" => Target::ES2015,
            "es2016" => Target::ES2016,
            "es2017" => Target::ES2017,
            "es2018" => Target::ES2018,
            "es2019" => Target::ES2019,
            "es2020" => Target::ES2020,
            "es2021" => Target::ES2021,
            "es2022" => Target::ES2022,
            "esnext" => Target::ESNext,
            _ => return None,
        })
    }
}

/// Which environment the output runs in. Switches built-in-module
/// resolution: `fs`, `path`, etc. are externals on node and hard errors on
/// browser unless explicitly listed as external.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Platform {
    #[default]
    Browser,
    Node,
}

/// Output wrapping for each entry chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Immediately-invoked function expression
    #[default]
    Iife,
    /// CommonJS (`module.exports`)
    CommonJs,
    /// ES modules (`import`/`export`)
    EsModule,
}

/// How a file's bytes become an AST.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoaderKind {
    #[default]
    Default,
    Js,
    Jsx,
    Ts,
    Tsx,
    Json,
    Text,
    Base64,
    DataUrl,
    Binary,
}

impl LoaderKind {
    /// Loaders that run the JS parser (everything else synthesizes an AST).
    #[must_use]
    pub const fn is_js_family(self) -> bool {
        matches!(self, Self::Js | Self::Jsx | Self::Ts | Self::Tsx)
    }

    #[must_use]
    pub const fn is_typescript(self) -> bool {
        matches!(self, Self::Ts | Self::Tsx)
    }

    /// Whether `<` starts a JSX element in this loader. JSX is never
    /// enabled for plain `.ts` because `<T>x` is a type assertion there.
    #[must_use]
    pub const fn allows_jsx(self) -> bool {
        matches!(self, Self::Jsx | Self::Tsx)
    }

    /// Loader chosen from a file extension when no override is configured.
    pub fn for_extension(ext: &str) -> LoaderKind {
        match ext {
            "js" | "mjs" | "cjs" => LoaderKind::Js,
            "jsx" => LoaderKind::Jsx,
            "ts" | "mts" | "cts" => LoaderKind::Ts,
            "tsx" => LoaderKind::Tsx,
            "json" => LoaderKind::Json,
            "txt" => LoaderKind::Text,
            _ => LoaderKind::Default,
        }
    }
}

/// Source-map emission mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceMapMode {
    #[default]
    None,
    /// `//# sourceMappingURL=data:...` appended to the output file
    Inline,
    /// Sibling `.map` file plus a relative `sourceMappingURL` comment
    External,
}

/// JSX call-site configuration.
#[derive(Clone, Debug)]
pub struct JsxOptions {
    /// Dotted path for the element factory, e.g. `React.createElement`.
    pub factory: Vec<String>,
    /// Dotted path for the fragment value, e.g. `React.Fragment`.
    pub fragment: Vec<String>,
}

impl Default for JsxOptions {
    fn default() -> Self {
        JsxOptions {
            factory: vec!["React".to_string(), "createElement".to_string()],
            fragment: vec!["React".to_string(), "Fragment".to_string()],
        }
    }
}

/// Class-field lowering semantics. `Define` matches the standard
/// (`Object.defineProperty`); `Assign` uses plain assignment, which differs
/// when a base class declares a setter with the same name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClassFieldMode {
    #[default]
    Define,
    Assign,
}

/// Options for a full `build` invocation.
#[derive(Clone, Debug, Default)]
pub struct BuildOptions {
    pub entry_points: Vec<String>,
    /// Enables scan + link. Without it each entry is compiled independently.
    pub bundle: bool,
    pub outfile: Option<String>,
    pub outdir: Option<String>,
    pub minify_whitespace: bool,
    pub minify_identifiers: bool,
    pub minify_syntax: bool,
    pub source_map: SourceMapMode,
    pub target: Target,
    pub platform: Platform,
    /// Specifiers left as runtime imports.
    pub external: Vec<String>,
    pub format: OutputFormat,
    /// Extension (without dot) → loader override.
    pub loader: FxHashMap<String, LoaderKind>,
    /// Dotted identifier path → replacement expression source text.
    /// Iteration order is substitution priority, hence the ordered map.
    pub define: IndexMap<String, String>,
    pub jsx: JsxOptions,
    pub class_fields: ClassFieldMode,
    /// Enables multi-chunk code splitting across entry points.
    pub splitting: bool,
    /// Extension resolution order for extensionless and directory imports.
    pub extension_order: Vec<String>,
    pub color: bool,
    pub log_level: LogLevelOption,
    pub error_limit: usize,
}

impl BuildOptions {
    pub fn loader_for_path(&self, path: &str) -> LoaderKind {
        let ext = path.rsplit('.').next().unwrap_or("");
        if let Some(&loader) = self.loader.get(ext) {
            return loader;
        }
        LoaderKind::for_extension(ext)
    }

    pub fn effective_extension_order(&self) -> Vec<String> {
        if self.extension_order.is_empty() {
            vec![
                ".tsx".to_string(),
                ".ts".to_string(),
                ".jsx".to_string(),
                ".js".to_string(),
                ".json".to_string(),
            ]
        } else {
            self.extension_order.clone()
        }
    }
}

/// Options for single-file `transform` (no resolution, no linking).
#[derive(Clone, Debug, Default)]
pub struct TransformOptions {
    pub loader: LoaderKind,
    pub target: Target,
    pub minify_whitespace: bool,
    pub minify_identifiers: bool,
    pub minify_syntax: bool,
    pub source_map: SourceMapMode,
    pub define: IndexMap<String, String>,
    pub jsx: JsxOptions,
    pub class_fields: ClassFieldMode,
    pub source_file: Option<String>,
}

/// Minimum severity that gets rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevelOption {
    #[default]
    Info,
    Warning,
    Error,
    Silent,
}
