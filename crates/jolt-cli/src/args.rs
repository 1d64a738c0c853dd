//! CLI arguments for the jolt binary.

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "jolt", version, about = "An extremely fast JavaScript bundler")]
pub struct CliArgs {
    /// Entry point files
    #[arg(required = true)]
    pub entry_points: Vec<String>,

    // ==================== Bundling ====================
    /// Bundle all dependencies into the output files
    #[arg(long)]
    pub bundle: bool,

    /// Enable code splitting across entry points and dynamic imports
    #[arg(long)]
    pub splitting: bool,

    /// The output file (single entry point only)
    #[arg(long)]
    pub outfile: Option<String>,

    /// The output directory (for multiple entry points)
    #[arg(long)]
    pub outdir: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Iife)]
    pub format: Format,

    /// Platform the output runs on
    #[arg(long, value_enum, default_value_t = PlatformArg::Browser)]
    pub platform: PlatformArg,

    /// Language version floor for the output (e.g. es2017, esnext)
    #[arg(long, default_value = "esnext")]
    pub target: String,

    /// Mark a module specifier as external (repeatable)
    #[arg(long = "external")]
    pub external: Vec<String>,

    // ==================== Minification ====================
    /// Enable all three minification axes
    #[arg(long)]
    pub minify: bool,

    /// Remove whitespace from the output
    #[arg(long = "minify-whitespace")]
    pub minify_whitespace: bool,

    /// Rename symbols to short names
    #[arg(long = "minify-identifiers")]
    pub minify_identifiers: bool,

    /// Simplify syntax where the result is smaller
    #[arg(long = "minify-syntax")]
    pub minify_syntax: bool,

    // ==================== Source maps ====================
    /// Source map emission
    #[arg(long = "sourcemap", value_enum, default_value_t = SourceMapArg::None)]
    pub sourcemap: SourceMapArg,

    // ==================== Transforms ====================
    /// Substitute a dotted identifier path with a constant:
    /// --define:process.env.NODE_ENV="production" (repeatable)
    #[arg(long = "define")]
    pub define: Vec<String>,

    /// Loader for an extension: --loader:.svg=text (repeatable)
    #[arg(long = "loader")]
    pub loader: Vec<String>,

    /// JSX factory function (default React.createElement)
    #[arg(long = "jsx-factory")]
    pub jsx_factory: Option<String>,

    /// JSX fragment value (default React.Fragment)
    #[arg(long = "jsx-fragment")]
    pub jsx_fragment: Option<String>,

    // ==================== Diagnostics ====================
    /// Force colored output on or off
    #[arg(long, value_enum, default_value_t = ColorArg::Auto)]
    pub color: ColorArg,

    /// Minimum severity that gets printed
    #[arg(long = "log-level", value_enum, default_value_t = LogLevelArg::Info)]
    pub log_level: LogLevelArg,

    /// Stop reporting errors after this many (0 = unlimited)
    #[arg(long = "error-limit", default_value_t = 10)]
    pub error_limit: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Iife,
    Cjs,
    Esm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    Browser,
    Node,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceMapArg {
    None,
    Inline,
    External,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorArg {
    Auto,
    Always,
    Never,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Info,
    Warning,
    Error,
    Silent,
}
