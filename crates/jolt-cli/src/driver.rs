//! Build orchestration: arguments → options → pipeline → disk.

use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use jolt_bundler::build;
use jolt_common::logger::{Log, LogLevel, render_diagnostic};
use jolt_common::options::{
    BuildOptions, JsxOptions, LoaderKind, LogLevelOption, OutputFormat, Platform, SourceMapMode,
    Target,
};
use jolt_common::source::Source;
use jolt_resolver::OsFileSystem;

use crate::args::{CliArgs, ColorArg, Format, LogLevelArg, PlatformArg, SourceMapArg};

pub fn run(args: CliArgs) -> Result<i32> {
    let options = build_options_from(&args)?;
    let fs = OsFileSystem;
    let log = Log::new(options.error_limit);

    let start = std::time::Instant::now();
    let result = build(&options, &fs, &log);

    // Render diagnostics, with sources re-read for context lines
    let use_color = match args.color {
        ColorArg::Always => true,
        ColorArg::Never => false,
        ColorArg::Auto => std::io::stderr().is_terminal(),
    };
    let min_level = match args.log_level {
        LogLevelArg::Info | LogLevelArg::Warning => LogLevel::Warning,
        LogLevelArg::Error => LogLevel::Error,
        LogLevelArg::Silent => LogLevel::Error, // errors still decide the exit code
    };
    let diagnostics = log.take();
    let mut had_errors = false;
    for diagnostic in &diagnostics {
        if diagnostic.level == LogLevel::Error {
            had_errors = true;
        }
        if args.log_level == LogLevelArg::Silent || diagnostic.level < min_level {
            continue;
        }
        let source = std::fs::read_to_string(&diagnostic.path).ok().map(|contents| {
            Source::new(
                jolt_common::refs::SourceIndex(0),
                diagnostic.path.clone(),
                contents,
                LoaderKind::Js,
            )
        });
        eprintln!("{}", render_diagnostic(diagnostic, source.as_ref(), use_color));
    }
    let omitted = log.errors_omitted();
    if omitted > 0 && args.log_level != LogLevelArg::Silent {
        eprintln!("{omitted} more errors omitted");
    }

    if had_errors {
        return Ok(1);
    }

    // Write outputs
    for file in &result.output_files {
        let path = Path::new(&file.path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("could not create directory {}", parent.display()))?;
            }
        }
        std::fs::write(path, &file.contents)
            .with_context(|| format!("could not write {}", file.path))?;
    }

    if args.log_level == LogLevelArg::Info {
        let total: usize = result.output_files.iter().map(|f| f.contents.len()).sum();
        eprintln!(
            "wrote {} file(s), {} bytes, in {:?}",
            result.output_files.len(),
            total,
            start.elapsed()
        );
    }
    Ok(0)
}

fn build_options_from(args: &CliArgs) -> Result<BuildOptions> {
    let Some(target) = Target::parse(&args.target) else {
        bail!("unsupported target {:?}", args.target);
    };

    if args.outfile.is_some() && args.entry_points.len() > 1 {
        bail!("cannot use --outfile with multiple entry points; use --outdir");
    }

    let mut define = IndexMap::new();
    for entry in &args.define {
        let Some((key, value)) = entry.split_once('=') else {
            bail!("invalid --define {entry:?}; expected path=value");
        };
        define.insert(key.trim_start_matches(':').to_string(), value.to_string());
    }

    let mut loader = FxHashMap::default();
    for entry in &args.loader {
        let Some((ext, kind)) = entry.split_once('=') else {
            bail!("invalid --loader {entry:?}; expected .ext=loader");
        };
        let kind = match kind {
            "js" => LoaderKind::Js,
            "jsx" => LoaderKind::Jsx,
            "ts" => LoaderKind::Ts,
            "tsx" => LoaderKind::Tsx,
            "json" => LoaderKind::Json,
            "text" => LoaderKind::Text,
            "base64" => LoaderKind::Base64,
            "dataurl" => LoaderKind::DataUrl,
            "binary" => LoaderKind::Binary,
            _ => bail!("unknown loader {kind:?}"),
        };
        loader.insert(
            ext.trim_start_matches(':').trim_start_matches('.').to_string(),
            kind,
        );
    }

    let mut jsx = JsxOptions::default();
    if let Some(factory) = &args.jsx_factory {
        jsx.factory = factory.split('.').map(str::to_string).collect();
    }
    if let Some(fragment) = &args.jsx_fragment {
        jsx.fragment = fragment.split('.').map(str::to_string).collect();
    }

    // Entry paths become absolute, `/`-separated canonical keys
    let cwd = std::env::current_dir().context("could not read working directory")?;
    let entry_points = args
        .entry_points
        .iter()
        .map(|entry| {
            let path = Path::new(entry);
            let absolute = if path.is_absolute() {
                path.to_path_buf()
            } else {
                cwd.join(path)
            };
            absolute.to_string_lossy().replace('\\', "/")
        })
        .collect();

    Ok(BuildOptions {
        entry_points,
        bundle: args.bundle,
        outfile: args.outfile.clone(),
        outdir: args.outdir.clone(),
        minify_whitespace: args.minify || args.minify_whitespace,
        minify_identifiers: args.minify || args.minify_identifiers,
        minify_syntax: args.minify || args.minify_syntax,
        source_map: match args.sourcemap {
            SourceMapArg::None => SourceMapMode::None,
            SourceMapArg::Inline => SourceMapMode::Inline,
            SourceMapArg::External => SourceMapMode::External,
        },
        target,
        platform: match args.platform {
            PlatformArg::Browser => Platform::Browser,
            PlatformArg::Node => Platform::Node,
        },
        external: args.external.clone(),
        format: match args.format {
            Format::Iife => OutputFormat::Iife,
            Format::Cjs => OutputFormat::CommonJs,
            Format::Esm => OutputFormat::EsModule,
        },
        loader,
        define,
        jsx,
        class_fields: Default::default(),
        splitting: args.splitting,
        extension_order: Vec::new(),
        color: args.color == ColorArg::Always,
        log_level: match args.log_level {
            LogLevelArg::Info => LogLevelOption::Info,
            LogLevelArg::Warning => LogLevelOption::Warning,
            LogLevelArg::Error => LogLevelOption::Error,
            LogLevelArg::Silent => LogLevelOption::Silent,
        },
        error_limit: args.error_limit,
    })
}
