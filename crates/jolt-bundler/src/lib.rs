//! Bundling pipeline: scan → link → emit.
//!
//! [`build`] is the whole-pipeline entry point used by the CLI and the
//! programmatic API: it discovers files from the entry points in
//! parallel, links them into chunks, and returns output files as byte
//! buffers paired with virtual paths. [`transform`] is the single-file
//! pipeline with no resolution or linking.
//!
//! There is no global state anywhere: the log, registry and symbol map
//! are created per invocation and threaded through explicitly.

use rustc_hash::FxHashMap;

use jolt_common::logger::Log;
use jolt_common::options::{BuildOptions, SourceMapMode, TransformOptions};
use jolt_common::refs::SourceIndex;
use jolt_common::source::Source;

use jolt_emitter::{PrintArgs, PrintOptions, SourceMapJoiner, print_stmts};
use jolt_parser::symbols::SymbolMap;
use jolt_parser::{ParseOptions, parse};
use jolt_resolver::FileSystem;

pub mod linker;
pub mod registry;
pub mod runtime;
pub mod scanner;

pub use linker::{Linker, OutputFile};
pub use scanner::{ScanResult, scan};

pub struct BuildResult {
    pub output_files: Vec<OutputFile>,
}

/// Run a full build: scan from the entry points, link, and emit.
///
/// Diagnostics accumulate in `log`; a phase that leaves errors behind
/// aborts the pipeline before the next phase starts.
pub fn build(options: &BuildOptions, fs: &dyn FileSystem, log: &Log) -> BuildResult {
    if !options.bundle {
        return build_without_bundling(options, fs, log);
    }

    let scan_result = scanner::scan(options, fs, log);
    if log.has_errors() {
        return BuildResult {
            output_files: Vec::new(),
        };
    }

    let linker = Linker::new(
        options,
        log,
        scan_result.sources,
        scan_result.asts,
        scan_result.entry_indices,
    );
    let output_files = linker.link();
    BuildResult { output_files }
}

/// Without `bundle`, each entry file compiles independently: parsed,
/// lowered and printed, with imports left as they are.
fn build_without_bundling(options: &BuildOptions, fs: &dyn FileSystem, log: &Log) -> BuildResult {
    let mut output_files = Vec::new();
    for entry in &options.entry_points {
        let Some(text) = fs.read_file_text(entry) else {
            log.add_error("", jolt_common::span::Span::dummy(), format!(
                "could not read entry point \"{entry}\""
            ));
            continue;
        };
        let transform_options = TransformOptions {
            loader: options.loader_for_path(entry),
            target: options.target,
            minify_whitespace: options.minify_whitespace,
            minify_identifiers: options.minify_identifiers,
            minify_syntax: options.minify_syntax,
            source_map: options.source_map,
            define: options.define.clone(),
            jsx: options.jsx.clone(),
            class_fields: options.class_fields,
            source_file: Some(entry.clone()),
        };
        let result = transform(&text, &transform_options, log);

        let base = entry.rsplit('/').next().unwrap_or("out");
        let stem = base.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(base);
        let path = match &options.outdir {
            Some(outdir) => format!("{}/{stem}.js", outdir.trim_end_matches('/')),
            None => options
                .outfile
                .clone()
                .unwrap_or_else(|| format!("{stem}.js")),
        };
        let mut contents = result.text.into_bytes();
        if let Some(map) = result.source_map {
            match options.source_map {
                SourceMapMode::External => {
                    let map_path = format!("{path}.map");
                    let comment = format!(
                        "//# sourceMappingURL={}\n",
                        map_path.rsplit('/').next().unwrap_or(&map_path)
                    );
                    contents.extend_from_slice(comment.as_bytes());
                    output_files.push(OutputFile {
                        path: map_path,
                        contents: map.into_bytes(),
                    });
                }
                _ => {}
            }
        }
        output_files.push(OutputFile { path, contents });
    }
    BuildResult { output_files }
}

pub struct TransformResult {
    pub text: String,
    /// JSON source map for `external` mode; `inline` embeds it in
    /// `text` instead.
    pub source_map: Option<String>,
}

/// Single-file compile: parse, lower, print. No resolution, no linking.
pub fn transform(source_text: &str, options: &TransformOptions, log: &Log) -> TransformResult {
    let path = options.source_file.as_deref().unwrap_or("<stdin>");
    let parse_options = ParseOptions {
        loader: options.loader,
        target: options.target,
        jsx: options.jsx.clone(),
        define: options.define.clone(),
        class_fields: options.class_fields,
        minify_syntax: options.minify_syntax,
    };
    let ast = parse(source_text, path, SourceIndex(0), parse_options, log);

    let mut symbols = SymbolMap::with_source_count(1);
    symbols.outer[0] = ast.symbols.clone();
    symbols.seed_output_names();

    if options.minify_identifiers {
        let reserved = jolt_emitter::collect_reserved_names(&symbols);
        let alphabet = ast.char_freq.compile();
        let files = [(SourceIndex(0), &ast)];
        jolt_emitter::rename_for_size(&mut symbols, &files, &reserved, &alphabet);
    }

    let source = Source::new(SourceIndex(0), path, source_text, options.loader);
    let want_map = options.source_map != SourceMapMode::None;
    let stmts: Vec<&jolt_parser::ast::Stmt> = ast
        .parts
        .iter()
        .flat_map(|part| part.stmts.iter())
        .collect();
    let args = PrintArgs {
        symbols: &symbols,
        import_records: &ast.import_records,
        wrappers: &FxHashMap::default(),
        dynamic_paths: &FxHashMap::default(),
        source: Some(&source),
        options: PrintOptions {
            minify_whitespace: options.minify_whitespace,
            bundle: false,
            format: Default::default(),
            source_map: want_map,
        },
    };
    let printed = print_stmts(&stmts, &args);

    // Lowering may have requested runtime helpers; with no runtime
    // module to link against, standalone definitions come first
    let mut text = String::new();
    let mut emitted_helpers: Vec<&str> = Vec::new();
    for (helper, _) in &ast.runtime_imports {
        for &needed in runtime::standalone_helpers(helper) {
            if !emitted_helpers.contains(&needed) {
                emitted_helpers.push(needed);
                if let Some(definition) = runtime::helper_definition(needed) {
                    text.push_str(definition);
                    text.push('\n');
                }
            }
        }
    }
    let helper_lines = text.matches('\n').count() as u32;
    text.push_str(&printed.text);

    let mut source_map = None;
    if want_map {
        let mut joiner = SourceMapJoiner::new();
        let index = joiner.add_source(path, source_text);
        let line_count = printed.text.matches('\n').count() as u32;
        joiner.append_chunk(&printed.map, index, helper_lines, line_count);
        let map = joiner.finish();
        match options.source_map {
            SourceMapMode::Inline => {
                text.push_str(&map.to_inline_comment());
                text.push('\n');
            }
            SourceMapMode::External => source_map = Some(map.to_json()),
            SourceMapMode::None => {}
        }
    }

    TransformResult { text, source_map }
}
