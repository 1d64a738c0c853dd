//! The parallel scan phase.
//!
//! A worklist of canonical paths drives discovery: each worker loads one
//! file, parses it (or synthesizes an AST for non-JS loaders), and
//! resolves its import specifiers. Newly seen canonical paths join the
//! worklist with freshly allocated source indices. The scan completes
//! when the worklist drains.
//!
//! Workers run in parallel per generation; index allocation stays
//! sequential in discovery order so everything downstream is
//! deterministic without sorting.

use base64::Engine;
use rayon::prelude::*;

use jolt_common::logger::{DiagnosticKind, Log, LogLevel};
use jolt_common::options::{BuildOptions, LoaderKind};
use jolt_common::refs::SourceIndex;
use jolt_common::source::Source;
use jolt_common::span::Span;

use jolt_parser::parts::Ast;
use jolt_parser::{ParseOptions, parse, synthetic_json_module, synthetic_string_module};
use jolt_resolver::{FileSystem, ResolveResult, Resolver, ResolverOptions, parent_dir};

use crate::registry::SourceRegistry;
use crate::runtime::{RUNTIME_PATH, RUNTIME_SOURCE, RUNTIME_SPECIFIER};

pub struct ScanResult {
    pub sources: Vec<Source>,
    pub asts: Vec<Ast>,
    pub entry_indices: Vec<SourceIndex>,
}

struct WorkItem {
    index: SourceIndex,
    path: String,
    loader: LoaderKind,
    /// Synthetic contents (runtime library, disabled-module stubs).
    contents: Option<String>,
}

struct WorkOutput {
    index: SourceIndex,
    source: Source,
    ast: Ast,
}

fn parse_options_for(options: &BuildOptions, loader: LoaderKind) -> ParseOptions {
    ParseOptions {
        loader,
        target: options.target,
        jsx: options.jsx.clone(),
        define: options.define.clone(),
        class_fields: options.class_fields,
        minify_syntax: options.minify_syntax,
    }
}

pub fn scan(options: &BuildOptions, fs: &dyn FileSystem, log: &Log) -> ScanResult {
    let _span = tracing::info_span!("scan").entered();

    let registry = SourceRegistry::new();
    let resolver = Resolver::new(
        fs,
        ResolverOptions {
            extension_order: options.effective_extension_order(),
            platform: options.platform,
            external: options.external.clone(),
            loader_overrides: options.loader.clone(),
        },
    );

    // The runtime library always takes index zero
    let (runtime_index, _) = registry.intern(RUNTIME_PATH);
    debug_assert_eq!(runtime_index, SourceIndex::RUNTIME);
    let mut frontier = vec![WorkItem {
        index: runtime_index,
        path: RUNTIME_PATH.to_string(),
        loader: LoaderKind::Js,
        contents: Some(RUNTIME_SOURCE.to_string()),
    }];

    // Entry points resolve like relative imports so extensionless and
    // directory entries work
    let mut entry_indices = Vec::new();
    for entry in &options.entry_points {
        let dir = parent_dir(entry);
        let name = entry.rsplit('/').next().unwrap_or(entry);
        let resolved = resolver.resolve(&dir, &format!("./{name}"));
        match resolved {
            ResolveResult::Found { path, loader } => {
                let (index, is_new) = registry.intern(&path);
                entry_indices.push(index);
                if is_new {
                    frontier.push(WorkItem {
                        index,
                        path,
                        loader,
                        contents: None,
                    });
                }
            }
            _ => {
                log.add_kind(
                    LogLevel::Error,
                    DiagnosticKind::Resolution,
                    "",
                    Span::dummy(),
                    format!("could not resolve entry point \"{entry}\""),
                );
            }
        }
    }

    let mut slots: Vec<Option<WorkOutput>> = Vec::new();

    while !frontier.is_empty() {
        // Parse this generation in parallel
        let generation: Vec<WorkOutput> = frontier
            .par_iter()
            .map(|item| load_and_parse(item, options, fs, log))
            .collect();
        frontier.clear();

        // Resolve specifiers sequentially so index allocation follows
        // discovery order
        for mut output in generation {
            let importer_dir = parent_dir(&output.source.key_path);
            for record_index in 0..output.ast.import_records.len() {
                let record = &output.ast.import_records[record_index];
                if record.is_unused {
                    continue;
                }
                let specifier = record.specifier.clone();
                let span = record.span;

                if specifier == RUNTIME_SPECIFIER {
                    output.ast.import_records[record_index].source_index =
                        Some(SourceIndex::RUNTIME);
                    continue;
                }

                match resolver.resolve(&importer_dir, &specifier) {
                    ResolveResult::Found { path, loader } => {
                        let (index, is_new) = registry.intern(&path);
                        output.ast.import_records[record_index].source_index = Some(index);
                        if is_new {
                            frontier.push(WorkItem {
                                index,
                                path,
                                loader,
                                contents: None,
                            });
                        }
                    }
                    ResolveResult::External => {
                        output.ast.import_records[record_index].is_external = true;
                    }
                    ResolveResult::Disabled => {
                        // Disabled modules become shared empty stubs
                        let stub_path = format!("(disabled):{specifier}");
                        let (index, is_new) = registry.intern(&stub_path);
                        output.ast.import_records[record_index].source_index = Some(index);
                        if is_new {
                            frontier.push(WorkItem {
                                index,
                                path: stub_path,
                                loader: LoaderKind::Js,
                                contents: Some(String::new()),
                            });
                        }
                    }
                    ResolveResult::BuiltinNotAvailable => {
                        log.add_kind(
                            LogLevel::Error,
                            DiagnosticKind::Resolution,
                            &output.source.pretty_path,
                            span,
                            format!(
                                "could not resolve \"{specifier}\": it is a node built-in; \
                                 use --platform=node or add it to --external"
                            ),
                        );
                        output.ast.import_records[record_index].is_external = true;
                    }
                    ResolveResult::NotFound => {
                        log.add_kind(
                            LogLevel::Error,
                            DiagnosticKind::Resolution,
                            &output.source.pretty_path,
                            span,
                            format!("could not resolve \"{specifier}\""),
                        );
                    }
                }
            }

            let slot = output.index.idx();
            if slots.len() <= slot {
                slots.resize_with(slot + 1, || None);
            }
            slots[slot] = Some(output);
        }
    }

    // Unpack slots in index order
    let count = registry.len();
    if slots.len() < count {
        slots.resize_with(count, || None);
    }
    let mut sources = Vec::with_capacity(count);
    let mut asts = Vec::with_capacity(count);
    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(output) => {
                sources.push(output.source);
                asts.push(output.ast);
            }
            None => {
                // An interned path whose load failed; keep the indices
                // aligned with an empty placeholder
                let path = registry.path_of(SourceIndex(index as u32));
                sources.push(Source::new(
                    SourceIndex(index as u32),
                    path,
                    String::new(),
                    LoaderKind::Js,
                ));
                asts.push(Ast::default());
            }
        }
    }

    ScanResult {
        sources,
        asts,
        entry_indices,
    }
}

fn load_and_parse(
    item: &WorkItem,
    options: &BuildOptions,
    fs: &dyn FileSystem,
    log: &Log,
) -> WorkOutput {
    let _span = tracing::debug_span!("parse_file", path = item.path.as_str()).entered();

    let loader = if item.loader == LoaderKind::Default {
        LoaderKind::Js
    } else {
        item.loader
    };

    let bytes = match &item.contents {
        Some(contents) => contents.clone().into_bytes(),
        None => fs.read_file(&item.path).unwrap_or_else(|| {
            log.add_kind(
                LogLevel::Error,
                DiagnosticKind::Resolution,
                &item.path,
                Span::dummy(),
                "could not read file",
            );
            Vec::new()
        }),
    };

    let (source, ast) = match loader {
        LoaderKind::Json => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            let ast = match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(value) => synthetic_json_module(&value, &item.path, item.index, log),
                Err(error) => {
                    log.add_kind(
                        LogLevel::Error,
                        DiagnosticKind::Syntax,
                        &item.path,
                        Span::dummy(),
                        format!("invalid JSON: {error}"),
                    );
                    synthetic_json_module(&serde_json::Value::Null, &item.path, item.index, log)
                }
            };
            (Source::new(item.index, &item.path, text, loader), ast)
        }
        LoaderKind::Text => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            let ast = synthetic_string_module(text.clone(), &item.path, item.index, log);
            (Source::new(item.index, &item.path, text, loader), ast)
        }
        LoaderKind::Base64 | LoaderKind::Binary => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
            let ast = synthetic_string_module(encoded.clone(), &item.path, item.index, log);
            (Source::new(item.index, &item.path, encoded, loader), ast)
        }
        LoaderKind::DataUrl => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
            let url = format!("data:{};base64,{encoded}", mime_for_path(&item.path));
            let ast = synthetic_string_module(url.clone(), &item.path, item.index, log);
            (Source::new(item.index, &item.path, url, loader), ast)
        }
        _ => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            let ast = parse(
                &text,
                &item.path,
                item.index,
                parse_options_for(options, loader),
                log,
            );
            (Source::new(item.index, &item.path, text, loader), ast)
        }
    };

    WorkOutput {
        index: item.index,
        source,
        ast,
    }
}

fn mime_for_path(path: &str) -> &'static str {
    match path.rsplit('.').next().unwrap_or("") {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "json" => "application/json",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
