//! Phase: chunk formation and output generation.
//!
//! Without code splitting each entry point becomes one self-contained
//! output file. With splitting, every part is tagged with the set of
//! entry points that reach it (including dynamic-import targets), parts
//! are grouped by equivalence class of those sets, and synthetic
//! imports/exports stitch the chunks back together. Either way the
//! final steps are the same: order files dependency-first, rename
//! symbols, print files in parallel, and concatenate text plus
//! source-map chunks.

use std::hash::{Hash, Hasher};

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};

use jolt_common::options::{OutputFormat, SourceMapMode};
use jolt_common::refs::{Ref, SourceIndex};
use jolt_common::span::Span;

use jolt_emitter::{
    PrintArgs, PrintOptions, PrintResult, SourceMapJoiner, print_stmts, rename_for_readability,
    rename_for_size,
};
use jolt_parser::ast::*;
use jolt_parser::parts::{ImportKind, NS_EXPORT_PART_INDEX};

use super::shake::{Liveness, shake_from_entry};
use super::Linker;

#[derive(Debug)]
pub struct OutputFile {
    pub path: String,
    pub contents: Vec<u8>,
}

pub(crate) fn generate(mut linker: Linker<'_>) -> Vec<OutputFile> {
    if linker.options.splitting {
        if linker.options.format != OutputFormat::EsModule {
            linker.log.add_error(
                "",
                Span::dummy(),
                "code splitting requires the \"esm\" output format",
            );
            return Vec::new();
        }
        generate_split(linker)
    } else {
        generate_per_entry(linker)
    }
}

// =============================================================================
// One self-contained bundle per entry point
// =============================================================================

fn generate_per_entry(mut linker: Linker<'_>) -> Vec<OutputFile> {
    let mut outputs = Vec::new();
    let entries = linker.entry_points.clone();
    for entry in entries {
        let liveness = shake_from_entry(&linker, entry);
        let files = file_order(&linker, &liveness);

        rename_chunk(&mut linker, &files);

        let chunk_path = entry_output_path(&linker, entry);
        let include_all = |file: SourceIndex, part: u32| liveness.is_live(file, part);
        let (text, map) = emit_chunk(
            &linker,
            &files,
            &include_all,
            Some(entry),
            &FxHashMap::default(),
            &chunk_path,
        );
        push_output(&mut outputs, &linker, chunk_path, text, map);
    }
    outputs
}

// =============================================================================
// Code splitting
// =============================================================================

fn generate_split(mut linker: Linker<'_>) -> Vec<OutputFile> {
    // Dynamic-import targets are entry points of their own chunks
    let mut entries = linker.entry_points.clone();
    let mut dynamic_records: Vec<(SourceIndex, u32, SourceIndex)> = Vec::new();
    for (index, ast) in linker.asts.iter().enumerate() {
        for (record_index, record) in ast.import_records.iter().enumerate() {
            if record.kind == ImportKind::Dynamic && !record.is_unused {
                if let Some(target) = record.source_index {
                    dynamic_records.push((SourceIndex(index as u32), record_index as u32, target));
                    if !entries.contains(&target) {
                        entries.push(target);
                    }
                }
            }
        }
    }

    // Per-entry tree-shakes tag each part with the entries reaching it
    let passes: Vec<Liveness> = entries
        .iter()
        .map(|&entry| shake_from_entry(&linker, entry))
        .collect();

    // Entry-set key per part
    let mut part_sets: FxHashMap<(SourceIndex, u32), u64> = FxHashMap::default();
    for (entry_bit, liveness) in passes.iter().enumerate() {
        for (file_index, bits) in liveness.live.iter().enumerate() {
            for part in bits.ones() {
                *part_sets
                    .entry((SourceIndex(file_index as u32), part as u32))
                    .or_insert(0) |= 1 << entry_bit;
            }
        }
    }

    // Cross-part assignments force the writer into the declarer's
    // chunk: unify the entry sets of connected components
    let mut component: FxHashMap<(SourceIndex, u32), (SourceIndex, u32)> = FxHashMap::default();
    fn find(
        component: &mut FxHashMap<(SourceIndex, u32), (SourceIndex, u32)>,
        key: (SourceIndex, u32),
    ) -> (SourceIndex, u32) {
        let parent = *component.get(&key).unwrap_or(&key);
        if parent == key {
            return key;
        }
        let root = find(component, parent);
        component.insert(key, root);
        root
    }
    for (file_index, ast) in linker.asts.iter().enumerate() {
        let file = SourceIndex(file_index as u32);
        for (part_index, part) in ast.parts.iter().enumerate() {
            for &mutated in &part.mutated_symbols {
                let canonical = linker.symbols.follow_read(mutated);
                let (decl_file, decl_parts) = linker.declaring_parts(canonical);
                for decl_part in decl_parts {
                    let a = find(&mut component, (file, part_index as u32));
                    let b = find(&mut component, (decl_file, decl_part));
                    if a != b {
                        component.insert(a, b);
                    }
                }
            }
        }
    }
    // Union the sets across each component
    let keys: Vec<(SourceIndex, u32)> = part_sets.keys().copied().collect();
    let mut component_sets: FxHashMap<(SourceIndex, u32), u64> = FxHashMap::default();
    for &key in &keys {
        let root = find(&mut component, key);
        *component_sets.entry(root).or_insert(0) |= part_sets[&key];
    }
    for &key in &keys {
        let root = find(&mut component, key);
        part_sets.insert(key, component_sets[&root]);
    }

    // Chunks are the distinct entry sets, ordered deterministically:
    // single-entry chunks first in entry order, then shared chunks.
    // Every entry keeps a chunk of its own even when all of its parts
    // ended up shared, so dynamic imports always have a target file.
    let mut sets: FxHashSet<u64> = part_sets.values().copied().collect();
    for entry_bit in 0..entries.len() {
        sets.insert(1u64 << entry_bit);
    }
    let mut set_keys: Vec<u64> = sets.into_iter().collect();
    set_keys.sort_by_key(|&bits| (bits.count_ones(), bits));

    struct ChunkPlan {
        bits: u64,
        path: String,
        entry: Option<SourceIndex>,
    }
    let mut plans: Vec<ChunkPlan> = Vec::new();
    for bits in set_keys {
        let entry = if bits.count_ones() == 1 {
            Some(entries[bits.trailing_zeros() as usize])
        } else {
            None
        };
        let path = match entry {
            Some(entry) => entry_output_path(&linker, entry),
            None => shared_chunk_path(&linker, bits, &part_sets),
        };
        plans.push(ChunkPlan { bits, path, entry });
    }

    // Symbol → owning chunk, for cross-chunk references
    let chunk_of_part: FxHashMap<(SourceIndex, u32), usize> = part_sets
        .iter()
        .map(|(&key, &bits)| {
            let chunk = plans.iter().position(|plan| plan.bits == bits).unwrap();
            (key, chunk)
        })
        .collect();

    // Dynamic import record → target chunk path (per importing file)
    let mut dynamic_paths: FxHashMap<SourceIndex, FxHashMap<u32, String>> = FxHashMap::default();
    for (importer, record_index, target) in dynamic_records {
        let entry_bit = entries.iter().position(|&e| e == target).unwrap();
        let bits = 1u64 << entry_bit;
        if let Some(plan) = plans.iter().find(|plan| plan.bits & bits != 0 && plan.entry == Some(target)) {
            dynamic_paths
                .entry(importer)
                .or_default()
                .insert(record_index, format!("./{}", file_name_of(&plan.path)));
        }
    }

    // One global rename: every chunk's top level shares the final
    // namespace, so cross-chunk imports can use the plain names
    let union_liveness = union_of(&passes, &linker);
    let all_files = file_order(&linker, &union_liveness);
    rename_chunk(&mut linker, &all_files);

    // Cross-chunk symbol flow: for each chunk, which refs it reads from
    // other chunks
    let mut chunk_imports: Vec<FxHashMap<usize, FxHashSet<Ref>>> =
        vec![FxHashMap::default(); plans.len()];
    let mut chunk_exports: Vec<FxHashSet<Ref>> = vec![FxHashSet::default(); plans.len()];
    for (&(file, part_index), &chunk) in &chunk_of_part {
        let part = &linker.asts[file.idx()].parts[part_index as usize];
        for reference in part.symbol_uses.keys() {
            let canonical = linker.symbols.follow_read(*reference);
            let (decl_file, decl_parts) = linker.declaring_parts(canonical);
            for decl_part in decl_parts {
                if let Some(&owner) = chunk_of_part.get(&(decl_file, decl_part)) {
                    if owner != chunk {
                        chunk_imports[chunk].entry(owner).or_default().insert(canonical);
                        chunk_exports[owner].insert(canonical);
                    }
                }
            }
        }
    }

    // Emit each chunk
    let mut outputs = Vec::new();
    for (chunk_index, plan) in plans.iter().enumerate() {
        let include = |file: SourceIndex, part: u32| {
            chunk_of_part.get(&(file, part)) == Some(&chunk_index)
        };
        let chunk_liveness = Liveness {
            live: {
                let mut live: Vec<fixedbitset::FixedBitSet> = linker
                    .asts
                    .iter()
                    .map(|ast| fixedbitset::FixedBitSet::with_capacity(ast.parts.len().max(1)))
                    .collect();
                for (&(file, part), &chunk) in &chunk_of_part {
                    if chunk == chunk_index {
                        live[file.idx()].insert(part as usize);
                    }
                }
                live
            },
            reached_files: {
                let mut reached = fixedbitset::FixedBitSet::with_capacity(linker.asts.len());
                for (&(file, _), &chunk) in &chunk_of_part {
                    if chunk == chunk_index {
                        reached.insert(file.idx());
                    }
                }
                reached
            },
        };
        let files = file_order(&linker, &chunk_liveness);

        // Synthetic imports between chunks; bare imports give ordering
        // for side-effect-only dependencies
        let mut header = String::new();
        let mut import_chunks: Vec<usize> = chunk_imports[chunk_index].keys().copied().collect();
        import_chunks.sort_unstable();
        for owner in import_chunks {
            let mut names: Vec<String> = chunk_imports[chunk_index][&owner]
                .iter()
                .map(|&reference| linker.symbols.name_of(reference).to_string())
                .collect();
            names.sort_unstable();
            let owner_file = file_name_of(&plans[owner].path);
            if names.is_empty() {
                header.push_str(&format!("import \"./{owner_file}\";\n"));
            } else {
                header.push_str(&format!(
                    "import {{ {} }} from \"./{owner_file}\";\n",
                    names.join(", ")
                ));
            }
        }

        let mut footer = String::new();
        if !chunk_exports[chunk_index].is_empty() {
            let mut names: Vec<String> = chunk_exports[chunk_index]
                .iter()
                .map(|&reference| linker.symbols.name_of(reference).to_string())
                .collect();
            names.sort_unstable();
            footer.push_str(&format!("export {{ {} }};\n", names.join(", ")));
        }

        let (text, map) = emit_chunk_with_frame(
            &linker,
            &files,
            &include,
            plan.entry,
            &dynamic_paths,
            &plan.path,
            &header,
            &footer,
        );
        push_output(&mut outputs, &linker, plan.path.clone(), text, map);
    }
    outputs
}

fn union_of(passes: &[Liveness], linker: &Linker<'_>) -> Liveness {
    let mut union = Liveness {
        live: linker
            .asts
            .iter()
            .map(|ast| fixedbitset::FixedBitSet::with_capacity(ast.parts.len().max(1)))
            .collect(),
        reached_files: fixedbitset::FixedBitSet::with_capacity(linker.asts.len()),
    };
    for pass in passes {
        for (index, bits) in pass.live.iter().enumerate() {
            union.live[index].union_with(bits);
        }
        union.reached_files.union_with(&pass.reached_files);
    }
    union
}

// =============================================================================
// Shared emission machinery
// =============================================================================

/// Dependency-first file order: DFS over import records from the entry
/// points, emitting dependencies before their importers. The runtime
/// library always lands first because every file that needs helpers
/// imports it.
fn file_order(linker: &Linker<'_>, liveness: &Liveness) -> Vec<SourceIndex> {
    let mut order = Vec::new();
    let mut visited = FxHashSet::default();

    fn visit(
        linker: &Linker<'_>,
        liveness: &Liveness,
        file: SourceIndex,
        visited: &mut FxHashSet<SourceIndex>,
        order: &mut Vec<SourceIndex>,
    ) {
        if !liveness.reached_files.contains(file.idx()) || !visited.insert(file) {
            return;
        }
        for record in &linker.asts[file.idx()].import_records {
            if record.is_unused || record.is_external {
                continue;
            }
            if record.kind == ImportKind::Dynamic {
                continue;
            }
            if let Some(target) = record.source_index {
                visit(linker, liveness, target, visited, order);
            }
        }
        order.push(file);
    }

    if liveness.reached_files.contains(SourceIndex::RUNTIME.idx()) {
        visit(linker, liveness, SourceIndex::RUNTIME, &mut visited, &mut order);
    }
    for index in 0..linker.asts.len() {
        visit(linker, liveness, SourceIndex(index as u32), &mut visited, &mut order);
    }
    order
}

fn rename_chunk(linker: &mut Linker<'_>, files: &[SourceIndex]) {
    let reserved = jolt_emitter::collect_reserved_names(&linker.symbols);
    let file_refs: Vec<(SourceIndex, &jolt_parser::parts::Ast)> = files
        .iter()
        .map(|&file| (file, &linker.asts[file.idx()]))
        .collect();
    if linker.options.minify_identifiers {
        // The alphabet ranks by character frequency across the files
        // that actually reach the output
        let mut freq = jolt_common::charfreq::CharFreq::default();
        for (_, ast) in &file_refs {
            freq.add(&ast.char_freq);
        }
        let alphabet = freq.compile();
        rename_for_size(&mut linker.symbols, &file_refs, &reserved, &alphabet);
    } else {
        rename_for_readability(&mut linker.symbols, &file_refs, &reserved);
    }
}

fn emit_chunk(
    linker: &Linker<'_>,
    files: &[SourceIndex],
    include: &(dyn Fn(SourceIndex, u32) -> bool + Sync),
    entry: Option<SourceIndex>,
    dynamic_paths: &FxHashMap<SourceIndex, FxHashMap<u32, String>>,
    chunk_path: &str,
) -> (String, Option<jolt_emitter::SourceMap>) {
    emit_chunk_with_frame(
        linker,
        files,
        include,
        entry,
        dynamic_paths,
        chunk_path,
        "",
        "",
    )
}

fn emit_chunk_with_frame(
    linker: &Linker<'_>,
    files: &[SourceIndex],
    include: &(dyn Fn(SourceIndex, u32) -> bool + Sync),
    entry: Option<SourceIndex>,
    dynamic_paths: &FxHashMap<SourceIndex, FxHashMap<u32, String>>,
    chunk_path: &str,
    header: &str,
    footer: &str,
) -> (String, Option<jolt_emitter::SourceMap>) {
    let _ = chunk_path;
    let wrappers = wrapper_map(linker);
    let want_map = linker.options.source_map != SourceMapMode::None;

    // Print every file of the chunk in parallel
    let printed: Vec<(SourceIndex, PrintResult)> = files
        .par_iter()
        .map(|&file| {
            let stmts = stmts_for_file(linker, file, include);
            let empty = FxHashMap::default();
            let file_dynamic_paths = dynamic_paths.get(&file).unwrap_or(&empty);
            let args = PrintArgs {
                symbols: &linker.symbols,
                import_records: &linker.asts[file.idx()].import_records,
                wrappers: &wrappers,
                dynamic_paths: file_dynamic_paths,
                source: Some(&linker.sources[file.idx()]),
                options: PrintOptions {
                    minify_whitespace: linker.options.minify_whitespace,
                    bundle: true,
                    format: linker.options.format,
                    source_map: want_map,
                },
            };
            let stmt_refs: Vec<&Stmt> = stmts.iter().collect();
            (file, print_stmts(&stmt_refs, &args))
        })
        .collect();

    // Concatenate, rebasing each file's source-map chunk
    let mut text = String::new();
    let mut line: u32 = 0;
    let mut joiner = SourceMapJoiner::new();

    let iife = entry.is_some() && linker.options.format == OutputFormat::Iife;
    if iife {
        text.push_str("(() => {\n");
        line += 1;
    }
    if !header.is_empty() {
        text.push_str(header);
        line += header.matches('\n').count() as u32;
    }

    for (file, result) in printed {
        if result.text.is_empty() {
            continue;
        }
        if want_map {
            let source = &linker.sources[file.idx()];
            let map_index = joiner.add_source(source.pretty_path.clone(), source.contents.clone());
            let line_count = result.text.matches('\n').count() as u32;
            joiner.append_chunk(&result.map, map_index, line, line_count);
        }
        line += result.text.matches('\n').count() as u32;
        text.push_str(&result.text);
    }

    // Entry-point epilogue: expose exports in the requested format
    if let Some(entry) = entry {
        let epilogue = entry_epilogue(linker, entry);
        line += epilogue.matches('\n').count() as u32;
        text.push_str(&epilogue);
    }
    if !footer.is_empty() {
        text.push_str(footer);
        line += footer.matches('\n').count() as u32;
    }
    if iife {
        text.push_str("})();\n");
    }
    let _ = line;

    let map = want_map.then(|| joiner.finish());
    (text, map)
}

/// The statements a file contributes to a chunk: its live parts with
/// interop rewrites, the exports-object installation, and the CommonJS
/// wrapper when required.
fn stmts_for_file(
    linker: &Linker<'_>,
    file: SourceIndex,
    include: &(dyn Fn(SourceIndex, u32) -> bool + Sync),
) -> Vec<Stmt> {
    let ast = &linker.asts[file.idx()];
    let meta = &linker.meta[file.idx()];
    let mut body = Vec::new();

    // Exports-object installation lives in the synthetic part 0
    if meta.needs_exports_object && include(file, NS_EXPORT_PART_INDEX) {
        body.extend(exports_object_stmts(linker, file));
    }

    for (part_index, part) in ast.parts.iter().enumerate() {
        if !include(file, part_index as u32) {
            continue;
        }
        for stmt in &part.stmts {
            match &stmt.data {
                SData::Import(import) => {
                    if let Some(replacement) = interop_import_stmt(linker, file, import) {
                        body.push(replacement);
                    } else {
                        body.push(stmt.clone());
                    }
                }
                SData::ExportFrom(data) => {
                    let record = &ast.import_records[data.import_record_index as usize];
                    if let Some(target) = record.source_index {
                        if linker.meta[target.idx()].wrap {
                            body.push(require_binding_stmt(
                                linker,
                                data.namespace_ref,
                                target,
                                true,
                            ));
                            continue;
                        }
                    }
                    body.push(stmt.clone());
                }
                SData::ExportStar(data) => {
                    let record = &ast.import_records[data.import_record_index as usize];
                    if let Some(target) = record.source_index {
                        if linker.meta[target.idx()].wrap {
                            // Evaluate the target; runtime lookups reach
                            // it through the dynamic-fallback path
                            body.push(require_binding_stmt(linker, Ref::NONE, target, false));
                            continue;
                        }
                    }
                    body.push(stmt.clone());
                }
                _ => body.push(stmt.clone()),
            }
        }
    }

    if !meta.wrap {
        return body;
    }

    // var require_x = __commonJS((exports, module) => { ...body... });
    let commonjs_ref = linker
        .runtime_helper_ref("__commonJS")
        .expect("runtime always exports __commonJS");
    let closure = Expr::new(
        Span::dummy(),
        EData::Arrow(Box::new(EArrow {
            args: vec![
                Arg {
                    binding: Binding {
                        span: Span::dummy(),
                        data: BData::Identifier(ast.exports_ref),
                    },
                    default: None,
                    is_parameter_property: false,
                },
                Arg {
                    binding: Binding {
                        span: Span::dummy(),
                        data: BData::Identifier(ast.module_ref),
                    },
                    default: None,
                    is_parameter_property: false,
                },
            ],
            has_rest_arg: false,
            is_async: false,
            prefer_expr: false,
            body,
        })),
    );
    let wrapper_call = Expr::new(
        Span::dummy(),
        EData::Call(Box::new(ECall {
            target: Expr::new(
                Span::dummy(),
                EData::ImportIdentifier(EIdentifier {
                    reference: commonjs_ref,
                }),
            ),
            args: vec![closure],
            optional_chain: OptionalChain::None,
            is_direct_eval: false,
        })),
    );
    vec![Stmt::new(
        Span::dummy(),
        SData::Local(SLocal {
            kind: LocalKind::Var,
            decls: vec![Decl {
                binding: Binding {
                    span: Span::dummy(),
                    data: BData::Identifier(ast.wrapper_ref),
                },
                value: Some(wrapper_call),
            }],
            is_export: false,
        }),
    )]
}

/// `var x_exports = {};` plus `__export(x_exports, {name: () => ref})`.
/// Wrapped modules reuse their closure's `exports` parameter instead of
/// a fresh object.
fn exports_object_stmts(linker: &Linker<'_>, file: SourceIndex) -> Vec<Stmt> {
    let ast = &linker.asts[file.idx()];
    let meta = &linker.meta[file.idx()];
    let mut out = Vec::new();

    if !meta.wrap {
        out.push(Stmt::new(
            Span::dummy(),
            SData::Local(SLocal {
                kind: LocalKind::Var,
                decls: vec![Decl {
                    binding: Binding {
                        span: Span::dummy(),
                        data: BData::Identifier(ast.exports_ref),
                    },
                    value: Some(Expr::new(Span::dummy(), EData::Object(EObject::default()))),
                }],
                is_export: false,
            }),
        ));
    }

    let export_ref = linker
        .runtime_helper_ref("__export")
        .expect("runtime always exports __export");
    let properties: Vec<Property> = meta
        .resolved_exports
        .iter()
        .map(|(name, &reference)| Property {
            kind: PropertyKind::Normal,
            key: Some(Expr::new(Span::dummy(), EData::String(EString::new(name.clone())))),
            is_computed: false,
            is_method: false,
            is_static: false,
            is_shorthand: false,
            value: Some(Expr::new(
                Span::dummy(),
                EData::Arrow(Box::new(EArrow {
                    args: Vec::new(),
                    has_rest_arg: false,
                    is_async: false,
                    prefer_expr: true,
                    body: vec![Stmt::new(
                        Span::dummy(),
                        SData::Return(Some(Expr::new(
                            Span::dummy(),
                            EData::ImportIdentifier(EIdentifier { reference }),
                        ))),
                    )],
                })),
            )),
            initializer: None,
        })
        .collect();

    out.push(Stmt::new(
        Span::dummy(),
        SData::Expr(Expr::new(
            Span::dummy(),
            EData::Call(Box::new(ECall {
                target: Expr::new(
                    Span::dummy(),
                    EData::ImportIdentifier(EIdentifier {
                        reference: export_ref,
                    }),
                ),
                args: vec![
                    Expr::new(
                        Span::dummy(),
                        EData::Identifier(EIdentifier {
                            reference: ast.exports_ref,
                        }),
                    ),
                    Expr::new(Span::dummy(), EData::Object(EObject { properties })),
                ],
                optional_chain: OptionalChain::None,
                is_direct_eval: false,
            })),
        )),
    ));
    out
}

/// Replacement for an `import` statement whose target is consumed as
/// CommonJS: bind the adapted exports object, or just evaluate the
/// wrapper for bare imports.
fn interop_import_stmt(
    linker: &Linker<'_>,
    _file: SourceIndex,
    import: &SImport,
) -> Option<Stmt> {
    let record_index = import.import_record_index as usize;
    let record = &linker.asts[_file.idx()].import_records[record_index];
    if record.is_external || record.is_unused {
        return None;
    }
    let target = record.source_index?;
    if !linker.meta[target.idx()].wrap {
        return None;
    }
    let has_bindings = import.default_name.is_some()
        || import.star_name_span.is_some()
        || !import.items.is_empty();
    Some(if has_bindings {
        require_binding_stmt(linker, import.namespace_ref, target, true)
    } else {
        require_binding_stmt(linker, Ref::NONE, target, false)
    })
}

/// `var ns = __toESM(require_target());` — or a bare `require_target();`
/// when no binding is needed.
fn require_binding_stmt(
    linker: &Linker<'_>,
    namespace_ref: Ref,
    target: SourceIndex,
    bind: bool,
) -> Stmt {
    let wrapper_ref = linker.asts[target.idx()].wrapper_ref;
    let require_call = Expr::new(
        Span::dummy(),
        EData::Call(Box::new(ECall {
            target: Expr::new(
                Span::dummy(),
                EData::Identifier(EIdentifier {
                    reference: wrapper_ref,
                }),
            ),
            args: Vec::new(),
            optional_chain: OptionalChain::None,
            is_direct_eval: false,
        })),
    );
    if !bind {
        return Stmt::new(Span::dummy(), SData::Expr(require_call));
    }
    let to_esm = linker
        .runtime_helper_ref("__toESM")
        .expect("runtime always exports __toESM");
    let adapted = Expr::new(
        Span::dummy(),
        EData::Call(Box::new(ECall {
            target: Expr::new(
                Span::dummy(),
                EData::ImportIdentifier(EIdentifier { reference: to_esm }),
            ),
            args: vec![require_call],
            optional_chain: OptionalChain::None,
            is_direct_eval: false,
        })),
    );
    Stmt::new(
        Span::dummy(),
        SData::Local(SLocal {
            kind: LocalKind::Var,
            decls: vec![Decl {
                binding: Binding {
                    span: Span::dummy(),
                    data: BData::Identifier(namespace_ref),
                },
                value: Some(adapted),
            }],
            is_export: false,
        }),
    )
}

/// Expose the entry's interface in the configured output format.
fn entry_epilogue(linker: &Linker<'_>, entry: SourceIndex) -> String {
    let meta = &linker.meta[entry.idx()];
    let ast = &linker.asts[entry.idx()];
    let mut out = String::new();

    if meta.wrap {
        let wrapper = linker.symbols.name_of(ast.wrapper_ref);
        match linker.options.format {
            OutputFormat::CommonJs => out.push_str(&format!("module.exports = {wrapper}();\n")),
            OutputFormat::EsModule => out.push_str(&format!("export default {wrapper}();\n")),
            OutputFormat::Iife => out.push_str(&format!("{wrapper}();\n")),
        }
        return out;
    }

    if meta.resolved_exports.is_empty() {
        return out;
    }
    match linker.options.format {
        OutputFormat::EsModule => {
            let items: Vec<String> = meta
                .resolved_exports
                .iter()
                .map(|(alias, &reference)| {
                    let name = linker
                        .symbols
                        .name_of(linker.symbols.follow_read(reference));
                    if name == alias {
                        name.to_string()
                    } else {
                        format!("{name} as {alias}")
                    }
                })
                .collect();
            out.push_str(&format!("export {{ {} }};\n", items.join(", ")));
        }
        OutputFormat::CommonJs => {
            let items: Vec<String> = meta
                .resolved_exports
                .iter()
                .map(|(alias, &reference)| {
                    let name = linker
                        .symbols
                        .name_of(linker.symbols.follow_read(reference));
                    format!("{alias}: {name}")
                })
                .collect();
            out.push_str(&format!("module.exports = {{ {} }};\n", items.join(", ")));
        }
        OutputFormat::Iife => {}
    }
    out
}

fn wrapper_map(linker: &Linker<'_>) -> FxHashMap<SourceIndex, Ref> {
    let mut map = FxHashMap::default();
    for index in 0..linker.asts.len() {
        if linker.meta[index].wrap {
            map.insert(SourceIndex(index as u32), linker.asts[index].wrapper_ref);
        }
    }
    map
}

// =============================================================================
// Output paths and files
// =============================================================================

fn entry_output_path(linker: &Linker<'_>, entry: SourceIndex) -> String {
    if let Some(outfile) = &linker.options.outfile {
        if linker.entry_points.len() == 1 && linker.entry_points.first() == Some(&entry) {
            return outfile.clone();
        }
    }
    let source = &linker.sources[entry.idx()];
    let base = source.key_path.rsplit('/').next().unwrap_or("out");
    let stem = base.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(base);
    match &linker.options.outdir {
        Some(outdir) => format!("{}/{stem}.js", outdir.trim_end_matches('/')),
        None => format!("{stem}.js"),
    }
}

fn shared_chunk_path(
    linker: &Linker<'_>,
    bits: u64,
    part_sets: &FxHashMap<(SourceIndex, u32), u64>,
) -> String {
    // Stable content identity: the sorted list of parts in this chunk
    let mut members: Vec<(u32, u32)> = part_sets
        .iter()
        .filter(|&(_, &set)| set == bits)
        .map(|(&(file, part), _)| (file.0, part))
        .collect();
    members.sort_unstable();
    let mut hasher = FxHasher::default();
    members.hash(&mut hasher);
    let hash = hasher.finish() as u32;
    match &linker.options.outdir {
        Some(outdir) => format!("{}/chunk-{hash:08x}.js", outdir.trim_end_matches('/')),
        None => format!("chunk-{hash:08x}.js"),
    }
}

fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn push_output(
    outputs: &mut Vec<OutputFile>,
    linker: &Linker<'_>,
    path: String,
    mut text: String,
    map: Option<jolt_emitter::SourceMap>,
) {
    match (linker.options.source_map, map) {
        (SourceMapMode::Inline, Some(map)) => {
            text.push_str(&map.to_inline_comment());
            text.push('\n');
            outputs.push(OutputFile {
                path,
                contents: text.into_bytes(),
            });
        }
        (SourceMapMode::External, Some(map)) => {
            let map_path = format!("{path}.map");
            text.push_str(&format!(
                "//# sourceMappingURL={}\n",
                file_name_of(&map_path)
            ));
            outputs.push(OutputFile {
                path,
                contents: text.into_bytes(),
            });
            outputs.push(OutputFile {
                path: map_path,
                contents: map.to_json().into_bytes(),
            });
        }
        _ => outputs.push(OutputFile {
            path,
            contents: text.into_bytes(),
        }),
    }
}
