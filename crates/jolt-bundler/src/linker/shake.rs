//! Phase: tree-shaking.
//!
//! Parts are the nodes. A part reaches the parts declaring the symbols
//! it uses, and the files behind the import records it references; an
//! `export *` record keeps its whole target file. Marking starts at
//! each entry point and runs to a fixpoint; unmarked parts are dropped.
//! Running the pass twice yields the same live set.

use fixedbitset::FixedBitSet;

use jolt_common::refs::SourceIndex;
use jolt_parser::parts::{ExportsKind, NS_EXPORT_PART_INDEX};

use super::Linker;

/// Liveness for one tree-shake pass: `live[file]` has a bit per part.
pub(crate) struct Liveness {
    pub live: Vec<FixedBitSet>,
    pub reached_files: FixedBitSet,
}

impl Liveness {
    fn new(linker: &Linker<'_>) -> Self {
        Liveness {
            live: linker
                .asts
                .iter()
                .map(|ast| FixedBitSet::with_capacity(ast.parts.len().max(1)))
                .collect(),
            reached_files: FixedBitSet::with_capacity(linker.asts.len()),
        }
    }

    pub fn is_live(&self, file: SourceIndex, part: u32) -> bool {
        self.live[file.idx()].contains(part as usize)
    }
}

/// Mark everything reachable from one entry point.
pub(crate) fn shake_from_entry(linker: &Linker<'_>, entry: SourceIndex) -> Liveness {
    let mut liveness = Liveness::new(linker);
    let mut worklist: Vec<(SourceIndex, u32)> = Vec::new();

    mark_file(linker, entry, &mut liveness, &mut worklist);

    // The entry's exports must survive even when nothing inside the
    // bundle references them
    for export_ref in linker.meta[entry.idx()].resolved_exports.values() {
        mark_symbol(linker, *export_ref, &mut liveness, &mut worklist);
    }

    while let Some((file, part_index)) = worklist.pop() {
        let ast = &linker.asts[file.idx()];
        let part = &ast.parts[part_index as usize];

        // Symbol uses pull in declaring parts, possibly across files
        for reference in part.symbol_uses.keys() {
            mark_symbol(linker, *reference, &mut liveness, &mut worklist);
        }

        // Import records pull in target files. With code splitting a
        // dynamic import starts its own entry chunk instead of joining
        // this one.
        for &record_index in &part.import_record_indices {
            let record = &ast.import_records[record_index as usize];
            if record.is_unused || record.is_external {
                continue;
            }
            if record.kind == jolt_parser::parts::ImportKind::Dynamic
                && linker.options.splitting
            {
                continue;
            }
            let Some(target) = record.source_index else {
                continue;
            };
            mark_file(linker, target, &mut liveness, &mut worklist);
            if record.is_export_star {
                // Wildcard re-exports keep the whole target alive
                mark_all_parts(linker, target, &mut liveness, &mut worklist);
            }
            if linker.meta[target.idx()].wrap {
                // The interop binding calls the wrapper and the adapter
                mark_helper(linker, "__commonJS", &mut liveness, &mut worklist);
                mark_helper(linker, "__toESM", &mut liveness, &mut worklist);
            }
        }
    }

    // Exports objects install a getter per export, so everything they
    // expose must stay live, along with the installation helper
    for index in 0..linker.asts.len() {
        if liveness.reached_files.contains(index) && linker.meta[index].needs_exports_object {
            mark_helper(linker, "__export", &mut liveness, &mut worklist);
            for &export_ref in linker.meta[index].resolved_exports.values() {
                mark_symbol(linker, export_ref, &mut liveness, &mut worklist);
            }
        }
    }
    while let Some((file, part_index)) = worklist.pop() {
        let ast = &linker.asts[file.idx()];
        let part = &ast.parts[part_index as usize];
        for reference in part.symbol_uses.keys() {
            mark_symbol(linker, *reference, &mut liveness, &mut worklist);
        }
        for &record_index in &part.import_record_indices {
            let record = &ast.import_records[record_index as usize];
            if record.kind == jolt_parser::parts::ImportKind::Dynamic
                && linker.options.splitting
            {
                continue;
            }
            if let Some(target) = record.source_index {
                if !record.is_unused && !record.is_external {
                    mark_file(linker, target, &mut liveness, &mut worklist);
                }
            }
        }
    }

    liveness
}

/// Mark a file's baseline parts: the synthetic export part, everything
/// with side effects, and all parts of wrapped modules (a CommonJS body
/// is a single unit).
fn mark_file(
    linker: &Linker<'_>,
    file: SourceIndex,
    liveness: &mut Liveness,
    worklist: &mut Vec<(SourceIndex, u32)>,
) {
    if liveness.reached_files.contains(file.idx()) {
        return;
    }
    liveness.reached_files.insert(file.idx());

    let ast = &linker.asts[file.idx()];
    let meta = &linker.meta[file.idx()];

    if meta.wrap || meta.exports_kind == ExportsKind::CommonJs {
        mark_all_parts(linker, file, liveness, worklist);
        return;
    }

    mark_part(linker, file, NS_EXPORT_PART_INDEX, liveness, worklist);
    for (index, part) in ast.parts.iter().enumerate() {
        if !part.can_be_removed_if_unused || part.force_include {
            mark_part(linker, file, index as u32, liveness, worklist);
        }
    }
}

fn mark_all_parts(
    linker: &Linker<'_>,
    file: SourceIndex,
    liveness: &mut Liveness,
    worklist: &mut Vec<(SourceIndex, u32)>,
) {
    liveness.reached_files.insert(file.idx());
    for index in 0..linker.asts[file.idx()].parts.len() {
        mark_part(linker, file, index as u32, liveness, worklist);
    }
}

fn mark_part(
    linker: &Linker<'_>,
    file: SourceIndex,
    part_index: u32,
    liveness: &mut Liveness,
    worklist: &mut Vec<(SourceIndex, u32)>,
) {
    let _ = linker;
    let bits = &mut liveness.live[file.idx()];
    if bits.contains(part_index as usize) {
        return;
    }
    bits.insert(part_index as usize);
    worklist.push((file, part_index));
}

fn mark_symbol(
    linker: &Linker<'_>,
    reference: jolt_common::refs::Ref,
    liveness: &mut Liveness,
    worklist: &mut Vec<(SourceIndex, u32)>,
) {
    let canonical = linker.symbols.follow_read(reference);
    let (file, parts) = linker.declaring_parts(canonical);
    if parts.is_empty() {
        return;
    }
    mark_file(linker, file, liveness, worklist);
    for part in parts {
        mark_part(linker, file, part, liveness, worklist);
    }

    // A namespace alias reads through another binding at runtime
    if let Some(alias) = &linker.symbols.get(canonical).namespace_alias {
        mark_symbol(linker, alias.namespace_ref, liveness, worklist);
    }
}

fn mark_helper(
    linker: &Linker<'_>,
    name: &str,
    liveness: &mut Liveness,
    worklist: &mut Vec<(SourceIndex, u32)>,
) {
    if let Some(reference) = linker.runtime_helper_ref(name) {
        mark_symbol(linker, reference, liveness, worklist);
    }
}
