//! Symbol renaming: collision-free renaming for readable output, and
//! frequency-ranked short names for minified output.
//!
//! Both renamers run after linking, once symbol links are final. They
//! operate per output chunk: the chunk's files will share one top-level
//! scope after concatenation, so their top-level symbols rename against
//! each other, while nested scopes only need to avoid what they can see.

use rustc_hash::{FxHashMap, FxHashSet};

use jolt_common::charfreq::NameAlphabet;
use jolt_common::refs::{Ref, SourceIndex};
use jolt_lexer::{RESERVED_NAMES, is_valid_identifier};
use jolt_parser::parts::Ast;
use jolt_parser::scopes::ScopeId;
use jolt_parser::symbols::{SLOT_NAMESPACE_COUNT, SlotNamespace, SymbolKind, SymbolMap};

/// Names no generated or renamed identifier may take: every keyword and
/// reserved word, plus the name of every unbound symbol anywhere in the
/// bundle (those refer to globals that must stay untouched).
pub fn collect_reserved_names(symbols: &SymbolMap) -> FxHashSet<String> {
    let mut reserved: FxHashSet<String> =
        RESERVED_NAMES.iter().map(|name| name.to_string()).collect();
    for file_symbols in &symbols.outer {
        for symbol in file_symbols {
            if symbol.kind == SymbolKind::Unbound || symbol.must_not_be_renamed {
                reserved.insert(symbol.original_name.clone());
            }
        }
    }
    reserved
}

fn is_renameable(symbols: &SymbolMap, canonical: Ref) -> bool {
    let symbol = symbols.get(canonical);
    symbol.kind != SymbolKind::Unbound
        && !symbol.must_not_be_renamed
        && symbol.namespace_alias.is_none()
}

/// Top-level refs of a file, in a deterministic order: module-scope
/// members sorted by name, then generated symbols in creation order.
fn top_level_refs(ast: &Ast) -> Vec<Ref> {
    let module_scope = &ast.scopes[0];
    let mut members: Vec<(&String, &Ref)> = module_scope.members.iter().collect();
    members.sort_by_key(|(name, _)| name.as_str());
    let mut refs: Vec<Ref> = members.into_iter().map(|(_, r)| *r).collect();
    refs.extend(module_scope.generated.iter().copied());
    refs
}

// =============================================================================
// Collision renaming (readable output)
// =============================================================================

/// Rename symbols so a chunk's merged top-level scope has no collisions:
/// keep original names where possible, append a counter otherwise. Two
/// sibling scopes may share a name; only enclosing-scope conflicts
/// force a rename.
pub fn rename_for_readability(
    symbols: &mut SymbolMap,
    files: &[(SourceIndex, &Ast)],
    reserved: &FxHashSet<String>,
) {
    let mut top_level_used: FxHashSet<String> = FxHashSet::default();
    let mut seen: FxHashSet<Ref> = FxHashSet::default();

    // The merged top-level scope: all files' module scopes together
    for (_, ast) in files {
        for reference in top_level_refs(ast) {
            let canonical = symbols.follow_read(reference);
            if !seen.insert(canonical) {
                continue;
            }
            if !is_renameable(symbols, canonical) {
                top_level_used.insert(symbols.get(canonical).original_name.clone());
                continue;
            }
            let original = symbols.get(canonical).original_name.clone();
            let name = unique_name(&original, &top_level_used, reserved);
            top_level_used.insert(name.clone());
            symbols.set_name(canonical, name);
        }
    }

    // Nested scopes per file: rename only on conflicts with what the
    // scope can see
    for (_, ast) in files {
        let mut frames: Vec<FxHashSet<String>> = vec![top_level_used.clone()];
        for &child in ast.scopes[0].children.clone().iter() {
            rename_scope(symbols, ast, child, &mut frames, reserved);
        }
    }
}

fn rename_scope(
    symbols: &mut SymbolMap,
    ast: &Ast,
    scope_id: ScopeId,
    frames: &mut Vec<FxHashSet<String>>,
    reserved: &FxHashSet<String>,
) {
    let scope = &ast.scopes[scope_id.idx()];
    let mut frame: FxHashSet<String> = FxHashSet::default();

    let mut refs: Vec<(&String, &Ref)> = scope.members.iter().collect();
    refs.sort_by_key(|(name, _)| name.as_str());
    let refs: Vec<Ref> = refs
        .into_iter()
        .map(|(_, r)| *r)
        .chain(scope.generated.iter().copied())
        .collect();

    for reference in refs {
        let canonical = symbols.follow_read(reference);
        if !is_renameable(symbols, canonical) {
            frame.insert(symbols.get(canonical).original_name.clone());
            continue;
        }
        let original = symbols.get(canonical).original_name.clone();
        let in_enclosing =
            |name: &str| frames.iter().any(|f| f.contains(name)) || frame.contains(name);
        // Private names carry their `#`; validity applies to the rest
        let bare = original.strip_prefix('#').unwrap_or(&original);
        let name = if !in_enclosing(&original)
            && is_valid_identifier(bare)
            && !reserved.contains(&original)
        {
            original.clone()
        } else {
            let mut counter = 2;
            loop {
                let candidate = format!("{original}{counter}");
                if !in_enclosing(&candidate) && !reserved.contains(&candidate) {
                    break candidate;
                }
                counter += 1;
            }
        };
        frame.insert(name.clone());
        symbols.set_name(canonical, name);
    }

    frames.push(frame);
    for &child in ast.scopes[scope_id.idx()].children.clone().iter() {
        rename_scope(symbols, ast, child, frames, reserved);
    }
    frames.pop();
}

fn unique_name(
    original: &str,
    used: &FxHashSet<String>,
    reserved: &FxHashSet<String>,
) -> String {
    if is_valid_identifier(original) && !used.contains(original) && !reserved.contains(original) {
        return original.to_string();
    }
    let base = if is_valid_identifier(original) {
        original.to_string()
    } else {
        // Names like "default" or cooked oddities need a safe stem
        let mut cleaned: String = original
            .chars()
            .map(|c| if jolt_lexer::is_identifier_continue(c) { c } else { '_' })
            .collect();
        if cleaned.is_empty()
            || !jolt_lexer::is_identifier_start(cleaned.chars().next().unwrap())
        {
            cleaned.insert(0, '_');
        }
        cleaned
    };
    let mut counter = 2;
    loop {
        let candidate = format!("{base}{counter}");
        if !used.contains(&candidate) && !reserved.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

// =============================================================================
// Frequency-ranked minified renaming
// =============================================================================

/// Assign every renameable symbol a slot, rank slots by use count, and
/// hand out names from the frequency-ordered alphabet in rank order.
///
/// Slots are per namespace — regular identifiers, labels and private
/// names never collide at runtime, so the three sequences run
/// independently. Top-level symbols get a disjoint range per file
/// (chunk concatenation merges those scopes into one); nested slots are
/// reused between sibling scopes and therefore start after every
/// top-level slot.
pub fn rename_for_size(
    symbols: &mut SymbolMap,
    files: &[(SourceIndex, &Ast)],
    reserved: &FxHashSet<String>,
    alphabet: &NameAlphabet,
) {
    let mut slot_counts: [Vec<u32>; SLOT_NAMESPACE_COUNT] = Default::default();
    let mut slot_of: FxHashMap<Ref, (SlotNamespace, u32)> = FxHashMap::default();

    let mut allocate = |slot_counts: &mut [Vec<u32>; SLOT_NAMESPACE_COUNT],
                        slot_of: &mut FxHashMap<Ref, (SlotNamespace, u32)>,
                        symbols: &SymbolMap,
                        canonical: Ref,
                        slot: Option<u32>|
     -> u32 {
        let symbol = symbols.get(canonical);
        let namespace = symbol.kind.slot_namespace();
        let counts = &mut slot_counts[namespace as usize];
        let slot = slot.unwrap_or(counts.len() as u32);
        if counts.len() <= slot as usize {
            counts.resize(slot as usize + 1, 0);
        }
        counts[slot as usize] += symbol.use_count_estimate.max(1);
        slot_of.insert(canonical, (namespace, slot));
        slot
    };

    // Top-level symbols: fresh slots per file
    for (_, ast) in files {
        for reference in top_level_refs(ast) {
            let canonical = symbols.follow_read(reference);
            if slot_of.contains_key(&canonical) || !is_renameable(symbols, canonical) {
                continue;
            }
            allocate(&mut slot_counts, &mut slot_of, symbols, canonical, None);
        }
    }
    let top_totals: [u32; SLOT_NAMESPACE_COUNT] = [
        slot_counts[0].len() as u32,
        slot_counts[1].len() as u32,
        slot_counts[2].len() as u32,
    ];

    // Nested scopes: sibling scopes restart from the same base so their
    // slots (and eventually names) coincide
    for (_, ast) in files {
        for &child in &ast.scopes[0].children {
            assign_nested_slots(
                symbols,
                ast,
                child,
                top_totals,
                &mut slot_counts,
                &mut slot_of,
            );
        }
    }

    // Rank slots by use count within each namespace
    let mut names_by_slot: [Vec<String>; SLOT_NAMESPACE_COUNT] = Default::default();
    for namespace in 0..SLOT_NAMESPACE_COUNT {
        let counts = &slot_counts[namespace];
        let mut order: Vec<u32> = (0..counts.len() as u32).collect();
        order.sort_by(|&a, &b| {
            counts[b as usize]
                .cmp(&counts[a as usize])
                .then(a.cmp(&b))
        });

        let mut names = vec![String::new(); counts.len()];
        let mut next_index = 0usize;
        for &slot in &order {
            let name = loop {
                let candidate = alphabet.name_for_index(next_index);
                next_index += 1;
                if !reserved.contains(&candidate) {
                    break candidate;
                }
            };
            names[slot as usize] = if namespace == SlotNamespace::PrivateName as usize {
                format!("#{name}")
            } else {
                name
            };
        }
        names_by_slot[namespace] = names;
    }

    for (canonical, (namespace, slot)) in slot_of {
        let name = names_by_slot[namespace as usize][slot as usize].clone();
        symbols.get_mut(canonical).slot = Some(slot);
        symbols.set_name(canonical, name);
    }
}

fn assign_nested_slots(
    symbols: &mut SymbolMap,
    ast: &Ast,
    scope_id: ScopeId,
    bases: [u32; SLOT_NAMESPACE_COUNT],
    slot_counts: &mut [Vec<u32>; SLOT_NAMESPACE_COUNT],
    slot_of: &mut FxHashMap<Ref, (SlotNamespace, u32)>,
) {
    let scope = &ast.scopes[scope_id.idx()];
    let mut next = bases;

    let mut refs: Vec<(&String, &Ref)> = scope.members.iter().collect();
    refs.sort_by_key(|(name, _)| name.as_str());
    let refs: Vec<Ref> = refs
        .into_iter()
        .map(|(_, r)| *r)
        .chain(scope.generated.iter().copied())
        .collect();

    for reference in refs {
        let canonical = symbols.follow_read(reference);
        if slot_of.contains_key(&canonical) || !is_renameable(symbols, canonical) {
            continue;
        }
        let symbol = symbols.get(canonical);
        let namespace = symbol.kind.slot_namespace();
        let slot = next[namespace as usize];
        next[namespace as usize] += 1;
        let counts = &mut slot_counts[namespace as usize];
        if counts.len() <= slot as usize {
            counts.resize(slot as usize + 1, 0);
        }
        counts[slot as usize] += symbol.use_count_estimate.max(1);
        slot_of.insert(canonical, (namespace, slot));
        symbols.get_mut(canonical).slot = Some(slot);
    }

    for &child in ast.scopes[scope_id.idx()].children.clone().iter() {
        assign_nested_slots(symbols, ast, child, next, slot_counts, slot_of);
    }
}
