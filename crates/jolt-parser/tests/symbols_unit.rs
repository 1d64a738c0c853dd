use super::*;

use jolt_common::refs::{InnerIndex, Ref, SourceIndex};

fn map_with(counts: &[usize]) -> SymbolMap {
    let mut map = SymbolMap::with_source_count(counts.len());
    for (source, &count) in counts.iter().enumerate() {
        for inner in 0..count {
            map.outer[source].push(Symbol::new(
                SymbolKind::Other,
                format!("s{source}_{inner}"),
            ));
        }
    }
    map
}

fn r(source: u32, inner: u32) -> Ref {
    Ref::new(SourceIndex(source), InnerIndex(inner))
}

#[test]
fn follow_is_idempotent() {
    let mut map = map_with(&[3, 2]);
    map.merge(r(0, 0), r(1, 0));
    map.merge(r(0, 1), r(0, 0));

    let once = map.follow(r(0, 1));
    let twice = map.follow(once);
    assert_eq!(once, twice);
    assert_eq!(once, r(1, 0));
}

#[test]
fn follow_compresses_paths() {
    let mut map = map_with(&[4]);
    map.get_mut(r(0, 0)).link = r(0, 1);
    map.get_mut(r(0, 1)).link = r(0, 2);
    map.get_mut(r(0, 2)).link = r(0, 3);

    assert_eq!(map.follow(r(0, 0)), r(0, 3));
    // After compression every link points straight at the root
    assert_eq!(map.get(r(0, 0)).link, r(0, 3));
    assert_eq!(map.get(r(0, 1)).link, r(0, 3));
}

#[test]
fn merge_accumulates_use_counts_and_flags() {
    let mut map = map_with(&[2]);
    map.get_mut(r(0, 0)).use_count_estimate = 3;
    map.get_mut(r(0, 0)).must_not_be_renamed = true;
    map.get_mut(r(0, 1)).use_count_estimate = 4;

    let root = map.merge(r(0, 0), r(0, 1));
    assert_eq!(root, r(0, 1));
    assert_eq!(map.get(root).use_count_estimate, 7);
    assert!(map.get(root).must_not_be_renamed);
}

#[test]
fn merge_is_stable_across_files() {
    let mut map = map_with(&[1, 1, 1]);
    map.merge(r(0, 0), r(1, 0));
    map.merge(r(1, 0), r(2, 0));

    map.follow_all();
    assert_eq!(map.follow_read(r(0, 0)), r(2, 0));
    assert_eq!(map.follow_read(r(1, 0)), r(2, 0));
}

#[test]
fn name_of_follows_links() {
    let mut map = map_with(&[1, 1]);
    map.merge(r(0, 0), r(1, 0));
    map.seed_output_names();
    map.set_name(r(1, 0), "renamed".to_string());
    assert_eq!(map.name_of(r(0, 0)), "renamed");
}

#[test]
fn slot_namespaces_are_disjoint() {
    assert_eq!(
        SymbolKind::Label.slot_namespace(),
        SlotNamespace::Label
    );
    assert_eq!(
        SymbolKind::PrivateField.slot_namespace(),
        SlotNamespace::PrivateName
    );
    assert_eq!(
        SymbolKind::Hoisted.slot_namespace(),
        SlotNamespace::Default
    );
}
