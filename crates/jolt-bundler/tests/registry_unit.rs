use super::*;

#[test]
fn indices_follow_first_discovery_order() {
    let registry = SourceRegistry::new();
    let (a, new_a) = registry.intern("/a.js");
    let (b, new_b) = registry.intern("/b.js");
    let (a_again, new_again) = registry.intern("/a.js");

    assert_eq!(a, SourceIndex(0));
    assert_eq!(b, SourceIndex(1));
    assert_eq!(a_again, a);
    assert!(new_a && new_b && !new_again);
    assert_eq!(registry.len(), 2);
}

#[test]
fn concurrent_interning_allocates_unique_indices() {
    use rayon::prelude::*;

    let registry = SourceRegistry::new();
    let indices: Vec<SourceIndex> = (0..64)
        .into_par_iter()
        .map(|i| registry.intern(&format!("/file{}.js", i % 16)).0)
        .collect();

    let unique: std::collections::HashSet<u32> = indices.iter().map(|index| index.0).collect();
    assert_eq!(unique.len(), 16);
    assert_eq!(registry.len(), 16);
    assert!(unique.iter().all(|&index| index < 16));
}
