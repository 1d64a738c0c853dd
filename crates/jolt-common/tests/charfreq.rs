use super::*;

#[test]
fn scan_counts_alphabet_characters_only() {
    let mut freq = CharFreq::default();
    freq.scan("ab ab!", 1);
    assert_eq!(freq.0[0], 2); // 'a'
    assert_eq!(freq.0[1], 2); // 'b'
    assert_eq!(freq.0.iter().sum::<i32>(), 4);
}

#[test]
fn negative_delta_subtracts() {
    let mut freq = CharFreq::default();
    freq.scan("abc", 2);
    freq.scan("abc", -2);
    assert_eq!(freq, CharFreq::default());
}

#[test]
fn frequent_characters_sort_first() {
    let mut freq = CharFreq::default();
    freq.scan("zzzzzz", 1);
    freq.scan("a", 1);
    let alphabet = freq.compile();
    assert_eq!(alphabet.head[0], b'z');
    assert_eq!(alphabet.head[1], b'a');
    assert_eq!(alphabet.tail[0], b'z');
}

#[test]
fn digits_never_start_a_name() {
    let mut freq = CharFreq::default();
    freq.scan("999999999", 1);
    let alphabet = freq.compile();
    assert!(!alphabet.head.contains(&b'9'));
    assert_eq!(alphabet.tail[0], b'9');
}

#[test]
fn name_enumeration_is_dense_and_unique() {
    let alphabet = NameAlphabet::default();
    let mut seen = std::collections::HashSet::new();
    for i in 0..500 {
        let name = alphabet.name_for_index(i);
        assert!(!name.is_empty());
        assert!(seen.insert(name.clone()), "duplicate name {name}");
        if i < 54 {
            assert_eq!(name.len(), 1);
        }
    }
}

#[test]
fn two_character_names_follow_single_characters() {
    let alphabet = NameAlphabet::default();
    assert_eq!(alphabet.name_for_index(0).len(), 1);
    assert_eq!(alphabet.name_for_index(53).len(), 1);
    assert_eq!(alphabet.name_for_index(54).len(), 2);
}
