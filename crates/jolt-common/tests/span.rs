use super::*;

#[test]
fn merge_covers_both_spans() {
    let a = Span::new(4, 10);
    let b = Span::new(2, 6);
    assert_eq!(a.merge(b), Span::new(2, 10));
    assert_eq!(b.merge(a), Span::new(2, 10));
}

#[test]
fn contains_is_half_open() {
    let span = Span::new(3, 5);
    assert!(!span.contains(2));
    assert!(span.contains(3));
    assert!(span.contains(4));
    assert!(!span.contains(5));
}

#[test]
fn dummy_spans_are_recognized() {
    assert!(Span::dummy().is_dummy());
    assert!(!Span::new(0, 0).is_dummy());
    assert!(Span::at(7).is_empty());
}

#[test]
fn slice_is_clamped_to_text() {
    let span = Span::new(4, 100);
    assert_eq!(span.slice("let x"), "");
    assert_eq!(Span::new(4, 5).slice("let x"), "x");
}
