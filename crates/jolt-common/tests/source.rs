use super::*;

#[test]
fn line_map_positions() {
    let text = "let a = 1;\nlet b = 2;\r\nlet c = 3;";
    let map = LineMap::new(text);
    assert_eq!(map.line_count(), 3);

    let pos = map.position(text, 0);
    assert_eq!((pos.line, pos.column), (0, 0));

    // start of the second line
    let pos = map.position(text, 11);
    assert_eq!((pos.line, pos.column), (1, 0));

    // `b` on the second line
    let pos = map.position(text, 15);
    assert_eq!((pos.line, pos.column), (1, 4));

    // after the \r\n terminator
    let pos = map.position(text, 23);
    assert_eq!((pos.line, pos.column), (2, 0));
}

#[test]
fn line_text_strips_terminator() {
    let text = "first\nsecond\nthird";
    let map = LineMap::new(text);
    assert_eq!(map.line_text(text, 7), "second");
    assert_eq!(map.line_text(text, 0), "first");
    assert_eq!(map.line_text(text, 14), "third");
}

#[test]
fn columns_count_utf16_units() {
    // '𐍈' is one astral character = 2 UTF-16 units, 4 UTF-8 bytes
    let text = "𐍈x";
    let map = LineMap::new(text);
    let pos = map.position(text, 4);
    assert_eq!(pos.column, 2);
}
