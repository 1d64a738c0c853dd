use super::*;
use jolt_common::logger::Log;

fn lex_all(source: &str) -> Vec<Token> {
    let log = Log::default();
    let mut lexer = Lexer::new(source, "test.js", &log, false);
    let mut tokens = Vec::new();
    while lexer.token != Token::EndOfFile && lexer.token != Token::SyntaxError {
        tokens.push(lexer.token);
        lexer.next();
    }
    assert!(!log.has_errors(), "unexpected lex error in {source:?}");
    tokens
}

#[test]
fn punctuation_maximal_munch() {
    assert_eq!(
        lex_all("a >>>= b"),
        vec![
            Token::Identifier,
            Token::GreaterThanGreaterThanGreaterThanEquals,
            Token::Identifier
        ]
    );
    assert_eq!(
        lex_all("a ??= b ?? c"),
        vec![
            Token::Identifier,
            Token::QuestionQuestionEquals,
            Token::Identifier,
            Token::QuestionQuestion,
            Token::Identifier
        ]
    );
}

#[test]
fn optional_chain_is_not_lexed_before_a_digit() {
    // `a?.5:b` must parse as a conditional expression
    assert_eq!(
        lex_all("a?.5:b"),
        vec![
            Token::Identifier,
            Token::Question,
            Token::NumericLiteral,
            Token::Colon,
            Token::Identifier
        ]
    );
    assert_eq!(lex_all("a?.b"), vec![Token::Identifier, Token::QuestionDot, Token::Identifier]);
}

#[test]
fn keywords_and_contextual_names() {
    let log = Log::default();
    let mut lexer = Lexer::new("let of = typeof x", "test.js", &log, false);
    assert!(lexer.is_contextual("let"));
    lexer.next();
    assert!(lexer.is_contextual("of"));
    lexer.next();
    assert_eq!(lexer.token, Token::Equals);
    lexer.next();
    assert_eq!(lexer.token, Token::TypeOf);
}

#[test]
fn numbers_cook_to_f64() {
    let log = Log::default();
    let cases = [
        ("123", 123.0),
        ("1.5", 1.5),
        (".5", 0.5),
        ("1.", 1.0),
        ("1e3", 1000.0),
        ("1E-2", 0.01),
        ("0xff", 255.0),
        ("0b101", 5.0),
        ("0o17", 15.0),
        ("1_000_000", 1_000_000.0),
    ];
    for (source, expected) in cases {
        let lexer = Lexer::new(source, "test.js", &log, false);
        assert_eq!(lexer.token, Token::NumericLiteral, "{source}");
        assert_eq!(lexer.number, expected, "{source}");
    }
}

#[test]
fn legacy_octal_is_recorded_not_rejected() {
    let log = Log::default();
    let lexer = Lexer::new("0123", "test.js", &log, false);
    assert_eq!(lexer.token, Token::NumericLiteral);
    assert_eq!(lexer.number, 83.0);
    assert!(lexer.legacy_octal.is_some());
    assert!(!log.has_errors());
}

#[test]
fn bigint_literals_keep_their_digits() {
    let log = Log::default();
    let lexer = Lexer::new("123n", "test.js", &log, false);
    assert_eq!(lexer.token, Token::BigIntLiteral);
    assert_eq!(lexer.bigint, "123");
}

#[test]
fn identifier_cannot_follow_number() {
    let log = Log::default();
    let lexer = Lexer::new("3x", "test.js", &log, false);
    assert_eq!(lexer.token, Token::SyntaxError);
    assert!(log.has_errors());
}

#[test]
fn string_escapes_cook() {
    let log = Log::default();
    let lexer = Lexer::new(r#""a\n\t\x41B\u{43}""#, "test.js", &log, false);
    assert_eq!(lexer.token, Token::StringLiteral);
    assert_eq!(lexer.string_value, "a\n\tABC");
}

#[test]
fn surrogate_pair_escapes_combine() {
    let log = Log::default();
    let lexer = Lexer::new(r#""\uD83D\uDE00""#, "test.js", &log, false);
    assert_eq!(lexer.string_value, "😀");
}

#[test]
fn template_parts_rescan_after_close_brace() {
    let log = Log::default();
    let mut lexer = Lexer::new("`a${x}b${y}c`", "test.js", &log, false);
    assert_eq!(lexer.token, Token::TemplateHead);
    assert_eq!(lexer.string_value, "a");
    lexer.next();
    assert_eq!(lexer.token, Token::Identifier);
    lexer.next();
    assert_eq!(lexer.token, Token::CloseBrace);
    assert_eq!(lexer.rescan_template_part(), Token::TemplateMiddle);
    assert_eq!(lexer.string_value, "b");
    lexer.next();
    lexer.next();
    assert_eq!(lexer.rescan_template_part(), Token::TemplateTail);
    assert_eq!(lexer.string_value, "c");
}

#[test]
fn slash_rescans_as_regex_in_expression_context() {
    let log = Log::default();
    let mut lexer = Lexer::new("/foo\\/[/]/gi", "test.js", &log, false);
    assert_eq!(lexer.token, Token::Slash);
    assert_eq!(lexer.rescan_regex(), Token::RegExpLiteral);
    assert_eq!(lexer.raw(), "/foo\\/[/]/gi");
}

#[test]
fn duplicate_regex_flags_are_errors() {
    let log = Log::default();
    let mut lexer = Lexer::new("/x/gg", "test.js", &log, false);
    lexer.rescan_regex();
    assert!(log.has_errors());
}

#[test]
fn newline_tracking_for_asi() {
    let log = Log::default();
    let mut lexer = Lexer::new("a\nb c", "test.js", &log, false);
    assert!(!lexer.has_newline_before);
    lexer.next();
    assert!(lexer.has_newline_before);
    lexer.next();
    assert!(!lexer.has_newline_before);
}

#[test]
fn comments_are_trivia() {
    assert_eq!(
        lex_all("a // line\n/* block\nspanning */ b"),
        vec![Token::Identifier, Token::Identifier]
    );
}

#[test]
fn hashbang_is_skipped() {
    assert_eq!(lex_all("#!/usr/bin/env node\nlet"), vec![Token::Identifier]);
}

#[test]
fn private_identifiers() {
    let log = Log::default();
    let lexer = Lexer::new("#field", "test.js", &log, false);
    assert_eq!(lexer.token, Token::PrivateIdentifier);
    assert_eq!(lexer.identifier, "#field");
}

#[test]
fn escaped_keyword_is_an_identifier() {
    let log = Log::default();
    let lexer = Lexer::new(r"\u0069f", "test.js", &log, false);
    assert_eq!(lexer.token, Token::Identifier);
    assert_eq!(lexer.identifier, "if");
}

#[test]
fn snapshot_restores_every_field() {
    let log = Log::default();
    let mut lexer = Lexer::new("let x = `a${1}b` + 0o17", "test.js", &log, false);
    lexer.next();
    lexer.next();
    let snapshot = lexer.snapshot();
    let (token, start, end, ident) = (
        lexer.token,
        lexer.token_start,
        lexer.token_end,
        lexer.identifier.clone(),
    );

    // Drain the rest of the file, then rewind
    while lexer.token != Token::EndOfFile {
        lexer.next();
    }
    lexer.restore(snapshot);

    assert_eq!(lexer.token, token);
    assert_eq!(lexer.token_start, start);
    assert_eq!(lexer.token_end, end);
    assert_eq!(lexer.identifier, ident);

    // Scanning must continue identically after the rewind
    lexer.next();
    assert_eq!(lexer.token, Token::TemplateHead);
    assert_eq!(lexer.string_value, "a");
}

#[test]
fn jsx_child_scanning_decodes_entities() {
    let log = Log::default();
    let mut lexer = Lexer::new("<a>x &amp; y</a>", "test.jsx", &log, false);
    assert_eq!(lexer.token, Token::LessThan);
    lexer.next(); // 'a'
    lexer.next(); // '>'
    assert_eq!(lexer.token, Token::GreaterThan);
    lexer.next_jsx_child_token();
    assert_eq!(lexer.token, Token::JsxText);
    assert_eq!(lexer.string_value, "x & y");
    lexer.next_jsx_child_token();
    assert_eq!(lexer.token, Token::LessThan);
}

#[test]
fn jsx_identifiers_may_contain_dashes() {
    let log = Log::default();
    let mut lexer = Lexer::new("data-value", "test.jsx", &log, false);
    lexer.continue_jsx_identifier();
    assert_eq!(lexer.identifier, "data-value");
    lexer.next();
    assert_eq!(lexer.token, Token::EndOfFile);
}

#[test]
fn numeric_entities_decode() {
    assert_eq!(decode_jsx_entities("&#65;&#x42;"), "AB");
    assert_eq!(decode_jsx_entities("a & b"), "a & b");
    assert_eq!(decode_jsx_entities("&unknown;"), "&unknown;");
}
