use indexmap::IndexMap;
use jolt_common::logger::Log;
use jolt_common::options::LoaderKind;
use jolt_common::refs::SourceIndex;
use jolt_parser::ast::*;
use jolt_parser::parts::Ast;
use jolt_parser::{ParseOptions, parse};

fn parse_js(source: &str) -> Ast {
    let log = Log::default();
    let options = ParseOptions {
        loader: LoaderKind::Js,
        ..ParseOptions::default()
    };
    parse(source, "/test.js", SourceIndex(1), options, &log)
}

fn parse_expr_data(source: &str) -> EData {
    let ast = parse_js(&format!("keep({source});"));
    let SData::Expr(expr) = &ast.parts[1].stmts[0].data else {
        panic!("expected an expression statement");
    };
    let EData::Call(call) = &expr.data else {
        panic!("expected the keep() wrapper");
    };
    call.args[0].data.clone()
}

fn assert_number(source: &str, expected: f64) {
    match parse_expr_data(source) {
        EData::Number(value) if value.is_nan() && expected.is_nan() => {}
        EData::Number(value) => assert_eq!(value, expected, "{source}"),
        other => panic!("{source} folded to {other:?}"),
    }
}

fn assert_boolean(source: &str, expected: bool) {
    match parse_expr_data(source) {
        EData::Boolean(value) => assert_eq!(value, expected, "{source}"),
        other => panic!("{source} folded to {other:?}"),
    }
}

fn assert_string(source: &str, expected: &str) {
    match parse_expr_data(source) {
        EData::String(value) => assert_eq!(value.value, expected, "{source}"),
        other => panic!("{source} folded to {other:?}"),
    }
}

#[test]
fn arithmetic_folds() {
    assert_number("1 + 2", 3.0);
    assert_number("10 - 4", 6.0);
    assert_number("6 * 7", 42.0);
    assert_number("1 / 2", 0.5);
    assert_number("7 % 3", 1.0);
    assert_number("2 ** 10", 1024.0);
    assert_number("1 / 0", f64::INFINITY);
    assert_number("0 / 0", f64::NAN);
}

#[test]
fn bitwise_uses_to_int32() {
    assert_number("0xffffffff | 0", -1.0);
    assert_number("2147483648 | 0", -2147483648.0);
    assert_number("5 & 3", 1.0);
    assert_number("5 ^ 3", 6.0);
    assert_number("~0", -1.0);
}

#[test]
fn shift_counts_mask_to_five_bits() {
    assert_number("1 << 32", 1.0);
    assert_number("1 << 33", 2.0);
    assert_number("256 >> 4", 16.0);
    assert_number("-1 >>> 0", 4294967295.0);
}

#[test]
fn comparisons_fold() {
    assert_boolean("1 < 2", true);
    assert_boolean("2 <= 1", false);
    assert_boolean("3 > 2", true);
    assert_boolean("1 === 1", true);
    assert_boolean("1 !== 1", false);
    assert_boolean("'a' === 'a'", true);
    assert_boolean("'a' === 'b'", false);
    assert_boolean("1 === '1'", false);
}

#[test]
fn nan_never_equals_itself() {
    assert_boolean("(0 / 0) === (0 / 0)", false);
    assert_boolean("(0 / 0) !== (0 / 0)", true);
}

#[test]
fn null_and_undefined_equality() {
    assert_boolean("null == undefined", true);
    assert_boolean("null === undefined", false);
    assert_boolean("null == 0", false);
    assert_boolean("undefined == ''", false);
}

#[test]
fn boolean_not_folds_truthiness() {
    assert_boolean("!0", true);
    assert_boolean("!1", false);
    assert_boolean("!''", true);
    assert_boolean("!'x'", false);
    assert_boolean("!!{}", true);
    assert_boolean("![]", false);
}

#[test]
fn typeof_on_literals_folds() {
    assert_string("typeof 1", "number");
    assert_string("typeof 'x'", "string");
    assert_string("typeof true", "boolean");
    assert_string("typeof undefined", "undefined");
    assert_string("typeof null", "object");
    assert_string("typeof function(){}", "function");
}

#[test]
fn string_concatenation_folds() {
    assert_string("'a' + 'b'", "ab");
    assert_string("'n = ' + 42", "n = 42");
    assert_string("1 + '2'", "12");
}

#[test]
fn template_literals_fold_with_primitive_parts() {
    assert_string("`a${'b'}c`", "abc");
    assert_string("`n = ${1 + 2}`", "n = 3");
    assert_string("`${null} and ${undefined}`", "null and undefined");
}

#[test]
fn short_circuit_with_known_left() {
    assert_number("true && 3", 3.0);
    assert_boolean("false && anything", false);
    assert_number("false || 4", 4.0);
    assert_boolean("true || anything", true);
    assert_number("null ?? 7", 7.0);
    assert_number("0 ?? 7", 0.0);
}

#[test]
fn folding_is_idempotent() {
    // A fully folded expression re-parses and folds to the same value
    assert_number("1 + 2 + 3 + 4", 10.0);
    assert_number("10", 10.0);
}

#[test]
fn negative_zero_comparison_warns() {
    let log = Log::default();
    let options = ParseOptions {
        loader: LoaderKind::Js,
        ..ParseOptions::default()
    };
    parse("x === -0;", "/test.js", SourceIndex(1), options, &log);
    let warnings = log.take();
    assert!(warnings.iter().any(|d| d.text.contains("-0")));
}

#[test]
fn define_substitution_rewrites_paths() {
    let log = Log::default();
    let mut define = IndexMap::new();
    define.insert(
        "process.env.NODE_ENV".to_string(),
        "\"production\"".to_string(),
    );
    let options = ParseOptions {
        loader: LoaderKind::Js,
        define,
        ..ParseOptions::default()
    };
    let ast = parse(
        "keep(process.env.NODE_ENV === 'production');",
        "/test.js",
        SourceIndex(1),
        options,
        &log,
    );
    let SData::Expr(expr) = &ast.parts[1].stmts[0].data else {
        panic!("expected an expression");
    };
    let EData::Call(call) = &expr.data else {
        panic!("expected the keep() wrapper");
    };
    assert!(matches!(call.args[0].data, EData::Boolean(true)));
}

#[test]
fn dead_branch_requires_are_not_recorded() {
    let log = Log::default();
    let mut define = IndexMap::new();
    define.insert("DEBUG".to_string(), "false".to_string());
    let options = ParseOptions {
        loader: LoaderKind::Js,
        define,
        ..ParseOptions::default()
    };
    let ast = parse(
        "if (DEBUG) require('./debug'); else require('./release');",
        "/test.js",
        SourceIndex(1),
        options,
        &log,
    );
    assert_eq!(ast.import_records.len(), 1);
    assert_eq!(ast.import_records[0].specifier, "./release");
}

#[test]
fn dead_branches_keep_hoisted_declarations() {
    let log = Log::default();
    let mut define = IndexMap::new();
    define.insert("DEBUG".to_string(), "false".to_string());
    let options = ParseOptions {
        loader: LoaderKind::Js,
        define,
        ..ParseOptions::default()
    };
    let ast = parse(
        "if (DEBUG) { var kept = 1; function alive() {} } use(kept, alive);",
        "/test.js",
        SourceIndex(1),
        options,
        &log,
    );
    // The hoisted names survive as plain declarations
    let SData::Local(local) = &ast.parts[1].stmts[0].data else {
        panic!("expected hoisted var declarations, got {:?}", ast.parts[1].stmts);
    };
    assert_eq!(local.kind, LocalKind::Var);
    assert_eq!(local.decls.len(), 2);
    assert!(local.decls.iter().all(|decl| decl.value.is_none()));
}

#[test]
fn known_conditional_test_selects_branch() {
    assert_number("true ? 1 : 2", 1.0);
    assert_number("false ? 1 : 2", 2.0);
    assert_number("'x' ? 3 : 4", 3.0);
}
