use jolt_common::logger::Log;
use jolt_common::options::LoaderKind;
use jolt_common::refs::SourceIndex;
use jolt_parser::ast::*;
use jolt_parser::parts::{Ast, ImportKind};
use jolt_parser::symbols::SymbolKind;
use jolt_parser::{ParseOptions, parse};

fn parse_with(source: &str, loader: LoaderKind) -> (Ast, Log) {
    let log = Log::default();
    let options = ParseOptions {
        loader,
        ..ParseOptions::default()
    };
    let ast = parse(source, "/test.js", SourceIndex(1), options, &log);
    (ast, log)
}

fn parse_js(source: &str) -> Ast {
    let (ast, log) = parse_with(source, LoaderKind::Js);
    let diagnostics = log.take();
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics: {diagnostics:?}"
    );
    ast
}

/// Part 0 is reserved; real statements start at part 1.
fn stmt_of<'a>(ast: &'a Ast, part: usize) -> &'a SData {
    &ast.parts[part].stmts[0].data
}

#[test]
fn part_zero_is_reserved_for_export_getters() {
    let ast = parse_js("let x = 1;");
    assert!(ast.parts[0].stmts.is_empty());
    assert_eq!(ast.parts.len(), 2);
}

#[test]
fn each_top_level_statement_is_its_own_part() {
    let ast = parse_js("let a = 1; let b = 2; console.log(a + b);");
    // reserved + three statements
    assert_eq!(ast.parts.len(), 4);
    assert!(ast.parts[1].can_be_removed_if_unused);
    assert!(ast.parts[2].can_be_removed_if_unused);
    // A call has side effects
    assert!(!ast.parts[3].can_be_removed_if_unused);
}

#[test]
fn identifier_references_resolve_to_declarations() {
    let ast = parse_js("let value = 1; use(value);");
    let declared = ast.parts[1].declared_symbols[0];
    // The call part uses the declared symbol
    assert!(ast.parts[2].symbol_uses.contains_key(&declared));
}

#[test]
fn unbound_identifiers_get_unbound_symbols() {
    let ast = parse_js("console.log(1);");
    let uses = &ast.parts[1].symbol_uses;
    assert_eq!(uses.len(), 1);
    let (&reference, _) = uses.iter().next().unwrap();
    let symbol = &ast.symbols[reference.inner.idx()];
    assert_eq!(symbol.kind, SymbolKind::Unbound);
    assert_eq!(symbol.original_name, "console");
    assert!(symbol.must_not_be_renamed);
}

#[test]
fn var_hoists_out_of_blocks() {
    let ast = parse_js("{ var hoisted = 1; } hoisted;");
    // The use in the second part resolves to the declaration
    let declared = ast.parts[1].declared_symbols[0];
    assert!(ast.parts[2].symbol_uses.contains_key(&declared));
}

#[test]
fn let_does_not_escape_blocks() {
    let ast = parse_js("{ let scoped = 1; } scoped;");
    // The second statement's `scoped` must be a different, unbound symbol
    let (&reference, _) = ast.parts[2].symbol_uses.iter().next().unwrap();
    assert_eq!(ast.symbols[reference.inner.idx()].kind, SymbolKind::Unbound);
}

#[test]
fn duplicate_let_is_an_error() {
    let (_ast, log) = parse_with("let x = 1; let x = 2;", LoaderKind::Js);
    assert!(log.has_errors());
}

#[test]
fn var_redeclaration_is_allowed() {
    let ast = parse_js("var x = 1; var x = 2;");
    let first = ast.parts[1].declared_symbols[0];
    let second = ast.parts[2].declared_symbols[0];
    // Both declarations share one symbol through the link chain
    let resolved = if ast.symbols[second.inner.idx()].link.is_some() {
        ast.symbols[second.inner.idx()].link
    } else {
        second
    };
    assert_eq!(first, resolved);
}

#[test]
fn var_in_catch_body_merges_with_catch_binding() {
    let ast = parse_js("try {} catch (err) { var err; } ");
    // No duplicate-declaration error, and the inner var linked up
    let linked = ast
        .symbols
        .iter()
        .filter(|symbol| symbol.original_name == "err" && symbol.link.is_some())
        .count();
    assert_eq!(linked, 1);
}

#[test]
fn import_statement_creates_record_and_bindings() {
    let ast = parse_js("import {fn as local, other} from './foo';");
    assert_eq!(ast.import_records.len(), 1);
    assert_eq!(ast.import_records[0].specifier, "./foo");
    assert_eq!(ast.import_records[0].kind, ImportKind::Stmt);

    let aliases: Vec<&str> = ast
        .named_imports
        .values()
        .map(|import| import.alias.as_str())
        .collect();
    assert!(aliases.contains(&"fn"));
    assert!(aliases.contains(&"other"));
}

#[test]
fn import_bindings_have_import_kind() {
    let ast = parse_js("import def from './foo'; def();");
    let (&reference, _) = ast
        .named_imports
        .iter()
        .find(|(_, import)| import.alias == "default")
        .unwrap();
    assert_eq!(ast.symbols[reference.inner.idx()].kind, SymbolKind::Import);
}

#[test]
fn exports_are_collected() {
    let ast = parse_js(
        "export const a = 1; export function b() {} export default 3; export {a as c};",
    );
    let names: Vec<&str> = ast.named_exports.keys().map(String::as_str).collect();
    assert!(names.contains(&"a"));
    assert!(names.contains(&"b"));
    assert!(names.contains(&"default"));
    assert!(names.contains(&"c"));
}

#[test]
fn export_star_records_are_tracked() {
    let ast = parse_js("export * from './other';");
    assert_eq!(ast.export_star_records.len(), 1);
    let record = &ast.import_records[ast.export_star_records[0] as usize];
    assert!(record.is_export_star);
}

#[test]
fn require_calls_become_dependency_edges() {
    let ast = parse_js("const fs = require('./util');");
    assert_eq!(ast.import_records.len(), 1);
    assert_eq!(ast.import_records[0].kind, ImportKind::Require);
    let SData::Local(local) = stmt_of(&ast, 1) else {
        panic!("expected a declaration");
    };
    let value = local.decls[0].value.as_ref().unwrap();
    assert!(matches!(value.data, EData::RequireCall(_)));
}

#[test]
fn dynamic_import_creates_record() {
    let ast = parse_js("import('./lazy');");
    assert_eq!(ast.import_records.len(), 1);
    assert_eq!(ast.import_records[0].kind, ImportKind::Dynamic);
}

#[test]
fn commonjs_markers_are_detected() {
    let ast = parse_js("exports.x = 1;");
    assert!(ast.uses_exports_ref);
    let ast = parse_js("module.exports = {};");
    assert!(ast.uses_module_ref);
    let ast = parse_js("let x = 1;");
    assert!(!ast.uses_exports_ref);
    assert!(!ast.uses_module_ref);
}

#[test]
fn top_level_return_is_flagged() {
    let ast = parse_js("return;");
    assert!(ast.has_top_level_return);
}

#[test]
fn esm_syntax_is_flagged() {
    let ast = parse_js("export {};");
    assert!(ast.has_es_module_syntax);
    let ast = parse_js("let x = 1;");
    assert!(!ast.has_es_module_syntax);
}

#[test]
fn asi_return_warns() {
    let (_ast, log) = parse_with("function f() { return\n1; }", LoaderKind::Js);
    let warnings = log.take();
    assert!(warnings.iter().any(|d| d.text.contains("not returned")));
}

#[test]
fn arrow_and_paren_disambiguation() {
    // All of these must parse without errors
    for source in [
        "let f = (a, b) => a + b;",
        "let x = (1 + 2) * 3;",
        "let g = (a = 1, {b, c} = {}) => a + b + c;",
        "let h = () => ({});",
        "let i = async (x) => x;",
        "let call = async(1);",
        "let j = x => x * 2;",
        "let pair = (first(), second());",
    ] {
        parse_js(source);
    }
}

#[test]
fn labels_resolve_to_label_symbols() {
    let ast = parse_js("outer: for (;;) { break outer; }");
    let label = ast
        .symbols
        .iter()
        .find(|symbol| symbol.kind == SymbolKind::Label)
        .expect("label symbol");
    assert_eq!(label.original_name, "outer");
    assert!(label.use_count_estimate >= 1);
}

#[test]
fn unknown_label_is_an_error() {
    let (_ast, log) = parse_with("for (;;) { break missing; }", LoaderKind::Js);
    assert!(log.has_errors());
}

#[test]
fn syntax_error_recovery_reports_multiple_errors() {
    let (_ast, log) = parse_with("let x = ;\nconst y = ;", LoaderKind::Js);
    let errors = log.take();
    assert!(errors.len() >= 2, "expected two errors, got {errors:?}");
}

#[test]
fn strict_mode_rejects_legacy_octals() {
    let (_ast, log) = parse_with("'use strict'; let x = 0123;", LoaderKind::Js);
    assert!(log.has_errors());
}

#[test]
fn esm_is_strict_for_late_octals() {
    let (_ast, log) = parse_with("let x = 0123; export {};", LoaderKind::Js);
    assert!(log.has_errors());
}

#[test]
fn sloppy_mode_accepts_legacy_octals() {
    let (_ast, log) = parse_with("let x = 0123;", LoaderKind::Js);
    assert!(!log.has_errors());
}

#[test]
fn char_freq_counts_source_characters() {
    let ast = parse_js("zzz + zzz;");
    let alphabet = ast.char_freq.compile();
    assert_eq!(alphabet.head[0], b'z');
}

#[test]
fn classes_parse_with_members() {
    let ast = parse_js(
        "class Widget extends Base {
            static count = 0;
            #secret = 1;
            constructor(x) { super(x); }
            get value() { return this.#secret; }
            static {}
        }",
    );
    let SData::Class(class) = stmt_of(&ast, 1) else {
        panic!("expected a class");
    };
    assert!(class.class.extends.is_some());
    assert!(class.class.members.len() >= 4);
    // The private field got a private-name symbol
    assert!(
        ast.symbols
            .iter()
            .any(|symbol| symbol.kind == SymbolKind::PrivateField)
    );
}

#[test]
fn generators_and_async_parse() {
    parse_js("async function a() { await b(); } function* g() { yield 1; yield* h(); }");
}

#[test]
fn for_variants_parse() {
    parse_js(
        "for (let i = 0; i < 10; i++) {}
         for (const key in object) {}
         for (const item of list) {}
         for await (const chunk of stream()) {}",
    );
}

#[test]
fn optional_chain_positions_are_recorded() {
    let ast = parse_js("a?.b.c;");
    let SData::Expr(expr) = stmt_of(&ast, 1) else {
        panic!("expected an expression");
    };
    // Outermost link is the `.c` continuation
    let EData::Dot(dot) = &expr.data else {
        panic!("expected a dot");
    };
    assert_eq!(dot.optional_chain, OptionalChain::Continue);
    let EData::Dot(inner) = &dot.target.data else {
        panic!("expected an inner dot");
    };
    assert_eq!(inner.optional_chain, OptionalChain::Start);
}
