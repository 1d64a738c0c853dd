use jolt_common::logger::Log;
use jolt_common::options::LoaderKind;
use jolt_common::refs::SourceIndex;
use jolt_parser::ast::*;
use jolt_parser::parts::Ast;
use jolt_parser::{ParseOptions, parse};

fn parse_ts(source: &str) -> Ast {
    let log = Log::default();
    let options = ParseOptions {
        loader: LoaderKind::Ts,
        ..ParseOptions::default()
    };
    let ast = parse(source, "/test.ts", SourceIndex(1), options, &log);
    let diagnostics = log.take();
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics: {diagnostics:?}"
    );
    ast
}

fn all_stmts(ast: &Ast) -> Vec<&SData> {
    ast.parts
        .iter()
        .flat_map(|part| part.stmts.iter().map(|stmt| &stmt.data))
        .collect()
}

#[test]
fn type_annotations_are_erased() {
    let ast = parse_ts(
        "let x: number = 1;
         function f(a: string, b?: Array<Map<string, number>>): void {}
         const g: (x: number) => string = f as any;",
    );
    // Everything parses to plain JavaScript shapes
    assert!(all_stmts(&ast).len() >= 3);
}

#[test]
fn interfaces_and_type_aliases_vanish() {
    let ast = parse_ts(
        "interface Point { x: number; y: number }
         type Alias = Point | null;
         let live = 1;",
    );
    let stmts = all_stmts(&ast);
    assert_eq!(stmts.len(), 1);
    assert!(matches!(stmts[0], SData::Local(_)));
}

#[test]
fn declare_statements_vanish() {
    let ast = parse_ts(
        "declare const env: string;
         declare function helper(): void;
         declare module 'pkg' { const x: number }
         let live = 1;",
    );
    assert_eq!(all_stmts(&ast).len(), 1);
}

#[test]
fn function_overloads_are_erased() {
    let ast = parse_ts(
        "function pick(value: string): string;
         function pick(value: number): number;
         function pick(value: any): any { return value; }",
    );
    let stmts = all_stmts(&ast);
    assert_eq!(stmts.len(), 1);
    assert!(matches!(stmts[0], SData::Function(_)));
}

#[test]
fn enums_lower_to_initializer_closures() {
    let ast = parse_ts("enum Direction { Up, Down = 5, Left, Name = 'n' }");
    let stmts = all_stmts(&ast);
    // `var Direction;` plus the closure call
    assert_eq!(stmts.len(), 2);
    assert!(matches!(stmts[0], SData::Local(local) if local.kind == LocalKind::Var));
    let SData::Expr(expr) = stmts[1] else {
        panic!("expected the closure call");
    };
    let EData::Call(call) = &expr.data else {
        panic!("expected a call");
    };
    let EData::Function(func) = &call.target.data else {
        panic!("expected a function expression");
    };
    // Up, Down and Left get reverse mappings; Name is string-only
    assert_eq!(func.body.len(), 4);
    // `Direction || (Direction = {})` merge argument
    assert!(matches!(
        &call.args[0].data,
        EData::Binary(binary) if binary.op == BinOp::LogicalOr
    ));
}

#[test]
fn enum_auto_increment_continues_after_explicit_values() {
    let ast = parse_ts("enum E { A, B = 10, C }");
    let stmts = all_stmts(&ast);
    let SData::Expr(expr) = stmts[1] else {
        panic!("expected closure");
    };
    let EData::Call(call) = &expr.data else {
        panic!("expected call");
    };
    let EData::Function(func) = &call.target.data else {
        panic!("expected function");
    };
    // Extract the assigned numbers in order: E[E["A"] = 0] = "A", ...
    let mut values = Vec::new();
    for stmt in &func.body {
        let SData::Expr(expr) = &stmt.data else { continue };
        let EData::Binary(outer) = &expr.data else { continue };
        let EData::Index(index) = &outer.left.data else { continue };
        let EData::Binary(inner) = &index.index.data else { continue };
        if let EData::Number(value) = inner.right.data {
            values.push(value);
        }
    }
    assert_eq!(values, vec![0.0, 10.0, 11.0]);
}

#[test]
fn namespaces_lower_and_copy_exports() {
    let ast = parse_ts("namespace Utils { export function helper() {} }");
    let stmts = all_stmts(&ast);
    assert_eq!(stmts.len(), 2);
    let SData::Expr(expr) = stmts[1] else {
        panic!("expected closure call");
    };
    let EData::Call(call) = &expr.data else {
        panic!("expected a call");
    };
    let EData::Function(func) = &call.target.data else {
        panic!("expected a function");
    };
    // function declaration + `Utils.helper = helper`
    assert_eq!(func.body.len(), 2);
    let SData::Expr(copy) = &func.body[1].data else {
        panic!("expected the export copy");
    };
    assert!(matches!(
        &copy.data,
        EData::Binary(binary) if binary.op == BinOp::Assign
    ));
}

#[test]
fn parameter_properties_expand_to_assignments() {
    let ast = parse_ts("class Box { constructor(public width: number, height: number) {} }");
    let class = ast
        .parts
        .iter()
        .find_map(|part| {
            part.stmts.iter().find_map(|stmt| match &stmt.data {
                SData::Class(data) => Some(&data.class),
                _ => None,
            })
        })
        .expect("class");
    let ClassMember::Method(ctor) = &class.members[0] else {
        panic!("expected constructor");
    };
    // `this.width = width` was inserted; plain `height` was not
    assert_eq!(ctor.func.body.len(), 1);
    let SData::Expr(expr) = &ctor.func.body[0].data else {
        panic!("expected assignment");
    };
    let EData::Binary(assign) = &expr.data else {
        panic!("expected assignment");
    };
    let EData::Dot(dot) = &assign.left.data else {
        panic!("expected this.width");
    };
    assert_eq!(dot.name, "width");
    assert!(matches!(dot.target.data, EData::This));
}

#[test]
fn type_only_imports_are_dropped() {
    let ast = parse_ts("import type { Config } from './config'; let x = 1;");
    assert!(ast.import_records.iter().all(|record| record.is_unused
        || record.specifier != "./config"));
    assert!(ast.named_imports.is_empty());
}

#[test]
fn unused_value_imports_are_dropped_in_typescript() {
    let ast = parse_ts("import { OnlyAType } from './types'; let x = 1;");
    // The import existed for types only; the record goes unused
    assert!(ast.import_records[0].is_unused);
    assert!(ast.named_imports.is_empty());
}

#[test]
fn used_imports_survive() {
    let ast = parse_ts("import { value } from './values'; use(value);");
    assert!(!ast.import_records[0].is_unused);
    assert_eq!(ast.named_imports.len(), 1);
}

#[test]
fn partially_used_imports_keep_used_items() {
    let ast = parse_ts("import { used, Unused } from './mixed'; use(used);");
    assert!(!ast.import_records[0].is_unused);
    let aliases: Vec<&str> = ast
        .named_imports
        .values()
        .map(|import| import.alias.as_str())
        .collect();
    assert_eq!(aliases, vec!["used"]);
}

#[test]
fn type_assertions_erase() {
    let ast = parse_ts("let x = value as number; let y = <string>other;");
    assert!(all_stmts(&ast).len() >= 2);
}

#[test]
fn non_null_assertions_erase() {
    parse_ts("let x = maybe!.field!;");
}

#[test]
fn generic_calls_parse() {
    parse_ts(
        "let a = new Map<string, Array<number>>();
         function identity<T extends object = {}>(value: T): T { return value; }",
    );
}

#[test]
fn abstract_members_are_erased() {
    let ast = parse_ts(
        "abstract class Shape {
            abstract area(): number;
            describe() { return 'shape'; }
         }",
    );
    let class = ast
        .parts
        .iter()
        .find_map(|part| {
            part.stmts.iter().find_map(|stmt| match &stmt.data {
                SData::Class(data) => Some(&data.class),
                _ => None,
            })
        })
        .expect("class");
    assert_eq!(class.members.len(), 1);
}
