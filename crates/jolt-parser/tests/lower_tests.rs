use jolt_common::logger::Log;
use jolt_common::options::{LoaderKind, Target};
use jolt_common::refs::SourceIndex;
use jolt_parser::ast::*;
use jolt_parser::parts::Ast;
use jolt_parser::{ParseOptions, parse};

fn parse_with_target(source: &str, target: Target) -> Ast {
    let log = Log::default();
    let options = ParseOptions {
        loader: LoaderKind::Js,
        target,
        ..ParseOptions::default()
    };
    let ast = parse(source, "/test.js", SourceIndex(1), options, &log);
    assert!(!log.has_errors(), "unexpected errors");
    ast
}

fn first_expr(ast: &Ast) -> &Expr {
    for part in &ast.parts {
        for stmt in &part.stmts {
            if let SData::Expr(expr) = &stmt.data {
                return expr;
            }
        }
    }
    panic!("no expression statement found");
}

#[test]
fn exponent_lowers_to_math_pow() {
    let ast = parse_with_target("x ** y;", Target::ES2015);
    let EData::Call(call) = &first_expr(&ast).data else {
        panic!("expected a call");
    };
    let EData::Dot(dot) = &call.target.data else {
        panic!("expected Math.pow");
    };
    assert_eq!(dot.name, "pow");
    assert_eq!(call.args.len(), 2);
}

#[test]
fn exponent_stays_at_es2016() {
    let ast = parse_with_target("x ** y;", Target::ES2016);
    assert!(matches!(first_expr(&ast).data, EData::Binary(_)));
}

#[test]
fn optional_chain_lowers_to_guarded_conditional() {
    let ast = parse_with_target("a?.b.c;", Target::ES2019);
    let EData::Conditional(cond) = &first_expr(&ast).data else {
        panic!("expected a conditional");
    };
    // Guard: a == null
    let EData::Binary(test) = &cond.test.data else {
        panic!("expected a binary test");
    };
    assert_eq!(test.op, BinOp::LooseEq);
    assert!(matches!(test.right.data, EData::Null));
    // Taken branch: void 0
    assert!(matches!(
        &cond.yes.data,
        EData::Unary(unary) if unary.op == UnOp::Void
    ));
    // Fallthrough: the whole plain access chain a.b.c
    let EData::Dot(outer) = &cond.no.data else {
        panic!("expected a.b.c");
    };
    assert_eq!(outer.name, "c");
    assert_eq!(outer.optional_chain, OptionalChain::None);
}

#[test]
fn optional_chain_stays_at_es2020() {
    let ast = parse_with_target("a?.b;", Target::ES2020);
    assert!(matches!(first_expr(&ast).data, EData::Dot(_)));
}

#[test]
fn nullish_coalescing_lowers_with_temporary() {
    let ast = parse_with_target("f() ?? fallback;", Target::ES2019);
    let EData::Conditional(cond) = &first_expr(&ast).data else {
        panic!("expected a conditional");
    };
    let EData::Binary(test) = &cond.test.data else {
        panic!("expected a test");
    };
    assert_eq!(test.op, BinOp::LooseNe);
    // The guard assigns the called value into a temporary
    assert!(matches!(
        &test.left.data,
        EData::Binary(assign) if assign.op == BinOp::Assign
    ));
    // A `var` declaration for the temporary was flushed into the part
    let has_temp_decl = ast.parts.iter().any(|part| {
        part.stmts.iter().any(|stmt| {
            matches!(
                &stmt.data,
                SData::Local(local)
                    if local.kind == LocalKind::Var
                        && local.decls.iter().any(|decl| decl.value.is_none())
            )
        })
    });
    assert!(has_temp_decl);
}

#[test]
fn nullish_without_side_effects_skips_temporary() {
    let ast = parse_with_target("a ?? b;", Target::ES2019);
    let EData::Conditional(cond) = &first_expr(&ast).data else {
        panic!("expected a conditional");
    };
    let EData::Binary(test) = &cond.test.data else {
        panic!("expected a test");
    };
    assert!(matches!(test.left.data, EData::Identifier(_)));
}

#[test]
fn logical_assignment_lowers() {
    let ast = parse_with_target("a ||= b;", Target::ES2020);
    let EData::Binary(binary) = &first_expr(&ast).data else {
        panic!("expected a binary");
    };
    assert_eq!(binary.op, BinOp::LogicalOr);
    assert!(matches!(
        &binary.right.data,
        EData::Binary(assign) if assign.op == BinOp::Assign
    ));
}

#[test]
fn logical_assignment_stays_at_es2021() {
    let ast = parse_with_target("a ||= b;", Target::ES2021);
    let EData::Binary(binary) = &first_expr(&ast).data else {
        panic!("expected a binary");
    };
    assert_eq!(binary.op, BinOp::LogicalOrAssign);
}

#[test]
fn object_spread_lowers_to_object_assign() {
    let ast = parse_with_target("x = {a: 1, ...rest, b: 2};", Target::ES2017);
    let EData::Binary(assign) = &first_expr(&ast).data else {
        panic!("expected an assignment");
    };
    let EData::Call(call) = &assign.right.data else {
        panic!("expected Object.assign");
    };
    let EData::Dot(dot) = &call.target.data else {
        panic!("expected a member callee");
    };
    assert_eq!(dot.name, "assign");
    // {a: 1}, rest, {b: 2}
    assert_eq!(call.args.len(), 3);
}

#[test]
fn optional_catch_binding_gains_a_name() {
    let ast = parse_with_target("try { f(); } catch { g(); }", Target::ES2018);
    let catch = ast
        .parts
        .iter()
        .find_map(|part| {
            part.stmts.iter().find_map(|stmt| match &stmt.data {
                SData::Try(data) => data.catch.as_ref(),
                _ => None,
            })
        })
        .expect("catch clause");
    assert!(catch.binding.is_some());
}

#[test]
fn optional_catch_binding_stays_at_es2019() {
    let ast = parse_with_target("try { f(); } catch { g(); }", Target::ES2019);
    let catch = ast
        .parts
        .iter()
        .find_map(|part| {
            part.stmts.iter().find_map(|stmt| match &stmt.data {
                SData::Try(data) => data.catch.as_ref(),
                _ => None,
            })
        })
        .expect("catch clause");
    assert!(catch.binding.is_none());
}

#[test]
fn class_instance_fields_move_into_constructor() {
    let ast = parse_with_target(
        "class Point { x = 1; y = 2; constructor() { this.ready = true; } }",
        Target::ES2020,
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
        .expect("class statement");
    // No plain fields remain
    assert!(
        class
            .members
            .iter()
            .all(|member| !matches!(member, ClassMember::Field(_)))
    );
    let ClassMember::Method(ctor) = &class.members[0] else {
        panic!("expected the constructor");
    };
    assert_eq!(ctor.kind, MethodKind::Constructor);
    // Two field installs precede the original body statement
    assert_eq!(ctor.func.body.len(), 3);
}

#[test]
fn class_static_fields_follow_the_declaration() {
    let ast = parse_with_target("class Config { static mode = 'fast'; }", Target::ES2020);
    // The class part carries both the class and the install statement
    let part = ast
        .parts
        .iter()
        .find(|part| {
            part.stmts
                .iter()
                .any(|stmt| matches!(stmt.data, SData::Class(_)))
        })
        .expect("class part");
    assert_eq!(part.stmts.len(), 2);
}

#[test]
fn class_fields_stay_at_es2022() {
    let ast = parse_with_target("class Point { x = 1; }", Target::ES2022);
    let class = ast
        .parts
        .iter()
        .find_map(|part| {
            part.stmts.iter().find_map(|stmt| match &stmt.data {
                SData::Class(data) => Some(&data.class),
                _ => None,
            })
        })
        .expect("class statement");
    assert!(matches!(class.members[0], ClassMember::Field(_)));
}

#[test]
fn async_below_target_warns_and_passes_through() {
    let log = Log::default();
    let options = ParseOptions {
        loader: LoaderKind::Js,
        target: Target::ES2015,
        ..ParseOptions::default()
    };
    let ast = parse(
        "let f = async () => 1;",
        "/test.js",
        SourceIndex(1),
        options,
        &log,
    );
    let warnings = log.take();
    assert!(warnings.iter().any(|d| d.text.contains("lowered")));
    // The arrow survives unchanged
    let found_async = ast.parts.iter().any(|part| {
        part.stmts.iter().any(|stmt| {
            matches!(
                &stmt.data,
                SData::Local(local)
                    if local.decls.iter().any(|decl| matches!(
                        decl.value.as_ref().map(|v| &v.data),
                        Some(EData::Arrow(arrow)) if arrow.is_async
                    ))
            )
        })
    });
    assert!(found_async);
}
