use jolt_common::logger::Log;
use jolt_common::options::{JsxOptions, LoaderKind};
use jolt_common::refs::SourceIndex;
use jolt_parser::ast::*;
use jolt_parser::parts::Ast;
use jolt_parser::{ParseOptions, parse};

fn parse_jsx(source: &str) -> Ast {
    parse_jsx_with(source, JsxOptions::default())
}

fn parse_jsx_with(source: &str, jsx: JsxOptions) -> Ast {
    let log = Log::default();
    let options = ParseOptions {
        loader: LoaderKind::Jsx,
        jsx,
        ..ParseOptions::default()
    };
    let ast = parse(source, "/test.jsx", SourceIndex(1), options, &log);
    let diagnostics = log.take();
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics: {diagnostics:?}"
    );
    ast
}

fn first_call(ast: &Ast) -> &ECall {
    for part in &ast.parts {
        for stmt in &part.stmts {
            match &stmt.data {
                SData::Expr(Expr {
                    data: EData::Call(call),
                    ..
                }) => return call,
                SData::Local(local) => {
                    if let Some(Expr {
                        data: EData::Call(call),
                        ..
                    }) = local.decls[0].value.as_ref()
                    {
                        return call;
                    }
                }
                _ => {}
            }
        }
    }
    panic!("no factory call found");
}

#[test]
fn intrinsic_elements_pass_string_tags() {
    let ast = parse_jsx("let el = <div className=\"box\">text</div>;");
    let call = first_call(&ast);
    // React.createElement("div", {className: "box"}, "text")
    let EData::Dot(dot) = &call.target.data else {
        panic!("expected React.createElement");
    };
    assert_eq!(dot.name, "createElement");
    assert!(matches!(&call.args[0].data, EData::String(tag) if tag.value == "div"));
    let EData::Object(props) = &call.args[1].data else {
        panic!("expected a props object");
    };
    assert_eq!(props.properties.len(), 1);
    assert!(matches!(&call.args[2].data, EData::String(text) if text.value == "text"));
}

#[test]
fn component_tags_pass_values() {
    let ast = parse_jsx("import {Widget} from './widget'; let el = <Widget/>;");
    let call = first_call(&ast);
    assert!(matches!(call.args[0].data, EData::ImportIdentifier(_)));
    assert!(matches!(call.args[1].data, EData::Null));
}

#[test]
fn member_tags_build_dot_chains() {
    let ast = parse_jsx("let el = <Theme.Button.Small/>;");
    let call = first_call(&ast);
    let EData::Dot(outer) = &call.args[0].data else {
        panic!("expected a member tag");
    };
    assert_eq!(outer.name, "Small");
}

#[test]
fn fragments_use_the_fragment_value() {
    let ast = parse_jsx("let el = <>{child}</>;");
    let call = first_call(&ast);
    let EData::Dot(dot) = &call.args[0].data else {
        panic!("expected React.Fragment");
    };
    assert_eq!(dot.name, "Fragment");
}

#[test]
fn custom_factory_paths_apply() {
    let ast = parse_jsx_with(
        "let el = <span/>;",
        JsxOptions {
            factory: vec!["h".to_string()],
            fragment: vec!["Fragment".to_string()],
        },
    );
    let call = first_call(&ast);
    assert!(matches!(call.target.data, EData::Identifier(_)));
}

#[test]
fn whitespace_normalization_collapses_newline_indent() {
    let ast = parse_jsx("let el = <a>   b   \n   c</a>;");
    let call = first_call(&ast);
    assert_eq!(call.args.len(), 3);
    let EData::String(text) = &call.args[2].data else {
        panic!("expected one text child");
    };
    assert_eq!(text.value, "b    c");
}

#[test]
fn whitespace_only_lines_vanish() {
    let ast = parse_jsx("let el = <a>\n   \n</a>;");
    let call = first_call(&ast);
    // Tag and props only; no text child
    assert_eq!(call.args.len(), 2);
}

#[test]
fn entities_decode_in_text_and_attributes() {
    let ast = parse_jsx("let el = <a title=\"a &amp; b\">x &lt; y</a>;");
    let call = first_call(&ast);
    let EData::Object(props) = &call.args[1].data else {
        panic!("expected props");
    };
    let value = props.properties[0].value.as_ref().unwrap();
    assert!(matches!(&value.data, EData::String(s) if s.value == "a & b"));
    assert!(matches!(&call.args[2].data, EData::String(s) if s.value == "x < y"));
}

#[test]
fn expression_children_and_spread_props() {
    let ast = parse_jsx("let el = <div {...rest} id={id}>{count + 1}</div>;");
    let call = first_call(&ast);
    let EData::Object(props) = &call.args[1].data else {
        panic!("expected props");
    };
    assert_eq!(props.properties.len(), 2);
    assert_eq!(props.properties[0].kind, PropertyKind::Spread);
    assert!(matches!(call.args[2].data, EData::Binary(_)));
}

#[test]
fn nested_elements_become_nested_calls() {
    let ast = parse_jsx("let el = <ul><li>one</li><li>two</li></ul>;");
    let call = first_call(&ast);
    assert_eq!(call.args.len(), 4);
    assert!(matches!(call.args[2].data, EData::Call(_)));
    assert!(matches!(call.args[3].data, EData::Call(_)));
}

#[test]
fn empty_expression_containers_are_ignored() {
    let ast = parse_jsx("let el = <a>{}</a>;");
    let call = first_call(&ast);
    assert_eq!(call.args.len(), 2);
}

#[test]
fn dashed_attributes_parse() {
    let ast = parse_jsx("let el = <div data-value=\"1\" aria-label=\"x\"/>;");
    let call = first_call(&ast);
    let EData::Object(props) = &call.args[1].data else {
        panic!("expected props");
    };
    let keys: Vec<String> = props
        .properties
        .iter()
        .map(|property| match &property.key.as_ref().unwrap().data {
            EData::String(s) => s.value.clone(),
            _ => String::new(),
        })
        .collect();
    assert_eq!(keys, vec!["data-value", "aria-label"]);
}

#[test]
fn jsx_in_plain_ts_is_an_error() {
    let log = Log::default();
    let options = ParseOptions {
        loader: LoaderKind::Ts,
        ..ParseOptions::default()
    };
    // `<div>...` in .ts parses as a type assertion and then fails
    parse("let el = <div>x</div>;", "/test.ts", SourceIndex(1), options, &log);
    assert!(log.has_errors());
}

#[test]
fn tsx_behaves_like_jsx() {
    let log = Log::default();
    let options = ParseOptions {
        loader: LoaderKind::Tsx,
        ..ParseOptions::default()
    };
    let ast = parse(
        "let el: JSX.Element = <div id={x as string}/>;",
        "/test.tsx",
        SourceIndex(1),
        options,
        &log,
    );
    assert!(!log.has_errors());
    let call = first_call(&ast);
    assert!(matches!(&call.args[0].data, EData::String(tag) if tag.value == "div"));
}
