//! Synthetic ASTs for non-JavaScript loaders.
//!
//! JSON files become a module exporting the parsed value as its default
//! export; text and binary-ish loaders export a single string. The
//! synthetic statements run through the ordinary pass 2 machinery so the
//! result is indistinguishable from a parsed file.

use jolt_common::logger::Log;
use jolt_common::refs::SourceIndex;
use jolt_common::span::Span;

use crate::ast::*;
use crate::parser::{ParseOptions, Parser};
use crate::parts::Ast;
use crate::pass2;

/// `export default <value>` for a JSON document.
pub fn synthetic_json_module(
    value: &serde_json::Value,
    path: &str,
    source_index: SourceIndex,
    log: &Log,
) -> Ast {
    let expr = json_value_to_expr(value);
    synthetic_default_export(expr, path, source_index, log)
}

/// `export default "<text>"` for text-like loaders.
pub fn synthetic_string_module(
    text: String,
    path: &str,
    source_index: SourceIndex,
    log: &Log,
) -> Ast {
    let expr = Expr::new(Span::dummy(), EData::String(EString::new(text)));
    synthetic_default_export(expr, path, source_index, log)
}

fn synthetic_default_export(
    value: Expr,
    path: &str,
    source_index: SourceIndex,
    log: &Log,
) -> Ast {
    let mut parser = Parser::new("", path, source_index, ParseOptions::default(), log);
    let default_ref = parser.synthetic_default_ref();
    let stmt = Stmt::new(
        Span::dummy(),
        SData::ExportDefault(Box::new(SExportDefault {
            default_name_ref: default_ref,
            value: ExportDefaultValue::Expr(value),
        })),
    );
    pass2::finish(parser, vec![stmt])
}

/// Translate a JSON value into the equivalent literal expression.
pub fn json_value_to_expr(value: &serde_json::Value) -> Expr {
    let span = Span::dummy();
    let data = match value {
        serde_json::Value::Null => EData::Null,
        serde_json::Value::Bool(value) => EData::Boolean(*value),
        serde_json::Value::Number(number) => EData::Number(number.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(text) => EData::String(EString::new(text.clone())),
        serde_json::Value::Array(items) => EData::Array(EArray {
            items: items.iter().map(json_value_to_expr).collect(),
        }),
        serde_json::Value::Object(entries) => EData::Object(EObject {
            properties: entries
                .iter()
                .map(|(key, value)| Property {
                    kind: PropertyKind::Normal,
                    key: Some(Expr::new(span, EData::String(EString::new(key.clone())))),
                    is_computed: false,
                    is_method: false,
                    is_static: false,
                    is_shorthand: false,
                    value: Some(json_value_to_expr(value)),
                    initializer: None,
                })
                .collect(),
        }),
    };
    Expr::new(span, data)
}
