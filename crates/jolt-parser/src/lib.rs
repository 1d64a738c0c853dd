//! Parser and lowerer for JavaScript, TypeScript and JSX.
//!
//! The crate exposes one entry point, [`parse`], which runs both passes:
//!
//! 1. **Pass 1** lexes and parses the source, building scopes and
//!    declaring symbols (with `var`/function hoisting) as it goes. A side
//!    array records the scope push order.
//! 2. **Pass 2** replays the scopes, binds identifier references,
//!    substitutes configured defines, folds constants, eliminates dead
//!    branches, lowers syntax to the configured target, applies the JSX
//!    and TypeScript transforms, and groups top-level statements into
//!    tree-shakable parts.
//!
//! The result is an immutable [`parts::Ast`] plus its symbol table;
//! everything downstream (linking, printing) reads it without mutation.

pub mod ast;
pub mod ops;
pub mod parts;
pub mod scopes;
pub mod symbols;

mod parser;
mod pass2;
mod synthetic;

pub use parser::ParseOptions;
pub use pass2::RUNTIME_SPECIFIER;
pub use synthetic::{json_value_to_expr, synthetic_json_module, synthetic_string_module};

use jolt_common::logger::Log;
use jolt_common::refs::SourceIndex;

/// Parse one file into its AST, symbol table and parts.
///
/// Diagnostics go to `log`; the returned AST is always structurally
/// valid even when errors were reported (error recovery substitutes
/// missing pieces).
pub fn parse(
    contents: &str,
    path: &str,
    source_index: SourceIndex,
    options: ParseOptions,
    log: &Log,
) -> parts::Ast {
    let _span = tracing::debug_span!("parse", path).entered();
    let mut parser = parser::Parser::new(contents, path, source_index, options, log);
    let stmts = parser.parse_program();
    pass2::finish(parser, stmts)
}
