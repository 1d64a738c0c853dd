//! Printing, source maps and symbol renaming for jolt.
//!
//! The printer turns one file's post-lowered AST into output text plus a
//! VLQ source-map chunk, in parallel per file. The name assigner runs
//! once per chunk before printing, either renaming collisions away or
//! replacing names with frequency-optimal short ones. The source-map
//! joiner concatenates chunks, rebasing only each chunk's first mapping.

pub mod names;
pub mod printer;
mod printer_exprs;
pub mod source_map;

pub use names::{collect_reserved_names, rename_for_readability, rename_for_size};
pub use printer::{PrintArgs, PrintOptions, PrintResult, print_stmts};
pub use source_map::{Mapping, SourceMap, SourceMapChunk, SourceMapJoiner, vlq};
