//! Common types and utilities for the jolt bundler.
//!
//! This crate provides the foundational types shared by every pipeline
//! crate:
//! - Source spans (`Span`, `Spanned`)
//! - Symbol handles (`Ref`, `SourceIndex`, `InnerIndex`)
//! - The source model (`Source`, `LineMap`)
//! - Build/transform configuration (`BuildOptions`, `Target`, ...)
//! - The concurrent diagnostic log (`Log`, `Diagnostic`)
//! - The identifier character-frequency histogram (`CharFreq`)

// Span - source location tracking (byte offsets)
pub mod span;
pub use span::{Span, Spanned};

// Symbol handles - (source, inner) index pairs
pub mod refs;
pub use refs::{InnerIndex, Ref, SourceIndex};

// Source model - file contents plus line/column lookup
pub mod source;
pub use source::{LineColumn, LineMap, Source};

// Configuration surface
pub mod options;
pub use options::{
    BuildOptions, LoaderKind, OutputFormat, Platform, SourceMapMode, Target, TransformOptions,
};

// Concurrent diagnostic collection
pub mod logger;
pub use logger::{Diagnostic, DiagnosticKind, Log, LogLevel};

// Identifier character-frequency histogram for minified name ranking
pub mod charfreq;
pub use charfreq::CharFreq;
