//! Concurrent diagnostic collection.
//!
//! Every pipeline phase pushes errors and warnings into a shared `Log`.
//! Writers take a short mutex; readers drain after the phase completes.
//! Phase transitions consult `has_errors()` and abort the pipeline before
//! the next phase when set. Identical messages (same path, span, text) are
//! deduplicated, and `error_limit` throttles noisy failures.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use rustc_hash::FxHashSet;

use crate::source::{LineMap, Source};
use crate::span::Span;

/// Severity of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Warning,
    Error,
}

/// What kind of failure produced a diagnostic. Only used for filtering in
/// tests and the programmatic API; rendering is driven by `level`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    Syntax,
    Resolution,
    ExportMismatch,
    Lowering,
    Other,
}

/// One collected error or warning with source attribution.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: LogLevel,
    pub kind: DiagnosticKind,
    /// Pretty path of the file, empty for file-independent messages.
    pub path: String,
    /// Span within that file; dummy when no range applies.
    pub span: Span,
    pub text: String,
}

#[derive(Default)]
struct LogState {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<(String, Span, String)>,
    errors_omitted: usize,
}

/// Mutex-guarded diagnostic sink, created once per build invocation.
pub struct Log {
    state: Mutex<LogState>,
    has_errors: AtomicBool,
    error_limit: usize,
}

impl Default for Log {
    fn default() -> Self {
        Log::new(usize::MAX)
    }
}

impl Log {
    pub fn new(error_limit: usize) -> Self {
        Log {
            state: Mutex::new(LogState::default()),
            has_errors: AtomicBool::new(false),
            error_limit: if error_limit == 0 {
                usize::MAX
            } else {
                error_limit
            },
        }
    }

    pub fn add(&self, diagnostic: Diagnostic) {
        if diagnostic.level == LogLevel::Error {
            self.has_errors.store(true, Ordering::Release);
        }
        let mut state = self.state.lock().unwrap();
        let key = (
            diagnostic.path.clone(),
            diagnostic.span,
            diagnostic.text.clone(),
        );
        if !state.seen.insert(key) {
            return;
        }
        if diagnostic.level == LogLevel::Error {
            let errors = state
                .diagnostics
                .iter()
                .filter(|d| d.level == LogLevel::Error)
                .count();
            if errors >= self.error_limit {
                state.errors_omitted += 1;
                return;
            }
        }
        state.diagnostics.push(diagnostic);
    }

    pub fn add_error(&self, path: &str, span: Span, text: impl Into<String>) {
        self.add(Diagnostic {
            level: LogLevel::Error,
            kind: DiagnosticKind::Other,
            path: path.to_string(),
            span,
            text: text.into(),
        });
    }

    pub fn add_warning(&self, path: &str, span: Span, text: impl Into<String>) {
        self.add(Diagnostic {
            level: LogLevel::Warning,
            kind: DiagnosticKind::Other,
            path: path.to_string(),
            span,
            text: text.into(),
        });
    }

    pub fn add_kind(
        &self,
        level: LogLevel,
        kind: DiagnosticKind,
        path: &str,
        span: Span,
        text: impl Into<String>,
    ) {
        self.add(Diagnostic {
            level,
            kind,
            path: path.to_string(),
            span,
            text: text.into(),
        });
    }

    /// Whether any error has been logged. Lock-free; phase gates poll this.
    pub fn has_errors(&self) -> bool {
        self.has_errors.load(Ordering::Acquire)
    }

    /// Number of errors silently dropped by the error limit.
    pub fn errors_omitted(&self) -> usize {
        self.state.lock().unwrap().errors_omitted
    }

    /// Drain all diagnostics, ordered by (path, span) for determinism.
    pub fn take(&self) -> Vec<Diagnostic> {
        let mut state = self.state.lock().unwrap();
        let mut diagnostics = std::mem::take(&mut state.diagnostics);
        state.seen.clear();
        diagnostics.sort_by(|a, b| {
            (a.path.as_str(), a.span.start, a.span.end).cmp(&(
                b.path.as_str(),
                b.span.start,
                b.span.end,
            ))
        });
        diagnostics
    }

    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.state.lock().unwrap().diagnostics.clone()
    }
}

/// Render one diagnostic as `path:line:column: level: message`, with the
/// source line and a caret underline when the source is available.
pub fn render_diagnostic(diagnostic: &Diagnostic, source: Option<&Source>, color: bool) -> String {
    let level = match diagnostic.level {
        LogLevel::Error => {
            if color {
                "error".red().bold().to_string()
            } else {
                "error".to_string()
            }
        }
        LogLevel::Warning => {
            if color {
                "warning".magenta().bold().to_string()
            } else {
                "warning".to_string()
            }
        }
    };

    let Some(source) = source else {
        if diagnostic.path.is_empty() {
            return format!("{level}: {}", diagnostic.text);
        }
        let path = if color {
            diagnostic.path.bold().to_string()
        } else {
            diagnostic.path.clone()
        };
        return format!("{path}: {level}: {}", diagnostic.text);
    };

    let line_map = LineMap::new(&source.contents);
    let pos = line_map.position(&source.contents, diagnostic.span.start);
    let path = format!(
        "{}:{}:{}",
        source.pretty_path,
        pos.line + 1,
        pos.column + 1
    );
    let path = if color { path.bold().to_string() } else { path };

    let mut out = format!("{path}: {level}: {}\n", diagnostic.text);
    let line_text = line_map.line_text(&source.contents, diagnostic.span.start);
    out.push_str(line_text);
    out.push('\n');

    // Caret underline covering the span, clamped to this line
    let caret_len = (diagnostic.span.len() as usize)
        .max(1)
        .min(line_text.len().saturating_sub(pos.column as usize).max(1));
    let underline = format!(
        "{}{}",
        " ".repeat(pos.column as usize),
        "~".repeat(caret_len)
    );
    if color {
        out.push_str(&underline.green().to_string());
    } else {
        out.push_str(&underline);
    }
    out
}

#[cfg(test)]
#[path = "../tests/logger.rs"]
mod tests;
