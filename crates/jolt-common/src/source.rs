//! The source model: file contents interned by the scanner, plus the
//! line/column lookup used when rendering diagnostics and source maps.

use crate::options::LoaderKind;
use crate::refs::SourceIndex;
use crate::span::Span;

/// One input file, interned in the registry at first discovery.
///
/// `key_path` is the canonical path used for dedup; `pretty_path` is what
/// diagnostics and source maps show to the user.
#[derive(Clone, Debug)]
pub struct Source {
    pub index: SourceIndex,
    pub key_path: String,
    pub pretty_path: String,
    pub contents: String,
    pub loader: LoaderKind,
}

impl Source {
    pub fn new(
        index: SourceIndex,
        key_path: impl Into<String>,
        contents: impl Into<String>,
        loader: LoaderKind,
    ) -> Self {
        let key_path = key_path.into();
        Source {
            index,
            pretty_path: key_path.clone(),
            key_path,
            contents: contents.into(),
            loader,
        }
    }

    /// Slice of the contents covered by a span.
    pub fn text_for(&self, span: Span) -> &str {
        span.slice(&self.contents)
    }
}

/// Zero-based line/column position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineColumn {
    pub line: u32,
    pub column: u32,
}

/// Byte offset → line/column translation table.
///
/// Built lazily per file when a diagnostic or source map needs positions.
/// Columns are counted in UTF-16 code units to match the source-map spec
/// and editor conventions.
#[derive(Clone, Debug)]
pub struct LineMap {
    /// Byte offset of the start of each line.
    line_starts: Vec<u32>,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push(i as u32 + 1),
                b'\r' => {
                    // \r\n counts as one terminator
                    if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                        i += 1;
                    }
                    line_starts.push(i as u32 + 1);
                }
                _ => {}
            }
            i += 1;
        }
        LineMap { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of the start of a zero-based line.
    pub fn line_start(&self, line: u32) -> u32 {
        self.line_starts
            .get(line as usize)
            .copied()
            .unwrap_or(u32::MAX)
    }

    /// Translate a byte offset into a zero-based line/column pair.
    pub fn position(&self, text: &str, offset: u32) -> LineColumn {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let start = self.line_starts[line] as usize;
        let end = (offset as usize).min(text.len());
        let column = text
            .get(start..end)
            .map(|s| s.chars().map(char::len_utf16).sum::<usize>() as u32)
            .unwrap_or(0);
        LineColumn {
            line: line as u32,
            column,
        }
    }

    /// The full text of the line containing `offset`, without the
    /// terminator. Used for the source excerpt under diagnostics.
    pub fn line_text<'a>(&self, text: &'a str, offset: u32) -> &'a str {
        let pos = self.position(text, offset);
        let start = self.line_starts[pos.line as usize] as usize;
        let end = self
            .line_starts
            .get(pos.line as usize + 1)
            .map(|&e| e as usize)
            .unwrap_or(text.len());
        text[start..end].trim_end_matches(['\n', '\r'])
    }
}

#[cfg(test)]
#[path = "../tests/source.rs"]
mod tests;
