//! Source map generation.
//!
//! Each printed file produces a [`SourceMapChunk`]: VLQ-encoded mapping
//! segments whose deltas start from a zero state. Chunks are built in
//! parallel; when output files are concatenated, only each chunk's
//! *first* segment has to be re-encoded against the accumulated state
//! (the rebase step), because all later segments are deltas within the
//! chunk. The final JSON is standard source map v3.

use base64::Engine;
use serde::Serialize;

/// Base64 VLQ encoding used by the `mappings` field.
pub mod vlq {
    const ALPHABET: &[u8; 64] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

    pub fn encode(value: i64) -> String {
        let mut out = String::new();
        encode_into(value, &mut out);
        out
    }

    pub fn encode_into(value: i64, out: &mut String) {
        // Sign goes in the low bit
        let mut vlq = if value < 0 {
            (((-value) as u64) << 1) | 1
        } else {
            (value as u64) << 1
        };
        loop {
            let mut digit = (vlq & 0x1f) as usize;
            vlq >>= 5;
            if vlq != 0 {
                digit |= 0x20;
            }
            out.push(ALPHABET[digit] as char);
            if vlq == 0 {
                break;
            }
        }
    }
}

/// One absolute mapping within a file: generated (line, column) →
/// original (line, column). Columns count UTF-16 units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Mapping {
    pub generated_line: u32,
    pub generated_column: u32,
    pub original_line: u32,
    pub original_column: u32,
}

/// Per-file mapping chunk. The first segment is stored in absolute form
/// so concatenation can rebase it; everything after it is already
/// VLQ-encoded with in-chunk deltas.
#[derive(Clone, Debug, Default)]
pub struct SourceMapChunk {
    pub first: Option<Mapping>,
    /// Encoded segments after the first, including `;` line separators
    /// and `,` segment separators. Must be appended verbatim after the
    /// rebased first segment.
    pub buffer: String,
    prev: Mapping,
}

impl SourceMapChunk {
    pub fn new() -> Self {
        SourceMapChunk::default()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Append one mapping. Calls must arrive in generated order.
    pub fn add(&mut self, mapping: Mapping) {
        let Some(_) = self.first else {
            self.first = Some(mapping);
            self.prev = mapping;
            return;
        };
        if mapping == self.prev {
            return;
        }
        if mapping.generated_line > self.prev.generated_line {
            for _ in self.prev.generated_line..mapping.generated_line {
                self.buffer.push(';');
            }
            // Generated columns restart on every line
            vlq::encode_into(mapping.generated_column as i64, &mut self.buffer);
        } else {
            if mapping.generated_column == self.prev.generated_column {
                return;
            }
            self.buffer.push(',');
            vlq::encode_into(
                mapping.generated_column as i64 - self.prev.generated_column as i64,
                &mut self.buffer,
            );
        }
        // Same source file throughout a chunk
        vlq::encode_into(0, &mut self.buffer);
        vlq::encode_into(
            mapping.original_line as i64 - self.prev.original_line as i64,
            &mut self.buffer,
        );
        vlq::encode_into(
            mapping.original_column as i64 - self.prev.original_column as i64,
            &mut self.buffer,
        );
        self.prev = mapping;
    }
}

/// Standard v3 source map, serialized with serde.
#[derive(Debug, Serialize)]
pub struct SourceMap {
    pub version: u32,
    pub sources: Vec<String>,
    #[serde(rename = "sourcesContent")]
    pub sources_content: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// `//# sourceMappingURL=data:...` payload for inline maps.
    pub fn to_inline_comment(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(self.to_json());
        format!("//# sourceMappingURL=data:application/json;base64,{encoded}")
    }
}

/// Concatenates per-file chunks into the final `mappings` stream,
/// rebasing each chunk's first segment against the accumulated state.
pub struct SourceMapJoiner {
    sources: Vec<String>,
    sources_content: Vec<String>,
    mappings: String,
    current_generated_line: u32,
    prev_generated_column: u32,
    line_has_segments: bool,
    prev_source: i64,
    prev_original_line: i64,
    prev_original_column: i64,
}

impl Default for SourceMapJoiner {
    fn default() -> Self {
        SourceMapJoiner {
            sources: Vec::new(),
            sources_content: Vec::new(),
            mappings: String::new(),
            current_generated_line: 0,
            prev_generated_column: 0,
            line_has_segments: false,
            prev_source: -1,
            prev_original_line: 0,
            prev_original_column: 0,
        }
    }
}

impl SourceMapJoiner {
    pub fn new() -> Self {
        SourceMapJoiner::default()
    }

    /// Register a source file; returns its index in the final map.
    pub fn add_source(&mut self, path: impl Into<String>, contents: impl Into<String>) -> usize {
        self.sources.push(path.into());
        self.sources_content.push(contents.into());
        self.sources.len() - 1
    }

    /// Append a file's chunk. `line_offset` is the generated line at
    /// which the file's text begins; `line_count` is how many lines the
    /// file's text spans.
    pub fn append_chunk(
        &mut self,
        chunk: &SourceMapChunk,
        source_index: usize,
        line_offset: u32,
        line_count: u32,
    ) {
        let Some(first) = chunk.first else {
            return;
        };

        // Advance to the first mapping's generated line
        let target_line = line_offset + first.generated_line;
        if target_line > self.current_generated_line {
            for _ in self.current_generated_line..target_line {
                self.mappings.push(';');
            }
            self.current_generated_line = target_line;
            self.prev_generated_column = 0;
            self.line_has_segments = false;
        }

        // Rebase the first segment against the accumulated state
        if self.line_has_segments {
            self.mappings.push(',');
        }
        vlq::encode_into(
            first.generated_column as i64 - self.prev_generated_column as i64,
            &mut self.mappings,
        );
        // With no prior segment the source delta is the absolute index
        vlq::encode_into(source_index as i64 - self.prev_source.max(0), &mut self.mappings);
        vlq::encode_into(
            first.original_line as i64 - self.prev_original_line,
            &mut self.mappings,
        );
        vlq::encode_into(
            first.original_column as i64 - self.prev_original_column,
            &mut self.mappings,
        );

        // The rest of the chunk is already correctly delta-encoded
        self.mappings.push_str(&chunk.buffer);

        // Roll the accumulated state to the chunk's end
        let end = last_mapping_of(chunk);
        let lines_in_buffer = chunk.buffer.matches(';').count() as u32;
        self.current_generated_line = target_line + lines_in_buffer;
        self.prev_generated_column = end.generated_column;
        self.line_has_segments = true;
        self.prev_source = source_index as i64;
        self.prev_original_line = end.original_line as i64;
        self.prev_original_column = end.original_column as i64;

        // Account for the remainder of the file's text
        let file_end_line = line_offset + line_count;
        if file_end_line > self.current_generated_line {
            for _ in self.current_generated_line..file_end_line {
                self.mappings.push(';');
            }
            self.current_generated_line = file_end_line;
            self.prev_generated_column = 0;
            self.line_has_segments = false;
        }
    }

    pub fn finish(self) -> SourceMap {
        SourceMap {
            version: 3,
            sources: self.sources,
            sources_content: self.sources_content,
            names: Vec::new(),
            mappings: self.mappings,
        }
    }
}

/// Absolute values of a chunk's final mapping, replayed from its parts.
fn last_mapping_of(chunk: &SourceMapChunk) -> Mapping {
    // The chunk tracked this while building
    chunk.prev
}

#[cfg(test)]
#[path = "../tests/source_map_unit.rs"]
mod tests;
