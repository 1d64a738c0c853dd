use super::*;

#[test]
fn vlq_encodes_small_values() {
    assert_eq!(vlq::encode(0), "A");
    assert_eq!(vlq::encode(1), "C");
    assert_eq!(vlq::encode(-1), "D");
    assert_eq!(vlq::encode(15), "e");
    assert_eq!(vlq::encode(16), "gB");
    assert_eq!(vlq::encode(-16), "hB");
    assert_eq!(vlq::encode(123), "2H");
}

#[test]
fn chunk_stores_first_mapping_separately() {
    let mut chunk = SourceMapChunk::new();
    chunk.add(Mapping {
        generated_line: 0,
        generated_column: 4,
        original_line: 2,
        original_column: 8,
    });
    assert_eq!(chunk.first.unwrap().generated_column, 4);
    assert!(chunk.buffer.is_empty());

    chunk.add(Mapping {
        generated_line: 0,
        generated_column: 10,
        original_line: 2,
        original_column: 14,
    });
    // `,` then deltas 6, 0, 0, 6
    assert_eq!(chunk.buffer, ",MAAM");
}

#[test]
fn chunk_line_breaks_reset_columns() {
    let mut chunk = SourceMapChunk::new();
    chunk.add(Mapping {
        generated_line: 0,
        generated_column: 5,
        original_line: 0,
        original_column: 0,
    });
    chunk.add(Mapping {
        generated_line: 2,
        generated_column: 3,
        original_line: 1,
        original_column: 0,
    });
    // Two `;` then absolute column 3
    assert!(chunk.buffer.starts_with(";;"));
    assert_eq!(&chunk.buffer[2..3], "G"); // encode(3)
}

#[test]
fn joiner_rebases_chunk_firsts() {
    let mut first_chunk = SourceMapChunk::new();
    first_chunk.add(Mapping {
        generated_line: 0,
        generated_column: 0,
        original_line: 0,
        original_column: 0,
    });

    let mut second_chunk = SourceMapChunk::new();
    second_chunk.add(Mapping {
        generated_line: 0,
        generated_column: 0,
        original_line: 0,
        original_column: 0,
    });

    let mut joiner = SourceMapJoiner::new();
    let a = joiner.add_source("/a.js", "let a = 1;\n");
    let b = joiner.add_source("/b.js", "let b = 2;\n");
    joiner.append_chunk(&first_chunk, a, 0, 1);
    joiner.append_chunk(&second_chunk, b, 1, 1);
    let map = joiner.finish();

    assert_eq!(map.version, 3);
    assert_eq!(map.sources, vec!["/a.js", "/b.js"]);
    // First segment absolute; second file starts on line 1 with a
    // source-index delta of +1; each file's text ends with a line break
    assert_eq!(map.mappings, "AAAA;ACAA;");
}

#[test]
fn inline_comment_is_a_data_url() {
    let map = SourceMap {
        version: 3,
        sources: vec!["in.js".to_string()],
        sources_content: vec![String::new()],
        names: Vec::new(),
        mappings: "AAAA".to_string(),
    };
    let comment = map.to_inline_comment();
    assert!(comment.starts_with("//# sourceMappingURL=data:application/json;base64,"));
}

#[test]
fn empty_chunks_contribute_nothing() {
    let chunk = SourceMapChunk::new();
    let mut joiner = SourceMapJoiner::new();
    let index = joiner.add_source("/a.js", "");
    joiner.append_chunk(&chunk, index, 0, 0);
    assert_eq!(joiner.finish().mappings, "");
}
