use jolt_common::charfreq::{CharFreq, NameAlphabet};
use jolt_common::logger::Log;
use jolt_common::options::LoaderKind;
use jolt_common::refs::SourceIndex;
use jolt_emitter::{collect_reserved_names, rename_for_readability, rename_for_size};
use jolt_parser::parts::Ast;
use jolt_parser::symbols::SymbolMap;
use jolt_parser::{ParseOptions, parse};

fn parse_files(sources: &[&str]) -> (Vec<Ast>, SymbolMap) {
    let log = Log::default();
    let mut asts = Vec::new();
    let mut symbols = SymbolMap::with_source_count(sources.len());
    for (index, source) in sources.iter().enumerate() {
        let options = ParseOptions {
            loader: LoaderKind::Js,
            ..ParseOptions::default()
        };
        let ast = parse(
            source,
            &format!("/file{index}.js"),
            SourceIndex(index as u32),
            options,
            &log,
        );
        symbols.outer[index] = ast.symbols.clone();
        asts.push(ast);
    }
    assert!(!log.has_errors());
    symbols.seed_output_names();
    (asts, symbols)
}

fn name_of_top_level(symbols: &SymbolMap, ast: &Ast, source: u32, original: &str) -> String {
    let reference = ast.scopes[0].members[original];
    let _ = source;
    symbols.name_of(reference).to_string()
}

#[test]
fn colliding_top_levels_get_counters() {
    let (asts, mut symbols) = parse_files(&[
        "function helper() {} helper();",
        "function helper() {} helper();",
    ]);
    let reserved = collect_reserved_names(&symbols);
    let files: Vec<_> = asts
        .iter()
        .enumerate()
        .map(|(index, ast)| (SourceIndex(index as u32), ast))
        .collect();
    rename_for_readability(&mut symbols, &files, &reserved);

    let first = name_of_top_level(&symbols, &asts[0], 0, "helper");
    let second = name_of_top_level(&symbols, &asts[1], 1, "helper");
    assert_eq!(first, "helper");
    assert_eq!(second, "helper2");
}

#[test]
fn nested_names_survive_when_no_conflict() {
    let (asts, mut symbols) = parse_files(&["function outer() { let inner = 1; use(inner); }"]);
    let reserved = collect_reserved_names(&symbols);
    let files: Vec<_> = asts
        .iter()
        .enumerate()
        .map(|(index, ast)| (SourceIndex(index as u32), ast))
        .collect();
    rename_for_readability(&mut symbols, &files, &reserved);

    // Every named symbol keeps its original name
    for (inner, symbol) in asts[0].symbols.iter().enumerate() {
        if symbol.original_name == "inner" || symbol.original_name == "outer" {
            let reference = jolt_common::refs::Ref::new(
                SourceIndex(0),
                jolt_common::refs::InnerIndex(inner as u32),
            );
            assert_eq!(symbols.name_of(reference), symbol.original_name);
        }
    }
}

#[test]
fn unbound_globals_are_never_renamed() {
    let (asts, mut symbols) = parse_files(&["console.log(1);"]);
    let reserved = collect_reserved_names(&symbols);
    assert!(reserved.contains("console"));
    let files: Vec<_> = asts
        .iter()
        .enumerate()
        .map(|(index, ast)| (SourceIndex(index as u32), ast))
        .collect();
    rename_for_readability(&mut symbols, &files, &reserved);
    let reference = asts[0].scopes[0].members["console"];
    assert_eq!(symbols.name_of(reference), "console");
}

#[test]
fn minified_names_are_short_and_frequency_ranked() {
    // Two sibling functions: parameter slots are shared, so both pairs
    // of parameters reuse the two shortest names
    let (asts, mut symbols) =
        parse_files(&["function a(b, c) { return b + c; } function d(e, f) { return e * f; }"]);
    let reserved = collect_reserved_names(&symbols);
    let files: Vec<_> = asts
        .iter()
        .enumerate()
        .map(|(index, ast)| (SourceIndex(index as u32), ast))
        .collect();
    let alphabet = NameAlphabet::default();
    rename_for_size(&mut symbols, &files, &reserved, &alphabet);

    let mut by_original = std::collections::HashMap::new();
    for (inner, symbol) in asts[0].symbols.iter().enumerate() {
        let reference = jolt_common::refs::Ref::new(
            SourceIndex(0),
            jolt_common::refs::InnerIndex(inner as u32),
        );
        by_original.insert(
            symbol.original_name.clone(),
            symbols.name_of(reference).to_string(),
        );
    }

    // Sibling parameters share minified names slot-for-slot
    assert_eq!(by_original["b"], by_original["e"]);
    assert_eq!(by_original["c"], by_original["f"]);
    // Every minified name is a single character here
    for original in ["a", "b", "c", "d", "e", "f"] {
        assert_eq!(by_original[original].len(), 1, "{original}");
    }
    // Parameters are used twice (once in the body, once at the
    // declaration estimate); they outrank the function names
    assert_ne!(by_original["a"], by_original["b"]);
}

#[test]
fn minified_names_skip_reserved_words() {
    let (asts, mut symbols) = parse_files(&["let value = 1; use(value);"]);
    let mut reserved = collect_reserved_names(&symbols);
    // Poison the single-letter names the ranker would pick first
    let alphabet = CharFreq::default().compile();
    for index in 0..4 {
        reserved.insert(alphabet.name_for_index(index));
    }
    let files: Vec<_> = asts
        .iter()
        .enumerate()
        .map(|(index, ast)| (SourceIndex(index as u32), ast))
        .collect();
    rename_for_size(&mut symbols, &files, &reserved, &alphabet);

    let reference = asts[0].scopes[0].members["value"];
    let name = symbols.name_of(reference);
    assert!(!reserved.contains(name));
}

#[test]
fn private_names_keep_their_hash() {
    let (asts, mut symbols) =
        parse_files(&["class Box { #inner = 1; read() { return this.#inner; } }"]);
    let reserved = collect_reserved_names(&symbols);
    let files: Vec<_> = asts
        .iter()
        .enumerate()
        .map(|(index, ast)| (SourceIndex(index as u32), ast))
        .collect();
    let alphabet = NameAlphabet::default();
    rename_for_size(&mut symbols, &files, &reserved, &alphabet);

    let private = asts[0]
        .symbols
        .iter()
        .position(|symbol| symbol.original_name == "#inner")
        .unwrap();
    let reference = jolt_common::refs::Ref::new(
        SourceIndex(0),
        jolt_common::refs::InnerIndex(private as u32),
    );
    let name = symbols.name_of(reference);
    assert!(name.starts_with('#'));
    assert!(name.len() <= 3);
}
