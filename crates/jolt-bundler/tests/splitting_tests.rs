use jolt_bundler::build;
use jolt_common::logger::Log;
use jolt_common::options::{BuildOptions, OutputFormat, Target};
use jolt_resolver::MemoryFileSystem;

fn split_build(fs: &MemoryFileSystem, entries: &[&str]) -> Vec<(String, String)> {
    let options = BuildOptions {
        entry_points: entries.iter().map(|e| e.to_string()).collect(),
        bundle: true,
        splitting: true,
        format: OutputFormat::EsModule,
        target: Target::ESNext,
        outdir: Some("/out".to_string()),
        ..BuildOptions::default()
    };
    let log = Log::default();
    let result = build(&options, fs, &log);
    let diagnostics = log.take();
    let errors: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.level == jolt_common::logger::LogLevel::Error)
        .collect();
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    result
        .output_files
        .into_iter()
        .map(|file| (file.path, String::from_utf8_lossy(&file.contents).into_owned()))
        .collect()
}

fn find_containing<'a>(outputs: &'a [(String, String)], needle: &str) -> &'a (String, String) {
    outputs
        .iter()
        .find(|(_, text)| text.contains(needle))
        .unwrap_or_else(|| {
            panic!(
                "no output contains {needle:?}; outputs: {:?}",
                outputs.iter().map(|(path, _)| path).collect::<Vec<_>>()
            )
        })
}

#[test]
fn shared_code_lands_in_a_shared_chunk() {
    let fs = MemoryFileSystem::new()
        .with_file("/src/one.js", "import {shared} from './common'; use1(shared);")
        .with_file("/src/two.js", "import {shared} from './common'; use2(shared);")
        .with_file("/src/common.js", "export const shared = 'between entries';");
    let outputs = split_build(&fs, &["/src/one.js", "/src/two.js"]);

    // Three files: two entries plus one shared chunk
    assert!(outputs.len() >= 3, "{outputs:?}");
    let (shared_path, _) = find_containing(&outputs, "between entries");
    assert!(shared_path.contains("chunk-"), "{shared_path}");

    // Entry chunks import the shared symbol rather than duplicating it
    let (_, one_text) = find_containing(&outputs, "use1");
    assert_eq!(one_text.matches("between entries").count(), 0, "{one_text}");
    assert!(one_text.contains("import"), "{one_text}");
}

#[test]
fn entry_only_code_stays_in_its_entry_chunk() {
    let fs = MemoryFileSystem::new()
        .with_file("/src/one.js", "import {shared} from './common'; only_one();")
        .with_file("/src/two.js", "import {shared} from './common'; only_two();")
        .with_file("/src/common.js", "export const shared = 1;");
    let outputs = split_build(&fs, &["/src/one.js", "/src/two.js"]);

    let (_, one_text) = find_containing(&outputs, "only_one");
    assert!(!one_text.contains("only_two"), "{one_text}");
}

#[test]
fn cross_chunk_assignment_pins_writer_to_declaring_chunk() {
    // `setX` assigns the export binding `x`; the pair must share a chunk
    let fs = MemoryFileSystem::new()
        .with_file("/src/e1.js", "import {x} from './d'; console.log(x);")
        .with_file("/src/e2.js", "import {setX} from './d'; setX(9);")
        .with_file(
            "/src/d.js",
            "export let x;\nexport function setX(v) { x = v; }",
        );
    let outputs = split_build(&fs, &["/src/e1.js", "/src/e2.js"]);

    let (setx_path, setx_text) = find_containing(&outputs, "function setX");
    // The declaration of x lives in the same output file as setX
    assert!(setx_text.contains("let x"), "{setx_path}: {setx_text}");
    // And that file is the shared chunk, not the e2 entry
    assert!(setx_path.contains("chunk-"), "{setx_path}");
}

#[test]
fn dynamic_imports_become_chunk_references() {
    let fs = MemoryFileSystem::new()
        .with_file(
            "/src/entry.js",
            "button(() => import('./feature').then(m => m.run()));",
        )
        .with_file("/src/feature.js", "export function run() { lazy_feature(); }");
    let outputs = split_build(&fs, &["/src/entry.js"]);

    let (_, entry_text) = find_containing(&outputs, "button");
    // The dynamic import points at the split chunk file
    assert!(entry_text.contains("import(\"./feature.js\")"), "{entry_text}");
    let (feature_path, _) = find_containing(&outputs, "lazy_feature");
    assert!(feature_path.ends_with("feature.js"), "{feature_path}");
}

#[test]
fn splitting_requires_esm_format() {
    let fs = MemoryFileSystem::new().with_file("/src/entry.js", "console.log(1);");
    let options = BuildOptions {
        entry_points: vec!["/src/entry.js".to_string()],
        bundle: true,
        splitting: true,
        format: OutputFormat::Iife,
        ..BuildOptions::default()
    };
    let log = Log::default();
    build(&options, &fs, &log);
    assert!(log.has_errors());
}
