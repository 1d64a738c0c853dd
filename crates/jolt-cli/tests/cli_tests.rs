//! End-to-end runs of the pipeline against a real directory tree,
//! exercising the same path the binary takes (minus argument parsing).

use std::fs;

use jolt_bundler::build;
use jolt_common::logger::Log;
use jolt_common::options::{BuildOptions, OutputFormat, Target};
use jolt_resolver::OsFileSystem;

fn write(dir: &std::path::Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().replace('\\', "/")
}

#[test]
fn bundles_from_the_real_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let entry = write(
        dir.path(),
        "src/entry.js",
        "import {greet} from './lib/greet';\nconsole.log(greet('world'));\n",
    );
    write(
        dir.path(),
        "src/lib/greet.js",
        "export function greet(name) { return 'hello ' + name; }\n",
    );

    let options = BuildOptions {
        entry_points: vec![entry],
        bundle: true,
        format: OutputFormat::EsModule,
        target: Target::ESNext,
        ..BuildOptions::default()
    };
    let log = Log::default();
    let result = build(&options, &OsFileSystem, &log);
    assert!(!log.has_errors(), "{:?}", log.take());

    let text = String::from_utf8_lossy(&result.output_files[0].contents).into_owned();
    assert!(text.contains("function greet"), "{text}");
    assert!(text.contains("console.log(greet(\"world\"))"), "{text}");
}

#[test]
fn resolves_node_modules_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let entry = write(
        dir.path(),
        "src/entry.js",
        "import {pad} from 'padding';\nuse(pad('x'));\n",
    );
    write(
        dir.path(),
        "node_modules/padding/package.json",
        r#"{"main": "lib/index.js"}"#,
    );
    write(
        dir.path(),
        "node_modules/padding/lib/index.js",
        "export function pad(value) { return ' ' + value; }\n",
    );

    let options = BuildOptions {
        entry_points: vec![entry],
        bundle: true,
        format: OutputFormat::EsModule,
        target: Target::ESNext,
        ..BuildOptions::default()
    };
    let log = Log::default();
    let result = build(&options, &OsFileSystem, &log);
    assert!(!log.has_errors(), "{:?}", log.take());

    let text = String::from_utf8_lossy(&result.output_files[0].contents).into_owned();
    assert!(text.contains("function pad"), "{text}");
}

#[test]
fn reports_errors_with_file_attribution() {
    let dir = tempfile::tempdir().unwrap();
    let entry = write(dir.path(), "src/entry.js", "import './missing';\n");

    let options = BuildOptions {
        entry_points: vec![entry.clone()],
        bundle: true,
        ..BuildOptions::default()
    };
    let log = Log::default();
    build(&options, &OsFileSystem, &log);
    assert!(log.has_errors());
    let diagnostics = log.take();
    assert!(
        diagnostics.iter().any(|d| d.path == entry),
        "{diagnostics:?}"
    );
}
