use indexmap::IndexMap;

use jolt_bundler::build;
use jolt_common::logger::Log;
use jolt_common::options::{BuildOptions, OutputFormat, Platform, Target};
use jolt_resolver::MemoryFileSystem;

fn options_for(entries: &[&str]) -> BuildOptions {
    BuildOptions {
        entry_points: entries.iter().map(|e| e.to_string()).collect(),
        bundle: true,
        format: OutputFormat::EsModule,
        target: Target::ESNext,
        ..BuildOptions::default()
    }
}

fn bundle(fs: &MemoryFileSystem, options: &BuildOptions) -> (String, Log) {
    let log = Log::default();
    let result = build(options, fs, &log);
    let text = result
        .output_files
        .first()
        .map(|file| String::from_utf8_lossy(&file.contents).into_owned())
        .unwrap_or_default();
    (text, log)
}

fn bundle_ok(fs: &MemoryFileSystem, options: &BuildOptions) -> String {
    let (text, log) = bundle(fs, options);
    let diagnostics = log.take();
    let errors: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.level == jolt_common::logger::LogLevel::Error)
        .collect();
    assert!(errors.is_empty(), "unexpected errors: {errors:?}\n{text}");
    text
}

#[test]
fn simple_esm_bundles_to_bare_identifiers() {
    let fs = MemoryFileSystem::new()
        .with_file(
            "/src/entry.js",
            "import {fn} from './foo'; console.log(fn());",
        )
        .with_file("/src/foo.js", "export function fn() { return 123; }");
    let out = bundle_ok(&fs, &options_for(&["/src/entry.js"]));

    // One function declaration, called by name, no CommonJS machinery
    assert_eq!(out.matches("function fn").count(), 1, "{out}");
    assert!(out.contains("console.log(fn())"), "{out}");
    assert!(!out.contains("require"), "{out}");
}

#[test]
fn hybrid_interop_goes_through_the_exports_object() {
    let fs = MemoryFileSystem::new()
        .with_file(
            "/src/entry.js",
            "import {fn} from './foo'; console.log(fn());",
        )
        .with_file("/src/foo.js", "exports.fn = function() { return 123; };");
    let out = bundle_ok(&fs, &options_for(&["/src/entry.js"]));

    // The CommonJS module is wrapped and required lazily
    assert!(out.contains("__commonJS"), "{out}");
    assert!(out.contains("require_foo"), "{out}");
    // The call reads a property, not a bare identifier
    assert!(out.contains(".fn()"), "{out}");
    assert!(!out.contains("console.log(fn())"), "{out}");
}

#[test]
fn define_prunes_dead_branches_from_the_graph() {
    let fs = MemoryFileSystem::new()
        .with_file(
            "/src/entry.js",
            "if (process.env.NODE_ENV === 'production') require('./prod');\n\
             else require('./dev');",
        )
        .with_file("/src/prod.js", "console.log('prod build');");
    // `/src/dev.js` deliberately does not exist: a scan of it would fail
    let mut options = options_for(&["/src/entry.js"]);
    options.define = IndexMap::from_iter([(
        "process.env.NODE_ENV".to_string(),
        "\"production\"".to_string(),
    )]);
    let out = bundle_ok(&fs, &options);
    assert!(out.contains("prod build"), "{out}");
    assert!(!out.contains("dev"), "{out}");
}

#[test]
fn unused_exports_are_tree_shaken() {
    let fs = MemoryFileSystem::new()
        .with_file("/src/entry.js", "import {used} from './lib'; used();")
        .with_file(
            "/src/lib.js",
            "export function used() {}\nexport function unused() { heavy(); }",
        );
    let out = bundle_ok(&fs, &options_for(&["/src/entry.js"]));
    assert!(out.contains("function used"), "{out}");
    assert!(!out.contains("function unused"), "{out}");
    assert!(!out.contains("heavy"), "{out}");
}

#[test]
fn side_effect_statements_survive_tree_shaking() {
    let fs = MemoryFileSystem::new()
        .with_file("/src/entry.js", "import './effects';")
        .with_file("/src/effects.js", "install(); export const unused = 1;");
    let out = bundle_ok(&fs, &options_for(&["/src/entry.js"]));
    assert!(out.contains("install()"), "{out}");
    assert!(!out.contains("unused = 1"), "{out}");
}

#[test]
fn export_star_expands_named_exports() {
    let fs = MemoryFileSystem::new()
        .with_file("/src/entry.js", "import {a, b} from './all'; use(a, b);")
        .with_file("/src/all.js", "export * from './one'; export * from './two';")
        .with_file("/src/one.js", "export const a = 1;")
        .with_file("/src/two.js", "export const b = 2;");
    let out = bundle_ok(&fs, &options_for(&["/src/entry.js"]));
    assert!(out.contains("a = 1"), "{out}");
    assert!(out.contains("b = 2"), "{out}");
}

#[test]
fn missing_export_is_an_error() {
    let fs = MemoryFileSystem::new()
        .with_file("/src/entry.js", "import {nope} from './lib'; nope();")
        .with_file("/src/lib.js", "export const yes = 1;");
    let (_, log) = bundle(&fs, &options_for(&["/src/entry.js"]));
    let diagnostics = log.take();
    assert!(
        diagnostics
            .iter()
            .any(|d| d.text.contains("no matching export")),
        "{diagnostics:?}"
    );
}

#[test]
fn missing_module_is_an_error() {
    let fs = MemoryFileSystem::new().with_file("/src/entry.js", "import './gone';");
    let (_, log) = bundle(&fs, &options_for(&["/src/entry.js"]));
    assert!(log.has_errors());
    let diagnostics = log.take();
    assert!(
        diagnostics.iter().any(|d| d.text.contains("could not resolve")),
        "{diagnostics:?}"
    );
}

#[test]
fn json_files_become_default_exports() {
    let fs = MemoryFileSystem::new()
        .with_file(
            "/src/entry.js",
            "import config from './config.json'; use(config.port);",
        )
        .with_file("/src/config.json", r#"{"port": 8080, "debug": false}"#);
    let out = bundle_ok(&fs, &options_for(&["/src/entry.js"]));
    assert!(out.contains("8080"), "{out}");
}

#[test]
fn text_loader_exports_the_contents() {
    let fs = MemoryFileSystem::new()
        .with_file("/src/entry.js", "import body from './message.txt'; use(body);")
        .with_file("/src/message.txt", "hello bundler");
    let out = bundle_ok(&fs, &options_for(&["/src/entry.js"]));
    assert!(out.contains("hello bundler"), "{out}");
}

#[test]
fn iife_format_wraps_the_bundle() {
    let fs = MemoryFileSystem::new().with_file("/src/entry.js", "console.log(1);");
    let mut options = options_for(&["/src/entry.js"]);
    options.format = OutputFormat::Iife;
    let out = bundle_ok(&fs, &options);
    assert!(out.starts_with("(() => {"), "{out}");
    assert!(out.trim_end().ends_with("})();"), "{out}");
}

#[test]
fn esm_entry_exports_are_reexported() {
    let fs = MemoryFileSystem::new()
        .with_file("/src/entry.js", "export function api() { return 1; }");
    let out = bundle_ok(&fs, &options_for(&["/src/entry.js"]));
    assert!(out.contains("export { api }"), "{out}");
}

#[test]
fn commonjs_requires_are_idempotent_by_construction() {
    let fs = MemoryFileSystem::new()
        .with_file(
            "/src/entry.js",
            "const a = require('./counted'); const b = require('./counted'); use(a, b);",
        )
        .with_file("/src/counted.js", "exports.n = (globalThis.count = (globalThis.count || 0) + 1);");
    let out = bundle_ok(&fs, &options_for(&["/src/entry.js"]));
    // Both call sites share one wrapper
    assert_eq!(out.matches("__commonJS(").count(), 1, "{out}");
    assert!(out.matches("require_counted()").count() >= 2, "{out}");
}

#[test]
fn namespace_imports_materialize_exports_objects() {
    let fs = MemoryFileSystem::new()
        .with_file("/src/entry.js", "import * as lib from './lib'; use(lib);")
        .with_file("/src/lib.js", "export const value = 1;");
    let out = bundle_ok(&fs, &options_for(&["/src/entry.js"]));
    assert!(out.contains("__export("), "{out}");
    assert!(out.contains("value: () => value"), "{out}");
}

#[test]
fn namespace_property_access_narrows_to_named_import() {
    let fs = MemoryFileSystem::new()
        .with_file("/src/entry.js", "import * as lib from './lib'; use(lib.a);")
        .with_file(
            "/src/lib.js",
            "export const a = 1; export const dropped = 999999;",
        );
    let out = bundle_ok(&fs, &options_for(&["/src/entry.js"]));
    // Accessing only `.a` leaves the other export behind
    assert!(out.contains("a = 1"), "{out}");
    assert!(!out.contains("999999"), "{out}");
}

#[test]
fn node_builtins_stay_external_on_node_platform() {
    let fs = MemoryFileSystem::new()
        .with_file("/src/entry.js", "import {readFile} from 'fs'; readFile('x');");
    let mut options = options_for(&["/src/entry.js"]);
    options.platform = Platform::Node;
    let out = bundle_ok(&fs, &options);
    assert!(out.contains("import"), "{out}");
    assert!(out.contains("\"fs\""), "{out}");
}

#[test]
fn node_builtins_error_on_browser_platform() {
    let fs = MemoryFileSystem::new()
        .with_file("/src/entry.js", "import {readFile} from 'fs'; readFile('x');");
    let (_, log) = bundle(&fs, &options_for(&["/src/entry.js"]));
    assert!(log.has_errors());
}

#[test]
fn disabled_browser_modules_become_empty_stubs() {
    let fs = MemoryFileSystem::new()
        .with_file("/p/package.json", r#"{"browser": {"net-helper": false}}"#)
        .with_file(
            "/p/src/entry.js",
            "import * as net from 'net-helper'; use(net);",
        );
    let out = bundle_ok(&fs, &options_for(&["/p/src/entry.js"]));
    // The stub contributes nothing but resolution succeeds
    assert!(out.contains("use("), "{out}");
}

#[test]
fn runtime_helpers_are_tree_shaken() {
    let fs = MemoryFileSystem::new().with_file("/src/entry.js", "console.log(1);");
    let out = bundle_ok(&fs, &options_for(&["/src/entry.js"]));
    // No helper is referenced, so none appears
    assert!(!out.contains("__commonJS"), "{out}");
    assert!(!out.contains("__toESM"), "{out}");
    assert!(!out.contains("__publicField"), "{out}");
}

#[test]
fn colliding_names_across_files_are_renamed() {
    let fs = MemoryFileSystem::new()
        .with_file(
            "/src/entry.js",
            "import {a} from './one'; import {b} from './two'; use(a, b);",
        )
        .with_file("/src/one.js", "function impl() { return 1; }\nexport const a = impl();")
        .with_file("/src/two.js", "function impl() { return 2; }\nexport const b = impl();");
    let out = bundle_ok(&fs, &options_for(&["/src/entry.js"]));
    assert!(out.contains("function impl()"), "{out}");
    assert!(out.contains("function impl2()"), "{out}");
}

#[test]
fn minified_identifiers_shrink_the_output() {
    let fs = MemoryFileSystem::new().with_file(
        "/src/entry.js",
        "function calculate(alpha, beta) { return alpha + beta; } \
         console.log(calculate(1, 2));",
    );
    let mut options = options_for(&["/src/entry.js"]);
    options.minify_identifiers = true;
    let out = bundle_ok(&fs, &options);
    assert!(!out.contains("alpha"), "{out}");
    assert!(!out.contains("calculate"), "{out}");
    // Globals survive untouched
    assert!(out.contains("console.log"), "{out}");
}

#[test]
fn inline_source_maps_are_appended() {
    let fs = MemoryFileSystem::new().with_file("/src/entry.js", "console.log(1);");
    let mut options = options_for(&["/src/entry.js"]);
    options.source_map = jolt_common::options::SourceMapMode::Inline;
    let out = bundle_ok(&fs, &options);
    assert!(
        out.contains("//# sourceMappingURL=data:application/json;base64,"),
        "{out}"
    );
}

#[test]
fn external_source_maps_are_separate_files() {
    let fs = MemoryFileSystem::new().with_file("/src/entry.js", "console.log(1);");
    let mut options = options_for(&["/src/entry.js"]);
    options.source_map = jolt_common::options::SourceMapMode::External;
    let log = Log::default();
    let result = build(&options, &fs, &log);
    assert!(!log.has_errors());
    assert_eq!(result.output_files.len(), 2);
    let map = &result.output_files[1];
    assert!(map.path.ends_with(".map"));
    let json: serde_json::Value =
        serde_json::from_slice(&map.contents).expect("valid source map JSON");
    assert_eq!(json["version"], 3);
    assert!(json["sources"].as_array().is_some());
}

#[test]
fn cyclic_imports_terminate() {
    let fs = MemoryFileSystem::new()
        .with_file("/src/entry.js", "import {a} from './a'; use(a);")
        .with_file("/src/a.js", "import {b} from './b'; export const a = () => b;")
        .with_file("/src/b.js", "import {a} from './a'; export const b = () => a;");
    let out = bundle_ok(&fs, &options_for(&["/src/entry.js"]));
    assert!(out.contains("use("), "{out}");
}

#[test]
fn without_bundle_flag_files_compile_independently() {
    let fs = MemoryFileSystem::new().with_file(
        "/src/entry.js",
        "import {x} from './dep'; console.log(x ?? 0);",
    );
    let mut options = options_for(&["/src/entry.js"]);
    options.bundle = false;
    options.target = Target::ES2019;
    let out = bundle_ok(&fs, &options);
    // The import survives verbatim; the nullish coalescing lowered
    assert!(out.contains("import"), "{out}");
    assert!(out.contains("./dep"), "{out}");
    assert!(!out.contains("??"), "{out}");
}
