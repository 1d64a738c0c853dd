use jolt_common::options::{LoaderKind, Platform};
use jolt_resolver::{MemoryFileSystem, ResolveResult, Resolver, ResolverOptions};

fn default_options() -> ResolverOptions {
    ResolverOptions {
        extension_order: vec![
            ".tsx".to_string(),
            ".ts".to_string(),
            ".jsx".to_string(),
            ".js".to_string(),
            ".json".to_string(),
        ],
        platform: Platform::Browser,
        external: Vec::new(),
        loader_overrides: Default::default(),
    }
}

fn found(path: &str, loader: LoaderKind) -> ResolveResult {
    ResolveResult::Found {
        path: path.to_string(),
        loader,
    }
}

#[test]
fn relative_specifiers_join_and_normalize() {
    let fs = MemoryFileSystem::new().with_file("/src/util.js", "");
    let resolver = Resolver::new(&fs, default_options());
    assert_eq!(
        resolver.resolve("/src", "./util.js"),
        found("/src/util.js", LoaderKind::Js)
    );
    assert_eq!(
        resolver.resolve("/src/nested", "../util.js"),
        found("/src/util.js", LoaderKind::Js)
    );
}

#[test]
fn extensionless_imports_probe_in_order() {
    let fs = MemoryFileSystem::new()
        .with_file("/src/a.ts", "")
        .with_file("/src/a.js", "");
    let resolver = Resolver::new(&fs, default_options());
    // .ts precedes .js in the configured order
    assert_eq!(
        resolver.resolve("/src", "./a"),
        found("/src/a.ts", LoaderKind::Ts)
    );
}

#[test]
fn directory_imports_use_index() {
    let fs = MemoryFileSystem::new().with_file("/src/lib/index.jsx", "");
    let resolver = Resolver::new(&fs, default_options());
    assert_eq!(
        resolver.resolve("/src", "./lib"),
        found("/src/lib/index.jsx", LoaderKind::Jsx)
    );
}

#[test]
fn package_main_field_wins_over_index() {
    let fs = MemoryFileSystem::new()
        .with_file("/p/node_modules/lib/package.json", r#"{"main": "dist/entry.js"}"#)
        .with_file("/p/node_modules/lib/dist/entry.js", "")
        .with_file("/p/node_modules/lib/index.js", "");
    let resolver = Resolver::new(&fs, default_options());
    assert_eq!(
        resolver.resolve("/p/src", "lib"),
        found("/p/node_modules/lib/dist/entry.js", LoaderKind::Js)
    );
}

#[test]
fn node_modules_search_walks_up() {
    let fs = MemoryFileSystem::new()
        .with_file("/p/node_modules/dep/index.js", "")
        .with_file("/p/src/deep/nested/file.js", "");
    let resolver = Resolver::new(&fs, default_options());
    assert_eq!(
        resolver.resolve("/p/src/deep/nested", "dep"),
        found("/p/node_modules/dep/index.js", LoaderKind::Js)
    );
}

#[test]
fn browser_map_redirects_module_names() {
    let fs = MemoryFileSystem::new()
        .with_file(
            "/p/package.json",
            r#"{"browser": {"fancy-net": "./shims/net.js"}}"#,
        )
        .with_file("/p/shims/net.js", "")
        .with_file("/p/src/app.js", "");
    let resolver = Resolver::new(&fs, default_options());
    assert_eq!(
        resolver.resolve("/p/src", "fancy-net"),
        found("/p/shims/net.js", LoaderKind::Js)
    );
}

#[test]
fn browser_map_disables_modules() {
    let fs = MemoryFileSystem::new()
        .with_file("/p/package.json", r#"{"browser": {"heavy-dep": false}}"#)
        .with_file("/p/src/app.js", "");
    let resolver = Resolver::new(&fs, default_options());
    assert_eq!(resolver.resolve("/p/src", "heavy-dep"), ResolveResult::Disabled);
}

#[test]
fn browser_map_ignored_on_node_platform() {
    let fs = MemoryFileSystem::new()
        .with_file("/p/package.json", r#"{"browser": {"dep": false}}"#)
        .with_file("/p/node_modules/dep/index.js", "");
    let mut options = default_options();
    options.platform = Platform::Node;
    let resolver = Resolver::new(&fs, options);
    assert_eq!(
        resolver.resolve("/p/src", "dep"),
        found("/p/node_modules/dep/index.js", LoaderKind::Js)
    );
}

#[test]
fn browser_entry_replaces_main() {
    let fs = MemoryFileSystem::new()
        .with_file(
            "/p/node_modules/lib/package.json",
            r#"{"main": "node.js", "browser": "web.js"}"#,
        )
        .with_file("/p/node_modules/lib/node.js", "")
        .with_file("/p/node_modules/lib/web.js", "");
    let resolver = Resolver::new(&fs, default_options());
    assert_eq!(
        resolver.resolve("/p/src", "lib"),
        found("/p/node_modules/lib/web.js", LoaderKind::Js)
    );
}

#[test]
fn node_builtins_are_external_on_node() {
    let fs = MemoryFileSystem::new();
    let mut options = default_options();
    options.platform = Platform::Node;
    let resolver = Resolver::new(&fs, options);
    assert_eq!(resolver.resolve("/p", "fs"), ResolveResult::External);
    assert_eq!(resolver.resolve("/p", "path"), ResolveResult::External);
}

#[test]
fn node_builtins_fail_on_browser() {
    let fs = MemoryFileSystem::new();
    let resolver = Resolver::new(&fs, default_options());
    assert_eq!(resolver.resolve("/p", "fs"), ResolveResult::BuiltinNotAvailable);
}

#[test]
fn configured_externals_stay_external() {
    let fs = MemoryFileSystem::new();
    let mut options = default_options();
    options.external.push("fs".to_string());
    options.external.push("left-pad".to_string());
    let resolver = Resolver::new(&fs, options);
    assert_eq!(resolver.resolve("/p", "fs"), ResolveResult::External);
    assert_eq!(resolver.resolve("/p", "left-pad"), ResolveResult::External);
}

#[test]
fn base_url_roots_bare_specifiers() {
    let fs = MemoryFileSystem::new()
        .with_file("/p/tsconfig.json", r#"{"compilerOptions": {"baseUrl": "./src"}}"#)
        .with_file("/p/src/components/button.ts", "");
    let resolver = Resolver::new(&fs, default_options());
    assert_eq!(
        resolver.resolve("/p/src/pages", "components/button"),
        found("/p/src/components/button.ts", LoaderKind::Ts)
    );
}

#[test]
fn loader_overrides_apply() {
    let fs = MemoryFileSystem::new().with_file("/src/data.json", "{}");
    let mut options = default_options();
    options
        .loader_overrides
        .insert("json".to_string(), LoaderKind::Text);
    let resolver = Resolver::new(&fs, options);
    assert_eq!(
        resolver.resolve("/src", "./data.json"),
        found("/src/data.json", LoaderKind::Text)
    );
}

#[test]
fn missing_modules_are_not_found() {
    let fs = MemoryFileSystem::new();
    let resolver = Resolver::new(&fs, default_options());
    assert_eq!(resolver.resolve("/src", "./missing"), ResolveResult::NotFound);
    assert_eq!(resolver.resolve("/src", "nothing"), ResolveResult::NotFound);
}
