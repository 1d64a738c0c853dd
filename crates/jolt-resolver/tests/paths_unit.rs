use super::*;

#[test]
fn normalize_collapses_dot_segments() {
    assert_eq!(normalize_path("/a/./b/../c"), "/a/c");
    assert_eq!(normalize_path("/a//b"), "/a/b");
    assert_eq!(normalize_path("/../x"), "/x");
    assert_eq!(normalize_path("/"), "/");
}

#[test]
fn join_handles_relative_and_absolute() {
    assert_eq!(join_paths("/src", "./util.js"), "/src/util.js");
    assert_eq!(join_paths("/src/deep", "../util.js"), "/src/util.js");
    assert_eq!(join_paths("/src", "/other/x.js"), "/other/x.js");
}

#[test]
fn parent_dir_stops_at_root() {
    assert_eq!(parent_dir("/a/b/c.js"), "/a/b");
    assert_eq!(parent_dir("/a"), "/");
    assert_eq!(parent_dir("/"), "/");
}

#[test]
fn package_roots_include_scopes() {
    assert_eq!(
        package_root_of("/p/node_modules/lib/dist/index.js").as_deref(),
        Some("/p/node_modules/lib")
    );
    assert_eq!(
        package_root_of("/p/node_modules/@scope/lib/index.js").as_deref(),
        Some("/p/node_modules/@scope/lib")
    );
    assert_eq!(package_root_of("/p/src/index.js"), None);
}
