use super::*;

#[test]
fn parses_base_url() {
    let config = TsConfig::parse(r#"{"compilerOptions": {"baseUrl": "./src"}}"#).unwrap();
    assert_eq!(config.base_url.as_deref(), Some("./src"));
}

#[test]
fn tolerates_comments_and_trailing_commas() {
    let text = r#"{
        // line comment
        "compilerOptions": {
            /* block comment */
            "baseUrl": "src",
        },
    }"#;
    let config = TsConfig::parse(text).unwrap();
    assert_eq!(config.base_url.as_deref(), Some("src"));
}

#[test]
fn missing_base_url_is_none() {
    let config = TsConfig::parse(r#"{"compilerOptions": {}}"#).unwrap();
    assert!(config.base_url.is_none());
}

#[test]
fn comment_markers_inside_strings_survive() {
    let config =
        TsConfig::parse(r#"{"compilerOptions": {"baseUrl": "a//b"}}"#).unwrap();
    assert_eq!(config.base_url.as_deref(), Some("a//b"));
}
