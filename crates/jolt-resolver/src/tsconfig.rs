//! The TypeScript compiler manifest fields the resolver honors.
//!
//! Only `compilerOptions.baseUrl` affects resolution. The file format
//! tolerates comments and trailing commas, which strict JSON parsing
//! rejects, so those are stripped first.

use serde::Deserialize;

#[derive(Clone, Debug, Default)]
pub struct TsConfig {
    pub base_url: Option<String>,
}

#[derive(Deserialize)]
struct RawTsConfig {
    #[serde(rename = "compilerOptions")]
    compiler_options: Option<RawCompilerOptions>,
}

#[derive(Deserialize)]
struct RawCompilerOptions {
    #[serde(rename = "baseUrl")]
    base_url: Option<String>,
}

impl TsConfig {
    pub fn parse(text: &str) -> Option<TsConfig> {
        let cleaned = strip_jsonc(text);
        let raw: RawTsConfig = serde_json::from_str(&cleaned).ok()?;
        Some(TsConfig {
            base_url: raw.compiler_options.and_then(|options| options.base_url),
        })
    }
}

/// Remove `//` and `/* */` comments plus trailing commas, preserving
/// string contents.
fn strip_jsonc(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                out.push(bytes[i]);
                i += 1;
                while i < bytes.len() {
                    out.push(bytes[i]);
                    match bytes[i] {
                        b'\\' if i + 1 < bytes.len() => {
                            out.push(bytes[i + 1]);
                            i += 2;
                            continue;
                        }
                        b'"' => {
                            i += 1;
                            break;
                        }
                        _ => i += 1,
                    }
                }
            }
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'/' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'*' => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 2usize.min(bytes.len().saturating_sub(i));
            }
            b',' => {
                // Drop the comma if the next meaningful byte closes a
                // container
                let mut j = i + 1;
                while j < bytes.len() && (bytes[j] as char).is_whitespace() {
                    j += 1;
                }
                if j < bytes.len() && (bytes[j] == b'}' || bytes[j] == b']') {
                    i += 1;
                    continue;
                }
                out.push(b',');
                i += 1;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    String::from_utf8(out).unwrap_or_else(|_| text.to_string())
}

#[cfg(test)]
#[path = "../tests/tsconfig_unit.rs"]
mod tests;
