//! Per-format configuration file loaders.
//!
//! Dispatch is by file extension:
//!
//! - `.js` is evaluated through the module resolver seam, freshly on every
//!   load so on-disk edits are picked up across repeated runs;
//! - `.json` has C/JS-style comments stripped before parsing; a
//!   `package.json` yields its `eslintConfig` field (absent field yields
//!   nothing);
//! - `.yaml` / `.yml` is safe YAML; a completely empty file becomes an
//!   empty record;
//! - anything else (the legacy extension-less `.eslintrc`) is YAML of the
//!   comment-stripped content.
//!
//! Read and parse failures wrap as
//! `"Cannot read config file: <path>\nError: <original>"`; JSON parse
//! failures additionally carry the `failed-to-read-json` template.

use std::path::Path;

use serde_json::Value;

use crate::element::ConfigBody;
use crate::error::ConfigError;
use crate::resolver::ModuleResolver;

/// Load a configuration file, dispatching on its extension.
///
/// Returns `Ok(None)` for a `package.json` without an `eslintConfig`
/// field.
///
/// # Errors
///
/// [`ConfigError::FileNotFound`] when the file is missing;
/// [`ConfigError::ReadFailed`] / [`ConfigError::ReadJsonFailed`] on read
/// and parse failures; resolver errors for `.js` configs.
pub(crate) fn load_config_file(
    path: &Path,
    resolver: &dyn ModuleResolver,
) -> Result<Option<ConfigBody>, ConfigError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    log::debug!("Loading config file: {}", path.display());

    let body = match extension.as_str() {
        "js" => load_js_config_file(path, resolver)?,
        "json" if file_name == "package.json" => match load_package_json_config(path)? {
            Some(body) => body,
            None => return Ok(None),
        },
        "json" => load_json_config_file(path)?,
        "yaml" | "yml" => load_yaml_config_file(path)?,
        _ => load_legacy_config_file(path)?,
    };

    Ok(Some(body))
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|error| {
        if error.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::ReadFailed {
                path: path.to_path_buf(),
                message: error.to_string(),
            }
        }
    })
}

fn body_from_value(value: Value, path: &Path) -> Result<ConfigBody, ConfigError> {
    ConfigBody::from_value(value).map_err(|message| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        message,
    })
}

/// A `.js` config: the module's evaluated value is the body. Evaluation
/// goes through the resolver, which must bypass any module cache.
fn load_js_config_file(
    path: &Path,
    resolver: &dyn ModuleResolver,
) -> Result<ConfigBody, ConfigError> {
    let value = resolver.load_config_module(path)?;
    body_from_value(value, path)
}

fn load_json_config_file(path: &Path) -> Result<ConfigBody, ConfigError> {
    let content = read_file(path)?;
    let value: Value =
        serde_json::from_str(&strip_comments(&content)).map_err(|error| {
            ConfigError::ReadJsonFailed {
                path: path.to_path_buf(),
                message: error.to_string(),
            }
        })?;
    body_from_value(value, path)
}

/// The `eslintConfig` field of a package manifest. `Ok(None)` when the
/// field is absent.
fn load_package_json_config(path: &Path) -> Result<Option<ConfigBody>, ConfigError> {
    let content = read_file(path)?;
    let mut manifest: Value =
        serde_json::from_str(&strip_comments(&content)).map_err(|error| {
            ConfigError::ReadJsonFailed {
                path: path.to_path_buf(),
                message: error.to_string(),
            }
        })?;

    match manifest.get_mut("eslintConfig") {
        Some(config) => Ok(Some(body_from_value(config.take(), path)?)),
        None => Ok(None),
    }
}

fn load_yaml_config_file(path: &Path) -> Result<ConfigBody, ConfigError> {
    let content = read_file(path)?;
    parse_yaml_body(&content, path)
}

/// Legacy extension-less config: YAML of the comment-stripped content.
fn load_legacy_config_file(path: &Path) -> Result<ConfigBody, ConfigError> {
    let content = read_file(path)?;
    parse_yaml_body(&strip_comments(&content), path)
}

fn parse_yaml_body(content: &str, path: &Path) -> Result<ConfigBody, ConfigError> {
    // An empty file parses as null, which becomes the empty body.
    let value: Value = serde_yaml::from_str(content).map_err(|error| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;
    body_from_value(value, path)
}

/// Strip `//` and `/* */` comments from JSON-ish text, leaving string
/// literals intact. Stripped spans are replaced with spaces so that parse
/// error positions stay meaningful.
pub(crate) fn strip_comments(text: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Code,
        InString,
        LineComment,
        BlockComment,
    }

    let mut output = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '"' => {
                    state = State::InString;
                    output.push(c);
                }
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::LineComment;
                    output.push_str("  ");
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                    output.push_str("  ");
                }
                _ => output.push(c),
            },
            State::InString => {
                output.push(c);
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            output.push(escaped);
                        }
                    }
                    '"' => state = State::Code,
                    _ => {}
                }
            }
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                    output.push(c);
                } else {
                    output.push(' ');
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                    output.push_str("  ");
                } else if c == '\n' {
                    output.push(c);
                } else {
                    output.push(' ');
                }
            }
        }
    }

    output
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tempfile::tempdir;

    use crate::resolver::NullResolver;

    #[test]
    fn test_strip_line_comments() {
        let input = indoc! {r#"
            {
                // severity
                "a": 1
            }
        "#};
        let stripped = strip_comments(input);
        let value: Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_strip_block_comments() {
        let stripped = strip_comments(r#"{ "a": /* inline */ 1 }"#);
        let value: Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_comments_inside_strings_survive() {
        let stripped = strip_comments(r#"{ "url": "http://example.com/*x*/" }"#);
        let value: Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["url"], "http://example.com/*x*/");
    }

    #[test]
    fn test_escaped_quote_in_string() {
        let stripped = strip_comments(r#"{ "a": "say \"hi\" // not a comment" }"#);
        let value: Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["a"], "say \"hi\" // not a comment");
    }

    #[test]
    fn test_load_json_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".eslintrc.json");
        std::fs::write(
            &path,
            indoc! {r#"
                {
                    // keep it strict
                    "rules": { "semi": "error" }
                }
            "#},
        )
        .unwrap();

        let body = load_config_file(&path, &NullResolver).unwrap().unwrap();
        assert_eq!(body.rules.unwrap()["semi"], serde_json::json!("error"));
    }

    #[test]
    fn test_load_json_failure_wraps_message() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".eslintrc.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_config_file(&path, &NullResolver).unwrap_err();
        assert_eq!(err.message_template(), Some("failed-to-read-json"));
        let text = err.to_string();
        assert!(text.starts_with(&format!("Cannot read config file: {}", path.display())));
        assert!(text.contains("\nError: "));
    }

    #[test]
    fn test_load_yaml_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".eslintrc.yaml");
        std::fs::write(
            &path,
            indoc! {"
                env:
                  node: true
                rules:
                  semi: error
            "},
        )
        .unwrap();

        let body = load_config_file(&path, &NullResolver).unwrap().unwrap();
        assert_eq!(body.env.unwrap()["node"], serde_json::json!(true));
    }

    #[test]
    fn test_empty_yaml_is_empty_body() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".eslintrc.yml");
        std::fs::write(&path, "").unwrap();

        let body = load_config_file(&path, &NullResolver).unwrap().unwrap();
        assert_eq!(body, ConfigBody::default());
    }

    #[test]
    fn test_legacy_file_is_yaml_with_comments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".eslintrc");
        std::fs::write(
            &path,
            indoc! {r#"
                {
                    // legacy files allow comments
                    "rules": { "semi": 2 }
                }
            "#},
        )
        .unwrap();

        let body = load_config_file(&path, &NullResolver).unwrap().unwrap();
        assert_eq!(body.rules.unwrap()["semi"], serde_json::json!(2));
    }

    #[test]
    fn test_package_json_with_config_field() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(
            &path,
            r#"{ "name": "x", "eslintConfig": { "rules": { "semi": "off" } } }"#,
        )
        .unwrap();

        let body = load_config_file(&path, &NullResolver).unwrap().unwrap();
        assert_eq!(body.rules.unwrap()["semi"], serde_json::json!("off"));
    }

    #[test]
    fn test_package_json_without_config_field() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, r#"{ "name": "x" }"#).unwrap();

        assert!(load_config_file(&path, &NullResolver).unwrap().is_none());
    }

    #[test]
    fn test_missing_file_is_distinguishable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".eslintrc.json");
        let err = load_config_file(&path, &NullResolver).unwrap_err();
        assert!(err.is_file_not_found());
    }
}
