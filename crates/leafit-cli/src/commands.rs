//! Command bodies. Each takes the input text and returns what goes to stdout.

use std::path::Path;

use anyhow::{bail, Context};
use leafit::{
    apply_ops, build, hash_code, is_valid_number, is_valid_string, parse_number, EditOutcome, Editor, EditorConfig,
    TreeOp,
};
use serde_json::Value;
use tracing::{debug, info};

/// Which validator `check` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CheckKind {
    String,
    Number,
}

fn parse_document(input: &str) -> anyhow::Result<Value> {
    serde_json::from_str(input).context("input is not valid JSON")
}

/// The node tree of `input`, pretty printed.
pub fn describe(input: &str) -> anyhow::Result<String> {
    let json = parse_document(input)?;
    let tree = build(&json).context("failed to build node tree")?;
    debug!(nodes = tree.node_count(), "built tree");
    Ok(serde_json::to_string_pretty(&tree)?)
}

/// Runs the script `ops` over `input` and prints the edited document, or its
/// tree when `print_tree` is set.
pub fn edit(input: &str, ops: &str, config: EditorConfig, print_tree: bool) -> anyhow::Result<String> {
    let json = parse_document(input)?;
    let ops: Vec<TreeOp> = serde_json::from_str(ops).context("edit script is not a list of operations")?;

    let mut editor = Editor::new(&json, config).context("failed to build node tree")?;
    let outcomes = apply_ops(&mut editor, &ops)?;
    let skipped = outcomes.iter().filter(|o| **o == EditOutcome::Readonly).count();
    info!(ops = outcomes.len(), skipped, "script applied");

    if print_tree {
        return Ok(serde_json::to_string_pretty(editor.tree())?);
    }
    let json = editor.to_json().context("edited tree does not serialize")?;
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Validates `text`, failing with the reason when it is rejected.
pub fn check(kind: CheckKind, text: &str) -> anyhow::Result<String> {
    match kind {
        CheckKind::String if is_valid_string(text) => Ok("valid string".to_string()),
        CheckKind::String => bail!("invalid string: {text:?} has an unescaped quote or a bad escape"),
        CheckKind::Number if !is_valid_number(text) => bail!("invalid number: {text:?}"),
        CheckKind::Number => match parse_number(text) {
            Some(n) => Ok(format!("valid number: {n}")),
            None => Ok(format!("valid number: {text} (outside the f64 range, cannot be stored)")),
        },
    }
}

/// The structural hash of the tree of `input`.
pub fn hash(input: &str) -> anyhow::Result<String> {
    let json = parse_document(input)?;
    let tree = build(&json).context("failed to build node tree")?;
    Ok(hash_code(&tree).to_string())
}

/// Reads an editor config, as TOML for `.toml` files and JSON otherwise.
pub fn load_config(path: &Path) -> anyhow::Result<EditorConfig> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read config `{}`", path.display()))?;
    parse_config(&text, path.extension().and_then(|ext| ext.to_str()))
        .with_context(|| format!("invalid config `{}`", path.display()))
}

fn parse_config(text: &str, extension: Option<&str>) -> anyhow::Result<EditorConfig> {
    let value: Value = match extension {
        Some(ext) if ext.eq_ignore_ascii_case("toml") => toml::from_str(text)?,
        _ => serde_json::from_str(text)?,
    };
    Ok(EditorConfig::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe_prints_tree() {
        let out = describe(r#"{"key": "value"}"#).unwrap();
        let tree: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            tree,
            json!({
                "type": "object",
                "path": "",
                "children": [{"type": "string", "path": "key", "name": "key", "value": "value"}],
                "isRoot": true,
            })
        );
    }

    #[test]
    fn test_describe_rejects_bad_input() {
        assert!(describe("{").is_err());
        let err = describe(r#"{"a": "bad \\q"}"#).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid JSON string at path \"a\""));
    }

    #[test]
    fn test_edit_applies_script() {
        let ops = r#"[
            {"op": "add", "parent": "arr", "value": 3},
            {"op": "delete", "path": "key"}
        ]"#;
        let out = edit(r#"{"key": 1, "arr": [1, 2]}"#, ops, EditorConfig::default(), false).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&out).unwrap(), json!({"arr": [1, 2, 3]}));

        let out = edit(r#"{"key": 1}"#, "[]", EditorConfig::default(), true).unwrap();
        assert!(out.contains("\"isRoot\": true"));
    }

    #[test]
    fn test_edit_respects_readonly_config() {
        let config = parse_config("readonly = [\"^key\"]", Some("toml")).unwrap();
        let ops = r#"[{"op": "delete", "path": "key"}]"#;
        let out = edit(r#"{"key": 1}"#, ops, config, false).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&out).unwrap(), json!({"key": 1}));
    }

    #[test]
    fn test_edit_reports_failing_op() {
        let ops = r#"[{"op": "delete", "path": "missing"}]"#;
        let err = edit(r#"{"key": 1}"#, ops, EditorConfig::default(), false).unwrap_err();
        assert!(err.to_string().contains("Operation 0 (delete)"));
    }

    #[test]
    fn test_check() {
        assert_eq!(check(CheckKind::String, "plain").unwrap(), "valid string");
        assert!(check(CheckKind::String, "a \" b").is_err());
        assert_eq!(check(CheckKind::Number, "42").unwrap(), "valid number: 42");
        assert!(check(CheckKind::Number, "4x").is_err());
        assert_eq!(
            check(CheckKind::Number, "1e+999").unwrap(),
            "valid number: 1e+999 (outside the f64 range, cannot be stored)"
        );
        assert!(check(CheckKind::Number, "1e999").is_err());
    }

    #[test]
    fn test_hash_matches_library() {
        let tree = build(&json!({"a": [1]})).unwrap();
        assert_eq!(hash(r#"{"a": [1]}"#).unwrap(), hash_code(&tree).to_string());
    }

    #[test]
    fn test_config_formats() {
        let config = parse_config(r#"{"collapsed": true, "disableWarnings": true}"#, Some("json")).unwrap();
        assert!(config.should_collapse("any"));
        assert!(config.disable_warnings);

        let config = parse_config("collapsed = [\"^deep\"]\n", Some("TOML")).unwrap();
        assert!(config.should_collapse("deep.x"));
        assert!(!config.should_collapse("flat"));

        assert!(parse_config(r#"{"readonly": ["("]}"#, None).is_err());
    }
}
