//! Edit scripts: a serializable list of tree operations run through an
//! [`Editor`], so readonly rules apply as they do to interactive edits.
//!
//! Operations address nodes by node path, not JSON Pointer:
//!
//! ```json
//! [
//!   {"op": "add", "parent": "arr", "value": {"k": "v"}},
//!   {"op": "update", "path": "key", "name": "renamed", "value": 1},
//!   {"op": "delete", "path": "arr.0"},
//!   {"op": "paste", "from": "arr.1", "parent": "", "index": null}
//! ]
//! ```

use leafit_path::{validate_path, PathError, Segment};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::describe::{describe, DescribeError, DescribeOptions};
use crate::edit::renamed_path;
use crate::editor::{next_index, EditOutcome, Editor, EditorError};
use crate::host::HostValue;
use crate::node::Node;
use crate::plugin::Nesting;
use crate::tree::{find_parent, rebase_children};
use crate::validate::is_valid_string;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum TreeOp {
    /// Adds `value` under `parent`. Object parents need a `key`, array
    /// parents append.
    Add {
        parent: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        value: Value,
    },
    /// Replaces the node at `path` with `value`, renaming object children
    /// when `name` is given.
    Update {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        value: Value,
    },
    Delete { path: String },
    /// Copies the node at `from` under `parent`.
    Paste {
        from: String,
        parent: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },
}

impl TreeOp {
    pub fn name(&self) -> &'static str {
        match self {
            TreeOp::Add { .. } => "add",
            TreeOp::Update { .. } => "update",
            TreeOp::Delete { .. } => "delete",
            TreeOp::Paste { .. } => "paste",
        }
    }
}

#[derive(Debug, Error)]
pub enum OpError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("Node at path \"{0}\" not found.")]
    UnknownPath(String),
    #[error("Adding to the object at path \"{0}\" requires a key")]
    MissingKey(String),
    #[error("Invalid key {0:?}")]
    InvalidKey(String),
    #[error(transparent)]
    Describe(#[from] DescribeError),
    #[error(transparent)]
    Editor(#[from] EditorError),
}

/// An operation of a script failed. Operations before it stay applied.
#[derive(Debug, Error)]
#[error("Operation {index} ({op}) failed: {source}")]
pub struct ScriptError {
    pub index: usize,
    pub op: &'static str,
    #[source]
    pub source: OpError,
}

/// Runs `ops` in order, stopping at the first failure.
pub fn apply_ops(editor: &mut Editor, ops: &[TreeOp]) -> Result<Vec<EditOutcome>, ScriptError> {
    ops.iter()
        .enumerate()
        .map(|(index, op)| {
            apply_op(editor, op).map_err(|source| ScriptError {
                index,
                op: op.name(),
                source,
            })
        })
        .collect()
}

pub fn apply_op(editor: &mut Editor, op: &TreeOp) -> Result<EditOutcome, OpError> {
    debug!(op = op.name(), "applying operation");
    match op {
        TreeOp::Add { parent, key, value } => {
            let parent = lookup(editor, parent)?;
            let segment = match (editor.plugins().nesting_of(&parent.kind), key) {
                (Nesting::Array, _) => Segment::Index(next_index(&parent)),
                (_, Some(key)) => Segment::Key(key.as_str()),
                (_, None) => return Err(OpError::MissingKey(parent.path)),
            };
            let options = DescribeOptions::subtree(&parent.path, segment).with_plugins(editor.plugins());
            let child = describe(&HostValue::from(value), &options)?;
            Ok(editor.add_node(&parent, &child)?)
        }
        TreeOp::Update { path, name, value } => {
            let old = lookup(editor, path)?;
            let in_object = !old.is_root
                && find_parent(editor.tree(), path)
                    .is_some_and(|parent| editor.plugins().nesting_of(&parent.kind) != Nesting::Array);

            let options = DescribeOptions {
                parent: &old.path,
                key: None,
                plugins: Some(editor.plugins()),
                is_root: old.is_root,
            };
            let mut new = describe(&HostValue::from(value), &options)?;
            if in_object {
                let name = name.as_ref().or(old.name.as_ref()).cloned().unwrap_or_default();
                if !is_valid_string(&name) {
                    return Err(OpError::InvalidKey(name));
                }
                new.path = renamed_path(&old.path, &name);
                new.name = Some(name);
                rebase_children(&mut new);
            }
            Ok(editor.update_node(&old, &new)?)
        }
        TreeOp::Delete { path } => {
            let node = lookup(editor, path)?;
            Ok(editor.delete_node(&node)?)
        }
        TreeOp::Paste { from, parent, index } => {
            let source = lookup(editor, from)?;
            editor.copy(&source)?;
            let parent = lookup(editor, parent)?;
            Ok(editor.paste(&parent, *index)?)
        }
    }
}

fn lookup(editor: &Editor, path: &str) -> Result<Node, OpError> {
    validate_path(path)?;
    editor
        .find(path)
        .cloned()
        .ok_or_else(|| OpError::UnknownPath(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EditorConfig, PathRule};
    use crate::plugin::{Plugin, PluginRegistry};
    use crate::tree::TreeError;
    use serde_json::json;

    fn run(doc: Value, ops: Value) -> (Editor, Result<Vec<EditOutcome>, ScriptError>) {
        let mut editor = Editor::new(&doc, EditorConfig::default()).unwrap();
        let ops: Vec<TreeOp> = serde_json::from_value(ops).unwrap();
        let result = apply_ops(&mut editor, &ops);
        (editor, result)
    }

    #[test]
    fn test_ops_deserialize() {
        let op: TreeOp = serde_json::from_value(json!({"op": "delete", "path": "a.0"})).unwrap();
        assert_eq!(op, TreeOp::Delete { path: "a.0".into() });
        let op: TreeOp = serde_json::from_value(json!({"op": "add", "parent": "", "value": null})).unwrap();
        assert_eq!(
            op,
            TreeOp::Add {
                parent: String::new(),
                key: None,
                value: Value::Null,
            }
        );
        assert!(serde_json::from_value::<TreeOp>(json!({"op": "move", "path": "a"})).is_err());
    }

    #[test]
    fn test_add_update_delete() {
        let (editor, result) = run(
            json!({"key": "value", "arr": [42]}),
            json!([
                {"op": "add", "parent": "arr", "value": {"k": "v"}},
                {"op": "add", "parent": "", "key": "New Key", "value": [true]},
                {"op": "update", "path": "key", "name": "renamed", "value": 1},
                {"op": "delete", "path": "arr.0"},
            ]),
        );
        assert_eq!(result.unwrap(), vec![EditOutcome::Applied; 4]);
        assert_eq!(
            editor.to_json().unwrap(),
            json!({"renamed": 1, "arr": [{"k": "v"}], "New Key": [true]})
        );
        assert!(editor.find("new-key.0").is_some());
        assert!(editor.find("arr.1.k").is_some());
    }

    #[test]
    fn test_update_keeps_name_and_array_position() {
        let (editor, result) = run(
            json!({"list": [1, {"a": 2}, 3], "Keep Me": 0}),
            json!([
                {"op": "update", "path": "list.1", "value": {"b": [4]}},
                {"op": "update", "path": "keep-me", "value": "zero"},
            ]),
        );
        result.unwrap();
        assert_eq!(editor.to_json().unwrap(), json!({"list": [1, {"b": [4]}, 3], "Keep Me": "zero"}));
        assert!(editor.find("list.1.b.0").is_some());
    }

    #[test]
    fn test_update_root() {
        let (editor, result) = run(json!({"a": 1}), json!([{"op": "update", "path": "", "value": [1, 2]}]));
        result.unwrap();
        assert_eq!(editor.to_json().unwrap(), json!([1, 2]));
        assert!(editor.tree().is_root);
    }

    #[test]
    fn test_paste_op() {
        let (editor, result) = run(
            json!({"src": {"x": 1}, "dst": []}),
            json!([{"op": "paste", "from": "src", "parent": "dst"}]),
        );
        result.unwrap();
        assert_eq!(editor.to_json().unwrap(), json!({"src": {"x": 1}, "dst": [{"x": 1}]}));
        assert!(editor.find("dst.0.x").is_some());
    }

    #[test]
    fn test_paste_array_item_into_object() {
        let (editor, result) = run(
            json!({"arr": [1], "obj": {}}),
            json!([
                {"op": "paste", "from": "arr.0", "parent": "obj"},
                {"op": "paste", "from": "", "parent": "obj"},
            ]),
        );
        let err = result.unwrap_err();
        assert_eq!(err.index, 1);
        assert!(matches!(
            err.source,
            OpError::Editor(EditorError::Tree(TreeError::MissingName(_)))
        ));
        assert_eq!(editor.to_json().unwrap(), json!({"arr": [1], "obj": {"0": 1}}));
    }

    #[test]
    fn test_add_to_plugin_array_appends() {
        let plugins = PluginRegistry::new()
            .with(
                Plugin::new("tuple", |value, _| matches!(value, HostValue::Array(items) if items.len() == 3))
                    .nested(Nesting::Array)
                    .with_serializer(|_, children| children.unwrap_or(Value::Null)),
            )
            .unwrap();
        let mut editor = Editor::with_plugins(&json!({"t": [1, 2, 3]}), EditorConfig::default(), plugins).unwrap();
        let ops: Vec<TreeOp> = serde_json::from_value(json!([
            {"op": "add", "parent": "t", "value": 4},
            {"op": "update", "path": "t.0", "value": 0},
        ]))
        .unwrap();
        apply_ops(&mut editor, &ops).unwrap();
        assert!(editor.find("t.3").is_some());
        assert_eq!(editor.find("t.0").unwrap().name, None);
        assert_eq!(editor.to_json().unwrap(), json!({"t": [0, 2, 3, 4]}));
    }

    #[test]
    fn test_failure_reports_index_and_keeps_earlier_ops() {
        let (editor, result) = run(
            json!({"a": 1}),
            json!([
                {"op": "add", "parent": "", "key": "b", "value": 2},
                {"op": "delete", "path": "missing"},
                {"op": "add", "parent": "", "key": "c", "value": 3},
            ]),
        );
        let err = result.unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.op, "delete");
        assert!(matches!(err.source, OpError::UnknownPath(_)));
        assert_eq!(editor.to_json().unwrap(), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_malformed_path_is_rejected() {
        let (_, result) = run(json!({"a": 1}), json!([{"op": "delete", "path": "A"}]));
        assert!(matches!(result.unwrap_err().source, OpError::Path(_)));
    }

    #[test]
    fn test_add_errors() {
        let (_, result) = run(json!({}), json!([{"op": "add", "parent": "", "value": 1}]));
        assert!(matches!(result.unwrap_err().source, OpError::MissingKey(_)));

        let (_, result) = run(json!({}), json!([{"op": "add", "parent": "", "key": "k", "value": "bad \" quote"}]));
        assert!(matches!(result.unwrap_err().source, OpError::Describe(_)));

        let (_, result) = run(json!({"k": 1}), json!([{"op": "add", "parent": "", "key": "k", "value": 2}]));
        assert!(matches!(
            result.unwrap_err().source,
            OpError::Editor(EditorError::Tree(_))
        ));
    }

    #[test]
    fn test_readonly_ops_are_skipped() {
        let config = EditorConfig {
            readonly: Some(PathRule::Flag(true)),
            ..EditorConfig::default()
        };
        let mut editor = Editor::new(&json!([1]), config).unwrap();
        let outcomes = apply_ops(&mut editor, &[TreeOp::Delete { path: "0".into() }]).unwrap();
        assert_eq!(outcomes, vec![EditOutcome::Readonly]);
        assert_eq!(editor.to_json().unwrap(), json!([1]));
    }
}
