//! Path-addressed editable trees for JSON documents.
//!
//! A JSON value is turned into a tree of [`Node`]s, each addressed by a dotted
//! path derived from object keys (slugified) and array indices. The tree can
//! be edited with pure mutations that return a new tree, and serialized back
//! to JSON.
//!
//! # Example
//!
//! ```
//! use leafit::{add_node_to_tree, build, delete_node_in_tree, find_node, to_json, Node};
//! use serde_json::json;
//!
//! let tree = build(&json!({"key": "value", "arr": [42, {"k": "v"}]})).unwrap();
//! assert_eq!(tree.paths(), vec!["", "key", "arr", "arr.0", "arr.1", "arr.1.k"]);
//!
//! let arr = find_node(&tree, "arr").unwrap().clone();
//! let tree = add_node_to_tree(&arr, &Node::boolean("arr.2", true), &tree).unwrap();
//! let tree = delete_node_in_tree(&Node::null("arr.0"), &tree).unwrap();
//! assert_eq!(to_json(&tree).unwrap(), json!({"key": "value", "arr": [{"k": "v"}, true]}));
//! ```

pub mod classify;
pub mod config;
pub mod describe;
pub mod edit;
pub mod editor;
pub mod host;
pub mod i18n;
pub mod memo;
pub mod node;
pub mod ops;
pub mod plugin;
pub mod serialize;
pub mod tree;
pub mod validate;

pub use classify::{classify, infer_kind, ClassifyError};
pub use config::{is_readonly, should_collapse, should_expand, ConfigError, EditorConfig, PathPattern, PathRule};
pub use describe::{build, build_with_plugins, describe, DescribeError, DescribeOptions, ErrorClass};
pub use edit::{
    message_key, renamed_path, typed_value, validate_node, DraftReport, EditError, ErrorLevel, LeafDraft,
    LeafMode,
};
pub use editor::{EditOutcome, Editor, EditorError};
pub use host::HostValue;
pub use memo::{hash_code, memoized_has_node, subtree_unchanged, HasNodeCache};
pub use node::{Node, NodeKind, Primitive, BASE_KINDS};
pub use ops::{apply_ops, OpError, ScriptError, TreeOp};
pub use plugin::{Nesting, Plugin, PluginError, PluginRegistry};
pub use serialize::{to_json, to_json_with, SerializeError};
pub use tree::{
    add_node_to_tree, delete_node_in_tree, find_node, find_parent, has_node, has_path,
    update_node_in_tree, update_node_path, TreeError,
};
pub use validate::{is_valid_number, is_valid_string, parse_number};

pub use leafit_path as path;
