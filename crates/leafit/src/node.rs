//! The node tree built from a JSON value.
//!
//! Nodes serialize to the same shape the editor front-end exchanges:
//! `{"type", "path", "name"?, "value"?, "children"?, "isRoot"?}`. The field
//! order is part of the contract, [`crate::memo::hash_code`] hashes this form.

use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Tags of the six base JSON kinds, in declaration order.
pub const BASE_KINDS: [&str; 6] = ["null", "string", "number", "boolean", "array", "object"];

// ── Kind ──────────────────────────────────────────────────────────────────

/// Discriminant of a [`Node`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    String,
    Number,
    Boolean,
    Array,
    Object,
    /// A kind recognized by a registered plugin, identified by its tag.
    Custom(String),
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Null => "null",
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::Boolean => "boolean",
            NodeKind::Array => "array",
            NodeKind::Object => "object",
            NodeKind::Custom(tag) => tag,
        }
    }

    /// Maps a tag back to a kind. Unknown tags become [`NodeKind::Custom`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "null" => NodeKind::Null,
            "string" => NodeKind::String,
            "number" => NodeKind::Number,
            "boolean" => NodeKind::Boolean,
            "array" => NodeKind::Array,
            "object" => NodeKind::Object,
            other => NodeKind::Custom(other.to_string()),
        }
    }

    /// `null`, `string`, `number` or `boolean`.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            NodeKind::Null | NodeKind::String | NodeKind::Number | NodeKind::Boolean
        )
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, NodeKind::Custom(_))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(NodeKind::from_tag(&tag))
    }
}

// ── Primitive ─────────────────────────────────────────────────────────────

/// Scalar payload of a leaf node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Primitive {
    /// Kind of a node carrying this value.
    pub fn kind(&self) -> NodeKind {
        match self {
            Primitive::Null => NodeKind::Null,
            Primitive::Bool(_) => NodeKind::Boolean,
            Primitive::Number(_) => NodeKind::Number,
            Primitive::String(_) => NodeKind::String,
        }
    }

    /// Text shown in an inline editor for this value.
    pub fn to_text(&self) -> String {
        match self {
            Primitive::Null => String::new(),
            Primitive::Bool(b) => b.to_string(),
            Primitive::Number(n) => n.to_string(),
            Primitive::String(s) => s.clone(),
        }
    }
}

impl From<Primitive> for serde_json::Value {
    fn from(value: Primitive) -> Self {
        match value {
            Primitive::Null => serde_json::Value::Null,
            Primitive::Bool(b) => serde_json::Value::Bool(b),
            Primitive::Number(n) => serde_json::Value::Number(n),
            Primitive::String(s) => serde_json::Value::String(s),
        }
    }
}

// ── Node ──────────────────────────────────────────────────────────────────

/// One addressed element of the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub value: Option<Primitive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
    #[serde(default, rename = "isRoot", skip_serializing_if = "is_false")]
    pub is_root: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// `"value": null` is a present null, not a missing value.
fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Primitive>, D::Error> {
    Primitive::deserialize(deserializer).map(Some)
}

impl Node {
    /// A bare node: no name, value or children.
    pub fn new(kind: NodeKind, path: impl Into<String>) -> Self {
        Node {
            kind,
            path: path.into(),
            name: None,
            value: None,
            children: None,
            is_root: false,
        }
    }

    /// A leaf carrying `value`, its kind derived from the value.
    pub fn leaf(path: impl Into<String>, value: Primitive) -> Self {
        let mut node = Node::new(value.kind(), path);
        node.value = Some(value);
        node
    }

    pub fn null(path: impl Into<String>) -> Self {
        Node::leaf(path, Primitive::Null)
    }

    pub fn string(path: impl Into<String>, value: impl Into<String>) -> Self {
        Node::leaf(path, Primitive::String(value.into()))
    }

    pub fn number(path: impl Into<String>, value: impl Into<Number>) -> Self {
        Node::leaf(path, Primitive::Number(value.into()))
    }

    pub fn boolean(path: impl Into<String>, value: bool) -> Self {
        Node::leaf(path, Primitive::Bool(value))
    }

    pub fn array(path: impl Into<String>, children: Vec<Node>) -> Self {
        Node::new(NodeKind::Array, path).with_children(children)
    }

    pub fn object(path: impl Into<String>, children: Vec<Node>) -> Self {
        Node::new(NodeKind::Object, path).with_children(children)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Moves this node alone to `path`. Descendant paths are left as they are,
    /// see [`crate::update_node_path`] to relocate a whole subtree.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn into_root(mut self) -> Self {
        self.is_root = true;
        self
    }

    /// Whether this node can hold children.
    pub fn is_container(&self) -> bool {
        self.children.is_some()
    }

    pub fn children(&self) -> &[Node] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Number of nodes in this subtree, itself included.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Node::node_count).sum::<usize>()
    }

    /// Every path of this subtree, in pre-order.
    pub fn paths(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(&self.path);
        for child in self.children() {
            child.collect_paths(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_tags_round_trip() {
        for tag in BASE_KINDS {
            assert_eq!(NodeKind::from_tag(tag).as_str(), tag);
            assert!(!NodeKind::from_tag(tag).is_custom());
        }
        assert_eq!(NodeKind::from_tag("date"), NodeKind::Custom("date".into()));
    }

    #[test]
    fn test_node_serializes_in_front_end_shape() {
        let node = Node::object("", vec![Node::string("key", "value").with_name("key")]).into_root();
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({
                "type": "object",
                "path": "",
                "children": [{"type": "string", "path": "key", "name": "key", "value": "value"}],
                "isRoot": true,
            })
        );
        assert_eq!(
            serde_json::to_string(&Node::new(NodeKind::String, "key")).unwrap(),
            r#"{"type":"string","path":"key"}"#
        );
    }

    #[test]
    fn test_null_value_survives_deserialization() {
        let node: Node = serde_json::from_value(json!({"type": "null", "path": "a", "value": null})).unwrap();
        assert_eq!(node, Node::null("a"));

        let bare: Node = serde_json::from_value(json!({"type": "null", "path": "a"})).unwrap();
        assert_eq!(bare.value, None);
    }

    #[test]
    fn test_node_count_and_paths() {
        let tree = Node::array(
            "",
            vec![Node::number("0", 1), Node::array("1", vec![Node::number("1.0", 2)])],
        );
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.paths(), vec!["", "0", "1", "1.0"]);
        assert!(tree.is_container());
        assert!(!tree.children()[0].is_container());
    }
}
