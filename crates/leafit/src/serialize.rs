//! Tree serializer: [`Node`] tree → JSON value.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::node::{Node, NodeKind, Primitive};
use crate::plugin::{Nesting, PluginRegistry};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializeError {
    #[error("Unsupported type \"{kind}\" at path \"{path}\"")]
    UnsupportedKind { path: String, kind: NodeKind },
    #[error("Object child at path \"{path}\" has no name")]
    MissingName { path: String },
    #[error("Node of type {kind} at path \"{path}\" has no value")]
    MissingValue { path: String, kind: NodeKind },
}

/// JSON value of a tree holding only base kinds.
///
/// # Example
///
/// ```
/// use leafit::{build, to_json};
/// use serde_json::json;
///
/// let doc = json!({"key": "value", "arr": [42, {"k": "v"}]});
/// assert_eq!(to_json(&build(&doc).unwrap()).unwrap(), doc);
/// ```
pub fn to_json(node: &Node) -> Result<Value, SerializeError> {
    to_json_with(node, &PluginRegistry::new())
}

/// JSON value of a tree, plugin kinds going through their serializer.
pub fn to_json_with(node: &Node, plugins: &PluginRegistry) -> Result<Value, SerializeError> {
    match &node.kind {
        NodeKind::Null => Ok(Value::Null),
        NodeKind::String | NodeKind::Number | NodeKind::Boolean => match &node.value {
            Some(value) => Ok(Value::from(value.clone())),
            None => Err(SerializeError::MissingValue {
                path: node.path.clone(),
                kind: node.kind.clone(),
            }),
        },
        NodeKind::Array => array(node, plugins),
        NodeKind::Object => object(node, plugins),
        NodeKind::Custom(_) => {
            let unsupported = || SerializeError::UnsupportedKind {
                path: node.path.clone(),
                kind: node.kind.clone(),
            };
            let plugin = plugins.for_kind(&node.kind).ok_or_else(unsupported)?;
            let children = match plugin.nesting() {
                Nesting::None => None,
                Nesting::Array => Some(array(node, plugins)?),
                Nesting::Object => Some(object(node, plugins)?),
            };
            plugin.serialize(node, children).ok_or_else(unsupported)
        }
    }
}

fn array(node: &Node, plugins: &PluginRegistry) -> Result<Value, SerializeError> {
    node.children()
        .iter()
        .map(|child| to_json_with(child, plugins))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn object(node: &Node, plugins: &PluginRegistry) -> Result<Value, SerializeError> {
    let mut map = Map::new();
    for child in node.children() {
        let name = child.name.as_ref().ok_or_else(|| SerializeError::MissingName {
            path: child.path.clone(),
        })?;
        map.insert(name.clone(), to_json_with(child, plugins)?);
    }
    Ok(Value::Object(map))
}

impl Node {
    /// Shorthand for [`to_json`].
    pub fn to_json(&self) -> Result<Value, SerializeError> {
        to_json(self)
    }

    /// Value carried by a leaf, as JSON.
    pub fn json_value(&self) -> Option<Value> {
        self.value.clone().map(Primitive::into)
    }
}
