//! Tree builder: JSON (or host) value → addressed [`Node`] tree.

use leafit_path::{child_path, Segment};
use serde_json::{Number, Value};
use thiserror::Error;
use tracing::{debug, trace};

use crate::classify::classify;
use crate::host::HostValue;
use crate::node::{Node, NodeKind, Primitive};
use crate::plugin::{Nesting, PluginRegistry};
use crate::validate::is_valid_string;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DescribeError {
    /// The value has no JSON representation.
    #[error("Invalid JSON value at path \"{path}\": {reason}")]
    InvalidValue { path: String, reason: String },
    /// A string value or object key breaks JSON escaping rules.
    #[error("Invalid JSON string at path \"{path}\": {text:?}")]
    InvalidString { path: String, text: String },
}

/// Coarse classes of [`DescribeError`], for picking a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// "Unsupported value".
    Structural,
    /// "Invalid JSON string".
    Syntax,
}

impl DescribeError {
    pub fn class(&self) -> ErrorClass {
        match self {
            DescribeError::InvalidValue { .. } => ErrorClass::Structural,
            DescribeError::InvalidString { .. } => ErrorClass::Syntax,
        }
    }

    /// Path of the offending node.
    pub fn path(&self) -> &str {
        match self {
            DescribeError::InvalidValue { path, .. } | DescribeError::InvalidString { path, .. } => path,
        }
    }
}

/// Where the described value sits and which plugins apply.
#[derive(Debug, Clone, Copy)]
pub struct DescribeOptions<'a> {
    /// Path of the parent the value hangs under. Empty for a whole document.
    pub parent: &'a str,
    /// Key or index under `parent`. `None` gives the node the parent path itself.
    pub key: Option<Segment<'a>>,
    pub plugins: Option<&'a PluginRegistry>,
    /// Mark the top node as the tree root.
    pub is_root: bool,
}

impl Default for DescribeOptions<'_> {
    fn default() -> Self {
        DescribeOptions {
            parent: "",
            key: None,
            plugins: None,
            is_root: true,
        }
    }
}

impl<'a> DescribeOptions<'a> {
    /// Options for a detached subtree placed at `key` under `parent`.
    pub fn subtree(parent: &'a str, key: Segment<'a>) -> Self {
        DescribeOptions {
            parent,
            key: Some(key),
            plugins: None,
            is_root: false,
        }
    }

    pub fn with_plugins(mut self, plugins: &'a PluginRegistry) -> Self {
        self.plugins = Some(plugins);
        self
    }
}

/// Build the tree of a JSON document.
///
/// # Example
///
/// ```
/// use leafit::build;
/// use serde_json::json;
///
/// let tree = build(&json!({"Some Key": [1, 2]})).unwrap();
/// let arr = &tree.children()[0];
/// assert_eq!(arr.path, "some-key");
/// assert_eq!(arr.name.as_deref(), Some("Some Key"));
/// assert_eq!(arr.children()[1].path, "some-key.1");
/// ```
pub fn build(json: &Value) -> Result<Node, DescribeError> {
    describe(&HostValue::from(json), &DescribeOptions::default())
}

/// [`build`] with plugin kinds.
pub fn build_with_plugins(json: &Value, plugins: &PluginRegistry) -> Result<Node, DescribeError> {
    describe(&HostValue::from(json), &DescribeOptions::default().with_plugins(plugins))
}

/// Build the tree of a host value.
///
/// The whole call fails on the first invalid value or string; no partial tree
/// is returned. `Undefined` array elements and object entries are skipped,
/// remaining array elements are indexed contiguously.
pub fn describe(value: &HostValue, options: &DescribeOptions<'_>) -> Result<Node, DescribeError> {
    let empty;
    let plugins = match options.plugins {
        Some(plugins) => plugins,
        None => {
            empty = PluginRegistry::new();
            &empty
        }
    };

    let (path, name) = match options.key {
        Some(segment) => {
            let name = match segment {
                Segment::Key(key) => Some(key),
                Segment::Index(_) => None,
            };
            (child_path(options.parent, segment), name)
        }
        None => (options.parent.to_string(), None),
    };
    debug!(path = %path, plugins = plugins.len(), "describing value");

    let mut node = Describer { plugins }.node(value, path, name)?;
    node.is_root = options.is_root;
    Ok(node)
}

struct Describer<'a> {
    plugins: &'a PluginRegistry,
}

impl Describer<'_> {
    fn node(&self, value: &HostValue, path: String, name: Option<&str>) -> Result<Node, DescribeError> {
        let kind = classify(value, self.plugins).map_err(|e| DescribeError::InvalidValue {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        if let Some(name) = name {
            if !is_valid_string(name) {
                return Err(DescribeError::InvalidString {
                    path,
                    text: name.to_string(),
                });
            }
        }
        trace!(path = %path, kind = %kind, "node");

        let mut node = Node::new(kind.clone(), path);
        node.name = name.map(str::to_string);

        match self.plugins.nesting_of(&kind) {
            Nesting::None => node.value = Some(primitive(value, &node.path, &kind)?),
            Nesting::Array => {
                let HostValue::Array(items) = value else {
                    return Err(mismatch(&node.path, &kind, "an array", value));
                };
                let children = items
                    .iter()
                    .filter(|item| !item.is_undefined())
                    .enumerate()
                    .map(|(index, item)| self.node(item, child_path(&node.path, index), None))
                    .collect::<Result<Vec<_>, _>>()?;
                node.children = Some(children);
            }
            Nesting::Object => {
                let HostValue::Object(entries) = value else {
                    return Err(mismatch(&node.path, &kind, "an object", value));
                };
                let children = entries
                    .iter()
                    .filter(|(_, item)| !item.is_undefined())
                    .map(|(key, item)| {
                        self.node(item, child_path(&node.path, key.as_str()), Some(key))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                node.children = Some(children);
            }
        }

        Ok(node)
    }
}

/// Scalar payload of a leaf value. Strings must pass the string validator.
fn primitive(value: &HostValue, path: &str, kind: &NodeKind) -> Result<Primitive, DescribeError> {
    match value {
        HostValue::Null => Ok(Primitive::Null),
        HostValue::Bool(b) => Ok(Primitive::Bool(*b)),
        HostValue::Integer(i) => Ok(Primitive::Number(Number::from(*i))),
        HostValue::UInteger(u) => Ok(Primitive::Number(Number::from(*u))),
        HostValue::Float(f) => Number::from_f64(*f)
            .map(Primitive::Number)
            .ok_or_else(|| DescribeError::InvalidValue {
                path: path.to_string(),
                reason: format!("{f} is not representable in JSON"),
            }),
        HostValue::Str(s) if is_valid_string(s) => Ok(Primitive::String(s.clone())),
        HostValue::Str(s) => Err(DescribeError::InvalidString {
            path: path.to_string(),
            text: s.clone(),
        }),
        other => Err(mismatch(path, kind, "a JSON primitive", other)),
    }
}

fn mismatch(path: &str, kind: &NodeKind, expected: &str, value: &HostValue) -> DescribeError {
    DescribeError::InvalidValue {
        path: path.to_string(),
        reason: format!("type {kind} expects {expected}, got {}", value.type_name()),
    }
}
