//! Inline leaf editing: validating what the user typed and turning it into an
//! updated node.

use std::fmt;

use leafit_path::replace_last_segment;
use thiserror::Error;

use crate::node::{Node, NodeKind, Primitive};
use crate::plugin::{Nesting, PluginRegistry};
use crate::tree::rebase_children;
use crate::validate::{is_valid_number, is_valid_string, parse_number};

/// Severity attached to an input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ErrorLevel {
    #[default]
    None,
    Info,
    Warning,
    Error,
}

impl ErrorLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorLevel::None => "none",
            ErrorLevel::Info => "info",
            ErrorLevel::Warning => "warning",
            ErrorLevel::Error => "error",
        }
    }
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a leaf is addressed by its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafMode {
    /// Child of an object: has an editable name.
    Object,
    /// Child of an array: addressed by index.
    Array,
    /// The tree root.
    Root,
}

impl LeafMode {
    /// Mode of the children of `parent`. Plugin containers follow their
    /// nesting.
    pub fn of_children(parent: &Node, plugins: &PluginRegistry) -> Self {
        match plugins.nesting_of(&parent.kind) {
            Nesting::Array => LeafMode::Array,
            _ => LeafMode::Object,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditError {
    #[error("Invalid name {0:?}")]
    InvalidName(String),
    #[error("Invalid {kind} value {text:?}")]
    InvalidValue { kind: NodeKind, text: String },
    #[error("Number {0} is outside the representable range")]
    NumberOutOfRange(String),
    #[error("Type {0} cannot be edited inline")]
    NotALeaf(NodeKind),
}

/// Result of validating a [`LeafDraft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DraftReport {
    pub name: ErrorLevel,
    pub value: ErrorLevel,
}

impl DraftReport {
    pub fn has_error(&self) -> bool {
        self.worst() == ErrorLevel::Error
    }

    pub fn has_warning(&self) -> bool {
        self.name == ErrorLevel::Warning || self.value == ErrorLevel::Warning
    }

    pub fn worst(&self) -> ErrorLevel {
        self.name.max(self.value)
    }
}

/// The raw state of an inline editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafDraft {
    pub kind: NodeKind,
    pub name: String,
    /// Value text, as typed.
    pub value: String,
    /// Switch state, used for booleans.
    pub checked: bool,
}

impl LeafDraft {
    /// Seeds a draft with the current state of `node`.
    pub fn from_node(node: &Node) -> Self {
        LeafDraft {
            kind: node.kind.clone(),
            name: node.name.clone().unwrap_or_default(),
            value: node.value.as_ref().map(Primitive::to_text).unwrap_or_default(),
            checked: matches!(node.value, Some(Primitive::Bool(true))),
        }
    }

    pub fn validate(&self, mode: LeafMode, disable_warnings: bool, plugins: &PluginRegistry) -> DraftReport {
        let name = if !is_valid_string(&self.name) {
            ErrorLevel::Error
        } else if mode == LeafMode::Object && self.name.is_empty() && !disable_warnings {
            ErrorLevel::Warning
        } else {
            ErrorLevel::None
        };

        let value = match &self.kind {
            NodeKind::String if !is_valid_string(&self.value) => ErrorLevel::Error,
            NodeKind::String if self.value.is_empty() && !disable_warnings => ErrorLevel::Warning,
            NodeKind::Number if !is_valid_number(&self.value) => ErrorLevel::Error,
            NodeKind::Custom(tag) => match plugins.get(tag) {
                Some(plugin) if plugin.nesting() == Nesting::None && !plugin.validate(&self.value) => {
                    ErrorLevel::Error
                }
                _ => ErrorLevel::None,
            },
            _ => ErrorLevel::None,
        };

        DraftReport { name, value }
    }

    /// Builds the node that replaces `node` once the draft is submitted.
    ///
    /// In object mode the name is written back and the last path segment
    /// follows it. Switching to a container kind starts with no children,
    /// switching to a leaf kind drops them.
    pub fn apply(&self, node: &Node, mode: LeafMode, plugins: &PluginRegistry) -> Result<Node, EditError> {
        let report = self.validate(mode, true, plugins);
        if report.name == ErrorLevel::Error {
            return Err(EditError::InvalidName(self.name.clone()));
        }
        if report.value == ErrorLevel::Error {
            return Err(EditError::InvalidValue {
                kind: self.kind.clone(),
                text: self.value.clone(),
            });
        }

        let mut updated = node.clone();
        updated.kind = self.kind.clone();
        if mode == LeafMode::Object {
            updated.name = Some(self.name.clone());
            updated.path = renamed_path(&node.path, &self.name);
        }

        if holds_children(&self.kind, plugins) {
            updated.value = None;
            if node.kind != self.kind || node.children.is_none() {
                updated.children = Some(Vec::new());
            } else if updated.path != node.path {
                rebase_children(&mut updated);
            }
        } else {
            updated.children = None;
            updated.value = Some(typed_value(&self.kind, &self.value, self.checked, plugins)?);
        }
        Ok(updated)
    }
}

fn holds_children(kind: &NodeKind, plugins: &PluginRegistry) -> bool {
    plugins.nesting_of(kind) != Nesting::None
}

/// Typed value of inline-edit text for a leaf kind.
///
/// Booleans take the switch state, numbers are parsed (a trailing `.` is
/// fine), plugin kinds go through their parser.
pub fn typed_value(
    kind: &NodeKind,
    text: &str,
    checked: bool,
    plugins: &PluginRegistry,
) -> Result<Primitive, EditError> {
    let invalid = || EditError::InvalidValue {
        kind: kind.clone(),
        text: text.to_string(),
    };
    match kind {
        NodeKind::Null => Ok(Primitive::Null),
        NodeKind::Boolean => Ok(Primitive::Bool(checked)),
        NodeKind::String => Ok(Primitive::String(text.to_string())),
        NodeKind::Number if !is_valid_number(text) => Err(invalid()),
        NodeKind::Number => parse_number(text)
            .map(Primitive::Number)
            .ok_or_else(|| EditError::NumberOutOfRange(text.to_string())),
        NodeKind::Custom(_) => plugins
            .for_kind(kind)
            .and_then(|plugin| plugin.parse(text))
            .ok_or_else(invalid),
        NodeKind::Array | NodeKind::Object => Err(EditError::NotALeaf(kind.clone())),
    }
}

/// `old` with its last segment replaced by the slug of `name`.
///
/// # Example
///
/// ```
/// use leafit::renamed_path;
///
/// assert_eq!(renamed_path("config.oldName", "New Name"), "config.new-name");
/// ```
pub fn renamed_path(old: &str, name: &str) -> String {
    replace_last_segment(old, name)
}

/// Translation key of the message shown for a field of type `kind`.
pub fn message_key(kind: &NodeKind, level: ErrorLevel) -> String {
    format!("error.message.{kind}.{level}")
}

/// Severity a read-only leaf is displayed with.
///
/// Lighter than [`LeafDraft::validate`]: an invalid string value only warns,
/// since it came from the document rather than from the user.
pub fn validate_node(node: &Node, mode: LeafMode, disable_warnings: bool) -> ErrorLevel {
    if mode == LeafMode::Object {
        match node.name.as_deref() {
            None | Some("") if !disable_warnings => return ErrorLevel::Warning,
            Some(name) if !name.is_empty() && !is_valid_string(name) => return ErrorLevel::Error,
            _ => {}
        }
    }

    if let (NodeKind::String, Some(Primitive::String(value))) = (&node.kind, &node.value) {
        if value.is_empty() && !disable_warnings {
            return ErrorLevel::Warning;
        }
        if !is_valid_string(value) {
            return ErrorLevel::Warning;
        }
    }

    ErrorLevel::None
}

/// A freshly added leaf the user has not filled in yet.
pub fn is_placeholder(node: &Node) -> bool {
    node.name.as_deref() == Some("") && node.value == Some(Primitive::String(String::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::Plugin;

    fn no_plugins() -> PluginRegistry {
        PluginRegistry::new()
    }

    #[test]
    fn test_draft_from_node() {
        let draft = LeafDraft::from_node(&Node::number("a.b", 42).with_name("b"));
        assert_eq!(draft.kind, NodeKind::Number);
        assert_eq!(draft.name, "b");
        assert_eq!(draft.value, "42");
        assert!(!draft.checked);

        let draft = LeafDraft::from_node(&Node::boolean("0", true));
        assert_eq!(draft.name, "");
        assert_eq!(draft.value, "true");
        assert!(draft.checked);
    }

    #[test]
    fn test_name_validation() {
        let mut draft = LeafDraft::from_node(&Node::string("key", "v").with_name("key"));
        assert_eq!(draft.validate(LeafMode::Object, false, &no_plugins()).name, ErrorLevel::None);

        draft.name = String::new();
        assert_eq!(draft.validate(LeafMode::Object, false, &no_plugins()).name, ErrorLevel::Warning);
        assert_eq!(draft.validate(LeafMode::Object, true, &no_plugins()).name, ErrorLevel::None);
        assert_eq!(draft.validate(LeafMode::Array, false, &no_plugins()).name, ErrorLevel::None);

        draft.name = r"bad \q".into();
        let report = draft.validate(LeafMode::Object, false, &no_plugins());
        assert_eq!(report.name, ErrorLevel::Error);
        assert!(report.has_error());
    }

    #[test]
    fn test_value_validation() {
        let mut draft = LeafDraft::from_node(&Node::string("0", ""));
        assert_eq!(draft.validate(LeafMode::Array, false, &no_plugins()).value, ErrorLevel::Warning);
        assert_eq!(draft.validate(LeafMode::Array, true, &no_plugins()).value, ErrorLevel::None);
        draft.value = r"\u12".into();
        assert_eq!(draft.validate(LeafMode::Array, true, &no_plugins()).value, ErrorLevel::Error);

        draft.kind = NodeKind::Number;
        draft.value = "10e5".into();
        assert_eq!(draft.validate(LeafMode::Array, false, &no_plugins()).value, ErrorLevel::Error);
        draft.value = "10e+5".into();
        assert_eq!(draft.validate(LeafMode::Array, false, &no_plugins()).value, ErrorLevel::None);
        draft.value = "1e+999".into();
        assert_eq!(draft.validate(LeafMode::Array, false, &no_plugins()).value, ErrorLevel::None);

        draft.kind = NodeKind::Boolean;
        draft.value = "anything".into();
        assert_eq!(draft.validate(LeafMode::Array, false, &no_plugins()).value, ErrorLevel::None);
    }

    #[test]
    fn test_apply_renames_in_object_mode() {
        let node = Node::string("config.old-name", "v").with_name("oldName");
        let mut draft = LeafDraft::from_node(&node);
        draft.name = "New Name".into();
        draft.kind = NodeKind::Number;
        draft.value = "0.".into();

        let updated = draft.apply(&node, LeafMode::Object, &no_plugins()).unwrap();
        assert_eq!(updated, Node::number("config.new-name", 0).with_name("New Name"));

        let same_path = draft.apply(&node, LeafMode::Array, &no_plugins()).unwrap();
        assert_eq!(same_path.path, "config.old-name");
        assert_eq!(same_path.name.as_deref(), Some("oldName"));
    }

    #[test]
    fn test_apply_switches_between_leaf_and_container() {
        let leaf = Node::string("k", "v").with_name("k");
        let mut draft = LeafDraft::from_node(&leaf);
        draft.kind = NodeKind::Array;
        let updated = draft.apply(&leaf, LeafMode::Object, &no_plugins()).unwrap();
        assert_eq!(updated, Node::array("k", vec![]).with_name("k"));

        let mut draft = LeafDraft::from_node(&updated);
        draft.kind = NodeKind::Null;
        let updated = draft.apply(&updated, LeafMode::Object, &no_plugins()).unwrap();
        assert_eq!(updated, Node::null("k").with_name("k"));
    }

    #[test]
    fn test_apply_rename_moves_children() {
        let node = Node::object("a", vec![Node::number("a.x", 1).with_name("x")]).with_name("a");
        let mut draft = LeafDraft::from_node(&node);
        draft.name = "b".into();
        let updated = draft.apply(&node, LeafMode::Object, &no_plugins()).unwrap();
        assert_eq!(updated.path, "b");
        assert_eq!(updated.children()[0].path, "b.x");
    }

    #[test]
    fn test_apply_rejects_errors() {
        let node = Node::number("0", 1);
        let mut draft = LeafDraft::from_node(&node);
        draft.value = "one".into();
        assert_eq!(
            draft.apply(&node, LeafMode::Array, &no_plugins()),
            Err(EditError::InvalidValue {
                kind: NodeKind::Number,
                text: "one".into(),
            })
        );
    }

    #[test]
    fn test_typed_value() {
        let none = no_plugins();
        assert_eq!(typed_value(&NodeKind::Null, "x", true, &none), Ok(Primitive::Null));
        assert_eq!(typed_value(&NodeKind::Boolean, "", true, &none), Ok(Primitive::Bool(true)));
        assert_eq!(
            typed_value(&NodeKind::String, "hi", false, &none),
            Ok(Primitive::String("hi".into()))
        );
        assert_eq!(
            typed_value(&NodeKind::Number, "-12", false, &none),
            Ok(Primitive::Number((-12).into()))
        );
        assert!(typed_value(&NodeKind::Object, "", false, &none).is_err());
    }

    #[test]
    fn test_number_out_of_range() {
        let none = no_plugins();
        assert_eq!(
            typed_value(&NodeKind::Number, "1e+999", false, &none),
            Err(EditError::NumberOutOfRange("1e+999".into()))
        );
        assert!(matches!(
            typed_value(&NodeKind::Number, "1e999", false, &none),
            Err(EditError::InvalidValue { .. })
        ));

        let node = Node::number("0", 1);
        let mut draft = LeafDraft::from_node(&node);
        draft.value = "-1e+999".into();
        assert!(!draft.validate(LeafMode::Array, false, &none).has_error());
        assert_eq!(
            draft.apply(&node, LeafMode::Array, &none),
            Err(EditError::NumberOutOfRange("-1e+999".into()))
        );
    }

    #[test]
    fn test_mode_follows_plugin_nesting() {
        let plugins = PluginRegistry::new()
            .with(Plugin::new("list", |_, inferred| *inferred == NodeKind::Array).nested(Nesting::Array))
            .unwrap()
            .with(Plugin::new("record", |_, inferred| *inferred == NodeKind::Object).nested(Nesting::Object))
            .unwrap();
        let mode = |tag: &str| LeafMode::of_children(&Node::new(NodeKind::Custom(tag.into()), "p"), &plugins);
        assert_eq!(mode("list"), LeafMode::Array);
        assert_eq!(mode("record"), LeafMode::Object);
        assert_eq!(LeafMode::of_children(&Node::array("a", vec![]), &plugins), LeafMode::Array);
        assert_eq!(LeafMode::of_children(&Node::object("o", vec![]), &plugins), LeafMode::Object);
    }

    #[test]
    fn test_plugin_parser_and_validator() {
        let plugins = PluginRegistry::new()
            .with(
                Plugin::new("percent", |_, inferred| *inferred == NodeKind::Number)
                    .with_validator(|text| text.ends_with('%'))
                    .with_parser(|text| {
                        parse_number(text.trim_end_matches('%')).map(Primitive::Number)
                    }),
            )
            .unwrap();
        let kind = NodeKind::Custom("percent".into());
        let draft = LeafDraft {
            kind: kind.clone(),
            name: String::new(),
            value: "12".into(),
            checked: false,
        };
        assert_eq!(draft.validate(LeafMode::Array, false, &plugins).value, ErrorLevel::Error);
        assert_eq!(
            typed_value(&kind, "12%", false, &plugins),
            Ok(Primitive::Number(12.into()))
        );
    }

    #[test]
    fn test_message_key() {
        assert_eq!(message_key(&NodeKind::String, ErrorLevel::Warning), "error.message.string.warning");
        assert_eq!(message_key(&NodeKind::Number, ErrorLevel::Error), "error.message.number.error");
    }

    #[test]
    fn test_validate_node_for_display() {
        assert_eq!(validate_node(&Node::string("", "v"), LeafMode::Object, false), ErrorLevel::Warning);
        assert_eq!(
            validate_node(&Node::string("k", "v").with_name("k"), LeafMode::Object, false),
            ErrorLevel::None
        );
        assert_eq!(
            validate_node(&Node::string("k", r"\x").with_name("k"), LeafMode::Object, true),
            ErrorLevel::Warning
        );
        assert_eq!(
            validate_node(&Node::number("0", 1).with_name(r"\x"), LeafMode::Object, true),
            ErrorLevel::Error
        );
        assert_eq!(validate_node(&Node::string("0", ""), LeafMode::Array, true), ErrorLevel::None);
    }

    #[test]
    fn test_placeholder() {
        assert!(is_placeholder(&Node::string("a", "").with_name("")));
        assert!(!is_placeholder(&Node::string("a", "").with_name("a")));
    }
}
