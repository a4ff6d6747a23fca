//! Plugin registry for kinds beyond the six base JSON kinds.
//!
//! A plugin recognizes values through its checker and claims them under its
//! tag. Plugins are tried in registration order and the first match wins; the
//! base classification is still computed and handed to every checker.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use crate::edit::ErrorLevel;
use crate::host::HostValue;
use crate::node::{Node, NodeKind, Primitive, BASE_KINDS};

pub type Checker = Box<dyn Fn(&HostValue, &NodeKind) -> bool>;
pub type Parser = Box<dyn Fn(&str) -> Option<Primitive>>;
pub type Validator = Box<dyn Fn(&str) -> bool>;
/// Turns a plugin node back into JSON. Nested plugins receive their children
/// already serialized, as an array or an object depending on their nesting.
pub type PluginSerializer = Box<dyn Fn(&Node, Option<Value>) -> Value>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PluginError {
    #[error("Plugin tag must not be empty")]
    EmptyTag,
    #[error("Plugin tag \"{0}\" is reserved for a base JSON kind")]
    ReservedTag(String),
    #[error("A plugin with tag \"{0}\" is already registered")]
    DuplicateTag(String),
}

/// Whether, and how, a plugin kind holds children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nesting {
    /// A leaf carrying a primitive value.
    #[default]
    None,
    /// Children addressed by index, built from an array value.
    Array,
    /// Children addressed by key, built from an object value.
    Object,
}

pub struct Plugin {
    tag: String,
    checker: Checker,
    nesting: Nesting,
    parser: Option<Parser>,
    validator: Option<Validator>,
    serializer: Option<PluginSerializer>,
    error_messages: IndexMap<ErrorLevel, String>,
}

impl Plugin {
    pub fn new(
        tag: impl Into<String>,
        checker: impl Fn(&HostValue, &NodeKind) -> bool + 'static,
    ) -> Self {
        Plugin {
            tag: tag.into(),
            checker: Box::new(checker),
            nesting: Nesting::None,
            parser: None,
            validator: None,
            serializer: None,
            error_messages: IndexMap::new(),
        }
    }

    pub fn nested(mut self, nesting: Nesting) -> Self {
        self.nesting = nesting;
        self
    }

    pub fn with_parser(mut self, parser: impl Fn(&str) -> Option<Primitive> + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    pub fn with_validator(mut self, validator: impl Fn(&str) -> bool + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn with_serializer(
        mut self,
        serializer: impl Fn(&Node, Option<Value>) -> Value + 'static,
    ) -> Self {
        self.serializer = Some(Box::new(serializer));
        self
    }

    pub fn with_error_message(mut self, level: ErrorLevel, message: impl Into<String>) -> Self {
        self.error_messages.insert(level, message.into());
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::Custom(self.tag.clone())
    }

    pub fn nesting(&self) -> Nesting {
        self.nesting
    }

    pub fn matches(&self, value: &HostValue, inferred: &NodeKind) -> bool {
        (self.checker)(value, inferred)
    }

    /// Parses inline-edit text. `None` when the plugin has no parser or the
    /// text does not parse.
    pub fn parse(&self, text: &str) -> Option<Primitive> {
        self.parser.as_ref().and_then(|parse| parse(text))
    }

    /// Validates inline-edit text. Plugins without a validator accept anything.
    pub fn validate(&self, text: &str) -> bool {
        self.validator.as_ref().map_or(true, |validate| validate(text))
    }

    pub fn serialize(&self, node: &Node, children: Option<Value>) -> Option<Value> {
        self.serializer.as_ref().map(|serialize| serialize(node, children))
    }

    pub fn error_message(&self, level: ErrorLevel) -> Option<&str> {
        self.error_messages.get(&level).map(String::as_str)
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("tag", &self.tag)
            .field("nesting", &self.nesting)
            .field("parser", &self.parser.is_some())
            .field("validator", &self.validator.is_some())
            .field("serializer", &self.serializer.is_some())
            .field("error_messages", &self.error_messages)
            .finish()
    }
}

/// Ordered set of plugins, keyed by tag.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: IndexMap<String, Plugin>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Plugin) -> Result<(), PluginError> {
        if plugin.tag.is_empty() {
            return Err(PluginError::EmptyTag);
        }
        if BASE_KINDS.contains(&plugin.tag.as_str()) {
            return Err(PluginError::ReservedTag(plugin.tag));
        }
        if self.plugins.contains_key(&plugin.tag) {
            return Err(PluginError::DuplicateTag(plugin.tag));
        }
        self.plugins.insert(plugin.tag.clone(), plugin);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, plugin: Plugin) -> Result<Self, PluginError> {
        self.register(plugin)?;
        Ok(self)
    }

    pub fn get(&self, tag: &str) -> Option<&Plugin> {
        self.plugins.get(tag)
    }

    /// The plugin behind a custom kind.
    pub fn for_kind(&self, kind: &NodeKind) -> Option<&Plugin> {
        match kind {
            NodeKind::Custom(tag) => self.get(tag),
            _ => None,
        }
    }

    /// How nodes of `kind` hold children. Unknown plugin kinds are leaves.
    pub fn nesting_of(&self, kind: &NodeKind) -> Nesting {
        match kind {
            NodeKind::Array => Nesting::Array,
            NodeKind::Object => Nesting::Object,
            NodeKind::Custom(tag) => self.get(tag).map_or(Nesting::None, Plugin::nesting),
            _ => Nesting::None,
        }
    }

    /// First plugin, in registration order, claiming `value`.
    pub fn find_match(&self, value: &HostValue, inferred: &NodeKind) -> Option<&Plugin> {
        self.plugins.values().find(|plugin| plugin.matches(value, inferred))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.values()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn any_string() -> Plugin {
        Plugin::new("text", |_, inferred| *inferred == NodeKind::String)
    }

    #[test]
    fn test_register_rejects_bad_tags() {
        let mut registry = PluginRegistry::new();
        assert_eq!(
            registry.register(Plugin::new("", |_, _| true)),
            Err(PluginError::EmptyTag)
        );
        assert_eq!(
            registry.register(Plugin::new("object", |_, _| true)),
            Err(PluginError::ReservedTag("object".into()))
        );
        registry.register(any_string()).unwrap();
        assert_eq!(
            registry.register(any_string()),
            Err(PluginError::DuplicateTag("text".into()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_first_registered_match_wins() {
        let registry = PluginRegistry::new()
            .with(Plugin::new("first", |_, inferred| *inferred == NodeKind::Number))
            .unwrap()
            .with(Plugin::new("second", |_, _| true))
            .unwrap();
        let number = HostValue::Integer(3);
        let text = HostValue::Str("x".into());
        assert_eq!(
            registry.find_match(&number, &NodeKind::Number).map(Plugin::tag),
            Some("first")
        );
        assert_eq!(
            registry.find_match(&text, &NodeKind::String).map(Plugin::tag),
            Some("second")
        );
    }

    #[test]
    fn test_optional_hooks() {
        let plugin = any_string()
            .with_validator(|text| text.len() < 4)
            .with_error_message(ErrorLevel::Error, "too long");
        assert!(plugin.validate("abc"));
        assert!(!plugin.validate("abcd"));
        assert_eq!(plugin.parse("abc"), None);
        assert_eq!(plugin.error_message(ErrorLevel::Error), Some("too long"));
        assert_eq!(plugin.error_message(ErrorLevel::Warning), None);
        assert!(any_string().validate("anything at all"));
    }
}
