//! A stateful editing session over one tree.
//!
//! [`Editor`] owns the current tree and applies the pure mutations of
//! [`crate::tree`] to it, refusing edits that touch readonly paths. It also
//! keeps the per-session view state: which nodes are expanded, which one is
//! being edited, and the copied node.

use std::collections::HashMap;
use std::fmt;

use leafit_path::{child_path, index_of, is_within, last_segment};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::EditorConfig;
use crate::describe::{describe, DescribeError, DescribeOptions};
use crate::edit::{is_placeholder, EditError, LeafDraft, LeafMode};
use crate::host::HostValue;
use crate::node::Node;
use crate::plugin::{Nesting, PluginRegistry};
use crate::serialize::{to_json_with, SerializeError};
use crate::tree::{
    add_node_to_tree, delete_node_in_tree, find_node, find_parent, update_node_in_tree,
    update_node_path, TreeError,
};

pub type ChangeListener = Box<dyn FnMut(&Value)>;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Describe(#[from] DescribeError),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error("Nothing to paste, the clipboard is empty")]
    EmptyClipboard,
    #[error("Node at path \"{0}\" not found.")]
    UnknownPath(String),
}

/// What an edit request did to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// Refused: a readonly rule covers the target.
    Readonly,
    /// Accepted but the tree is identical, e.g. deleting an absent node.
    Unchanged,
}

pub struct Editor {
    tree: Node,
    config: EditorConfig,
    plugins: PluginRegistry,
    expanded: HashMap<String, bool>,
    editing: Option<String>,
    clipboard: Option<Node>,
    listeners: Vec<ChangeListener>,
}

impl Editor {
    pub fn new(json: &Value, config: EditorConfig) -> Result<Self, DescribeError> {
        Self::with_plugins(json, config, PluginRegistry::new())
    }

    pub fn with_plugins(json: &Value, config: EditorConfig, plugins: PluginRegistry) -> Result<Self, DescribeError> {
        let tree = describe(&HostValue::from(json), &DescribeOptions::default().with_plugins(&plugins))?;
        Ok(Self::from_tree(tree, config, plugins))
    }

    pub fn from_tree(tree: Node, config: EditorConfig, plugins: PluginRegistry) -> Self {
        Editor {
            tree,
            config,
            plugins,
            expanded: HashMap::new(),
            editing: None,
            clipboard: None,
            listeners: Vec::new(),
        }
    }

    pub fn tree(&self) -> &Node {
        &self.tree
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    pub fn find(&self, path: &str) -> Option<&Node> {
        find_node(&self.tree, path)
    }

    pub fn to_json(&self) -> Result<Value, SerializeError> {
        to_json_with(&self.tree, &self.plugins)
    }

    /// Registers a callback receiving the document after every applied edit.
    pub fn on_change(&mut self, listener: impl FnMut(&Value) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Replaces the document, dropping all session state but the listeners.
    pub fn reset(&mut self, json: &Value) -> Result<(), DescribeError> {
        self.tree = describe(&HostValue::from(json), &DescribeOptions::default().with_plugins(&self.plugins))?;
        self.expanded.clear();
        self.editing = None;
        self.clipboard = None;
        Ok(())
    }

    // ── Mutations ─────────────────────────────────────────────────────────

    pub fn add_node(&mut self, parent: &Node, child: &Node) -> Result<EditOutcome, EditorError> {
        if self.config.is_readonly(&parent.path) {
            warn!(parent = %parent.path, "add refused, parent is readonly");
            return Ok(EditOutcome::Readonly);
        }
        let next = add_node_to_tree(parent, child, &self.tree)?;
        Ok(self.commit(next))
    }

    pub fn update_node(&mut self, old: &Node, new: &Node) -> Result<EditOutcome, EditorError> {
        if self.config.is_readonly(&old.path) || self.config.is_readonly(&new.path) {
            warn!(from = %old.path, to = %new.path, "update refused, path is readonly");
            return Ok(EditOutcome::Readonly);
        }
        let next = update_node_in_tree(old, new, &self.tree)?;
        Ok(self.commit(next))
    }

    pub fn delete_node(&mut self, node: &Node) -> Result<EditOutcome, EditorError> {
        if self.config.is_readonly(&node.path) {
            warn!(path = %node.path, "delete refused, node is readonly");
            return Ok(EditOutcome::Readonly);
        }
        let next = delete_node_in_tree(node, &self.tree)?;
        let outcome = self.commit(next);
        if outcome == EditOutcome::Applied {
            self.forget_below(&node.path);
        }
        Ok(outcome)
    }

    /// Drops view state of paths that no longer exist.
    fn forget_below(&mut self, path: &str) {
        if self.editing.as_deref().is_some_and(|editing| is_within(path, editing)) {
            self.editing = None;
        }
        self.expanded.retain(|expanded, _| !is_within(path, expanded));
    }

    /// Applies an inline-edit draft to the node at `path`.
    pub fn submit(&mut self, path: &str, draft: &LeafDraft) -> Result<EditOutcome, EditorError> {
        let old = self.lookup(path)?.clone();
        let mode = match find_parent(&self.tree, path) {
            Some(parent) => LeafMode::of_children(parent, &self.plugins),
            None => LeafMode::Root,
        };
        let new = draft.apply(&old, mode, &self.plugins)?;
        let outcome = self.update_node(&old, &new)?;
        if outcome == EditOutcome::Applied {
            self.editing = None;
        }
        Ok(outcome)
    }

    /// Appends an empty string child to `parent` and starts editing it.
    pub fn add_placeholder(&mut self, parent: &Node) -> Result<EditOutcome, EditorError> {
        let path = match self.plugins.nesting_of(&parent.kind) {
            Nesting::Array => child_path(&parent.path, next_index(parent)),
            _ => child_path(&parent.path, ""),
        };
        let child = Node::string(path, "").with_name("");
        let outcome = self.add_node(parent, &child)?;
        if outcome == EditOutcome::Applied {
            self.editing = Some(child.path);
        }
        Ok(outcome)
    }

    /// Stops editing. An untouched placeholder is removed.
    pub fn cancel_edit(&mut self) -> Result<EditOutcome, EditorError> {
        let Some(path) = self.editing.take() else {
            return Ok(EditOutcome::Unchanged);
        };
        match find_placeholder(&self.tree, &path) {
            Some(node) => {
                let node = node.clone();
                self.delete_node(&node)
            }
            None => Ok(EditOutcome::Unchanged),
        }
    }

    fn commit(&mut self, next: Node) -> EditOutcome {
        if next == self.tree {
            return EditOutcome::Unchanged;
        }
        self.tree = next;
        debug!(nodes = self.tree.node_count(), "tree changed");

        if !self.listeners.is_empty() {
            match to_json_with(&self.tree, &self.plugins) {
                Ok(json) => self.listeners.iter_mut().for_each(|listener| listener(&json)),
                Err(err) => warn!(error = %err, "change not reported, tree does not serialize"),
            }
        }
        EditOutcome::Applied
    }

    fn lookup(&self, path: &str) -> Result<&Node, EditorError> {
        find_node(&self.tree, path).ok_or_else(|| EditorError::UnknownPath(path.to_string()))
    }

    // ── Clipboard ─────────────────────────────────────────────────────────

    /// Stores `node` for a later paste and returns its compact JSON text.
    pub fn copy(&mut self, node: &Node) -> Result<String, EditorError> {
        let json = to_json_with(node, &self.plugins)?;
        self.clipboard = Some(node.clone());
        Ok(json.to_string())
    }

    pub fn clipboard(&self) -> Option<&Node> {
        self.clipboard.as_ref()
    }

    pub fn clear_clipboard(&mut self) {
        self.clipboard = None;
    }

    /// Adds the copied node under `parent`.
    ///
    /// Array parents place it at `index`, defaulting to after the highest
    /// index in use. Under an object a nameless node (an array element) is
    /// keyed by its last path segment; the root has none and is refused.
    pub fn paste(&mut self, parent: &Node, index: Option<usize>) -> Result<EditOutcome, EditorError> {
        let mut clip = self.clipboard.clone().ok_or(EditorError::EmptyClipboard)?;
        let index = match self.plugins.nesting_of(&parent.kind) {
            Nesting::Array => {
                if parent.kind.is_custom() {
                    clip.name = None;
                }
                Some(index.unwrap_or_else(|| next_index(parent)))
            }
            _ => {
                let key = last_segment(&clip.path);
                if clip.name.is_none() && !key.is_empty() {
                    clip.name = Some(key.to_string());
                }
                index
            }
        };
        let moved = update_node_path(parent, &clip, index)?;
        self.add_node(parent, &moved)
    }

    // ── View state ────────────────────────────────────────────────────────

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded
            .get(path)
            .copied()
            .unwrap_or_else(|| self.config.should_expand(path))
    }

    pub fn set_expanded(&mut self, path: &str, expanded: bool) {
        self.expanded.insert(path.to_string(), expanded);
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn set_editing(&mut self, path: Option<&str>) {
        self.editing = path.map(str::to_string);
    }

    pub fn is_readonly(&self, path: &str) -> bool {
        self.config.is_readonly(path)
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("tree", &self.tree)
            .field("config", &self.config)
            .field("plugins", &self.plugins)
            .field("expanded", &self.expanded)
            .field("editing", &self.editing)
            .field("clipboard", &self.clipboard)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// The placeholder at `path`. The root never is one, even when an empty key
/// gives a child the root path.
fn find_placeholder<'a>(tree: &'a Node, path: &str) -> Option<&'a Node> {
    if !tree.is_root && tree.path == path && is_placeholder(tree) {
        return Some(tree);
    }
    tree.children().iter().find_map(|child| find_placeholder(child, path))
}

/// First array index above every index in use under `parent`.
pub(crate) fn next_index(parent: &Node) -> usize {
    parent
        .children()
        .iter()
        .filter_map(|child| index_of(last_segment(&child.path)))
        .max()
        .map_or(0, |max| max + 1)
}
