//! Pure tree mutations.
//!
//! Every operation takes the current tree by reference and returns a new one,
//! copying the nodes along the root-to-target path. On error the input tree is
//! left as it was. Nodes are matched by path only.

use leafit_path::{child_path, is_direct_child, parent_path, Segment};
use thiserror::Error;
use tracing::{debug, trace};

use crate::node::{Node, NodeKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Parent node at path \"{0}\" not found.")]
    ParentNotFound(String),
    #[error("Child node has invalid path ({0}).")]
    InvalidChildPath(String),
    #[error("A child node at path \"{0}\" already exists.")]
    ChildExists(String),
    #[error("Root node cannot be deleted.")]
    RootDeletion,
    #[error("Node at path \"{0}\" not found.")]
    NotFound(String),
    #[error("A node already exists at path \"{0}\"")]
    AlreadyExists(String),
    #[error("Updated node has invalid path ({0}).")]
    InvalidUpdatePath(String),
    #[error("Parent node must accept children but parent is of type {0}.")]
    NotAContainer(NodeKind),
    #[error("Children of the array at path \"{0}\" are addressed by index, none given.")]
    MissingIndex(String),
    #[error("Children of the object at path \"{0}\" are addressed by name, none given.")]
    MissingName(String),
}

// ── Lookup ────────────────────────────────────────────────────────────────

/// Whether a node with the path of `node` exists anywhere in `tree`.
pub fn has_node(node: &Node, tree: &Node) -> bool {
    has_path(&node.path, tree)
}

/// Whether a node at `path` exists anywhere in `tree`.
pub fn has_path(path: &str, tree: &Node) -> bool {
    tree.path == path || tree.children().iter().any(|child| has_path(path, child))
}

/// The node at `path`, searching pre-order.
///
/// # Example
///
/// ```
/// use leafit::{build, find_node};
/// use serde_json::json;
///
/// let tree = build(&json!({"arr": [42, {"k": "v"}]})).unwrap();
/// assert_eq!(find_node(&tree, "arr.1.k").and_then(|n| n.name.as_deref()), Some("k"));
/// assert!(find_node(&tree, "arr.2").is_none());
/// ```
pub fn find_node<'a>(tree: &'a Node, path: &str) -> Option<&'a Node> {
    if tree.path == path {
        return Some(tree);
    }
    tree.children().iter().find_map(|child| find_node(child, path))
}

/// The node holding the node at `path` as a direct child.
pub fn find_parent<'a>(tree: &'a Node, path: &str) -> Option<&'a Node> {
    if tree.children().iter().any(|child| child.path == path) {
        return Some(tree);
    }
    tree.children().iter().find_map(|child| find_parent(child, path))
}

// ── Mutations ─────────────────────────────────────────────────────────────

/// Appends `child` to the children of the node at the path of `parent`.
///
/// # Errors
///
/// - [`TreeError::ParentNotFound`] when no node has the parent path.
/// - [`TreeError::InvalidChildPath`] when `child` is not exactly one segment
///   below `parent`.
/// - [`TreeError::ChildExists`] when the parent already has that child.
/// - [`TreeError::NotAContainer`] when the parent is a leaf.
pub fn add_node_to_tree(parent: &Node, child: &Node, tree: &Node) -> Result<Node, TreeError> {
    if !has_node(parent, tree) {
        return Err(TreeError::ParentNotFound(parent.path.clone()));
    }
    if !is_direct_child(&parent.path, &child.path) {
        return Err(TreeError::InvalidChildPath(child.path.clone()));
    }
    debug!(parent = %parent.path, child = %child.path, "adding node");
    add(&parent.path, child, tree)
}

fn add(parent: &str, child: &Node, tree: &Node) -> Result<Node, TreeError> {
    if tree.path == parent {
        let Some(children) = &tree.children else {
            return Err(TreeError::NotAContainer(tree.kind.clone()));
        };
        if children.iter().any(|c| c.path == child.path) {
            return Err(TreeError::ChildExists(child.path.clone()));
        }
        let mut children = children.clone();
        children.push(child.clone());
        return Ok(Node {
            children: Some(children),
            ..tree.clone()
        });
    }

    map_children(tree, |sub| has_path(parent, sub), |sub| add(parent, child, sub))
}

/// Removes the node at the path of `node`.
///
/// Deleting a node that is not in the tree returns the tree unchanged. The
/// remaining siblings keep their paths, array indices are not renumbered.
///
/// # Errors
///
/// [`TreeError::RootDeletion`] when `node` is the root of `tree`.
pub fn delete_node_in_tree(node: &Node, tree: &Node) -> Result<Node, TreeError> {
    if node.path == tree.path && node.is_root {
        return Err(TreeError::RootDeletion);
    }
    if !has_node(node, tree) {
        trace!(path = %node.path, "delete target absent");
        return Ok(tree.clone());
    }
    debug!(path = %node.path, "deleting node");
    Ok(delete(node, tree))
}

fn delete(node: &Node, tree: &Node) -> Node {
    let children = tree.children();
    if children.iter().any(|c| c.path == node.path && c.is_root == node.is_root) {
        return Node {
            children: Some(
                children
                    .iter()
                    .filter(|c| c.path != node.path || c.is_root)
                    .cloned()
                    .collect(),
            ),
            ..tree.clone()
        };
    }

    let mut out = tree.clone();
    if let Some(children) = out.children.as_mut() {
        for child in children.iter_mut().filter(|c| has_node(node, c)) {
            *child = delete(node, child);
        }
    }
    out
}

/// Replaces the node at the path of `old` with `new`.
///
/// When both share a parent, `new` takes the position of `old`. When the
/// parent differs the node moves: it is removed from its old parent and
/// appended to the new one.
///
/// # Errors
///
/// - [`TreeError::NotFound`] when `old` is not in the tree.
/// - [`TreeError::AlreadyExists`] when `new` moves onto an occupied path.
/// - [`TreeError::InvalidUpdatePath`] when the new parent does not exist.
pub fn update_node_in_tree(old: &Node, new: &Node, tree: &Node) -> Result<Node, TreeError> {
    if new.path == tree.path && old.path == tree.path {
        return Ok(new.clone());
    }
    if !has_node(old, tree) {
        return Err(TreeError::NotFound(old.path.clone()));
    }
    if old.path != new.path && has_node(new, tree) {
        return Err(TreeError::AlreadyExists(new.path.clone()));
    }

    let new_parent = parent_path(&new.path);
    if parent_path(&old.path) != new_parent {
        let Some(destination) = find_node(tree, new_parent) else {
            return Err(TreeError::InvalidUpdatePath(new.path.clone()));
        };
        debug!(from = %old.path, to = %new.path, "moving node");
        let without_old = delete_node_in_tree(old, tree)?;
        return add_node_to_tree(destination, new, &without_old);
    }

    debug!(from = %old.path, to = %new.path, "updating node");
    Ok(update(old, new, tree))
}

fn update(old: &Node, new: &Node, tree: &Node) -> Node {
    if new.path == tree.path && old.path == tree.path {
        return new.clone();
    }

    let mut out = tree.clone();
    if let Some(children) = out.children.as_mut() {
        if let Some(slot) = children.iter_mut().find(|c| c.path == old.path) {
            *slot = new.clone();
        } else if let Some(sub) = children.iter_mut().find(|c| has_node(old, c)) {
            *sub = update(old, new, sub);
        }
    }
    out
}

fn map_children(
    tree: &Node,
    mut select: impl FnMut(&Node) -> bool,
    mut apply: impl FnMut(&Node) -> Result<Node, TreeError>,
) -> Result<Node, TreeError> {
    let mut out = tree.clone();
    if let Some(children) = out.children.as_mut() {
        for child in children.iter_mut() {
            if select(child) {
                *child = apply(child)?;
            }
        }
    }
    Ok(out)
}

// ── Relocation ────────────────────────────────────────────────────────────

/// A copy of `child` addressed as a child of `parent`, with every descendant
/// path recomputed.
///
/// Array parents address the child by `index`. Object parents use the slug
/// of the child name, so a nameless child is refused. Plugin containers use
/// the name when the child has one and the index otherwise. The copy is never
/// a root.
///
/// # Example
///
/// ```
/// use leafit::{update_node_path, Node};
///
/// let parent = Node::array("list", vec![]);
/// let child = Node::object("old", vec![Node::number("old.x", 1).with_name("x")]).with_name("old");
/// let moved = update_node_path(&parent, &child, Some(2)).unwrap();
/// assert_eq!(moved.path, "list.2");
/// assert_eq!(moved.children()[0].path, "list.2.x");
/// ```
pub fn update_node_path(parent: &Node, child: &Node, index: Option<usize>) -> Result<Node, TreeError> {
    if parent.children.is_none() {
        return Err(TreeError::NotAContainer(parent.kind.clone()));
    }
    let segment = child_segment(&parent.kind, child, index)
        .ok_or_else(|| match parent.kind {
            NodeKind::Object => TreeError::MissingName(parent.path.clone()),
            _ => TreeError::MissingIndex(parent.path.clone()),
        })?;

    let mut moved = child.clone();
    moved.path = child_path(&parent.path, segment);
    moved.is_root = false;
    rebase_children(&mut moved);
    Ok(moved)
}

/// Recomputes the paths of all descendants of `node` from its own path.
pub(crate) fn rebase_children(node: &mut Node) {
    let Node {
        kind, path, children, ..
    } = node;
    let Some(children) = children.as_mut() else {
        return;
    };
    for (index, child) in children.iter_mut().enumerate() {
        if let Some(segment) = child_segment(kind, child, Some(index)) {
            let rebased = child_path(path, segment);
            child.path = rebased;
        }
        rebase_children(child);
    }
}

fn child_segment<'a>(parent: &NodeKind, child: &'a Node, index: Option<usize>) -> Option<Segment<'a>> {
    match (parent, child.name.as_deref(), index) {
        (NodeKind::Array, _, index) => index.map(Segment::Index),
        (NodeKind::Custom(_), None, index) => index.map(Segment::Index),
        (_, name, _) => name.map(Segment::Key),
    }
}
