//! Node hashing and memoized lookups.
//!
//! The hash is a 32-bit rolling hash of the node's compact JSON form, used to
//! tell whether a subtree changed between two versions of a tree. It is not
//! collision resistant.

use std::collections::HashMap;

use crate::node::Node;
use crate::tree::has_node;

/// Folds the UTF-16 code units of `s` with `h = h * 31 + c`, wrapping at 32
/// bits.
///
/// # Example
///
/// ```
/// use leafit::memo::hash_str;
///
/// assert_eq!(hash_str(""), 0);
/// assert_eq!(hash_str("a"), 97);
/// assert_eq!(hash_str("ab"), 97 * 31 + 98);
/// ```
pub fn hash_str(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Hash of the compact JSON serialization of `node`.
///
/// # Example
///
/// ```
/// use leafit::{hash_code, Node, NodeKind};
///
/// assert_eq!(hash_code(&Node::new(NodeKind::String, "key")), -1951898125);
/// ```
pub fn hash_code(node: &Node) -> i32 {
    // Serializing a node cannot fail: every map key is a string.
    serde_json::to_string(node).map_or(0, |json| hash_str(&json))
}

/// Whether two versions of a subtree hash the same.
pub fn subtree_unchanged(prev: &Node, next: &Node) -> bool {
    hash_code(prev) == hash_code(next)
}

/// [`has_node`] answered from `cache` when possible.
///
/// Entries are keyed by the hash of the node path and `tree_hash`, the
/// [`hash_code`] of `tree`. The caller computes it once per tree version:
/// hashing serializes the whole tree and costs more than one lookup.
pub fn memoized_has_node(
    cache: &mut HashMap<(i32, i32), bool>,
    node: &Node,
    tree: &Node,
    tree_hash: i32,
) -> bool {
    *cache
        .entry((hash_str(&node.path), tree_hash))
        .or_insert_with(|| has_node(node, tree))
}

/// A caller-owned [`memoized_has_node`] cache. Entries are never evicted.
#[derive(Debug, Default, Clone)]
pub struct HasNodeCache {
    entries: HashMap<(i32, i32), bool>,
}

impl HasNodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`memoized_has_node`] for `tree_hash`.
    pub fn has_node(&mut self, node: &Node, tree: &Node, tree_hash: i32) -> bool {
        memoized_has_node(&mut self.entries, node, tree, tree_hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
