use crate::types::{Segment, SEPARATOR};

/// Turns an object key into the kebab-cased form used as a path segment.
///
/// Camel-case boundaries get a hyphen, runs of whitespace and underscores
/// collapse into a single hyphen, everything outside `[a-zA-Z0-9-]` is
/// dropped and the result is lowercased.
///
/// # Example
///
/// ```
/// use leafit_path::slug;
///
/// assert_eq!(slug("Some Key"), "some-key");
/// assert_eq!(slug("camelCase"), "camel-case");
/// assert_eq!(slug("snake__case"), "snake-case");
/// assert_eq!(slug("a.b"), "ab");
/// ```
pub fn slug(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut prev: Option<char> = None;
    let mut in_gap = false;

    for ch in key.chars() {
        if ch == '_' || ch.is_whitespace() {
            if !in_gap {
                out.push('-');
                in_gap = true;
            }
            prev = Some(ch);
            continue;
        }
        in_gap = false;

        if ch.is_ascii_uppercase() && prev.is_some_and(|p| p.is_ascii_lowercase()) {
            out.push('-');
        }
        if ch.is_ascii_alphanumeric() || ch == '-' {
            out.push(ch.to_ascii_lowercase());
        }
        prev = Some(ch);
    }
    out
}

/// Path of a child of the node at `parent`.
///
/// Children of the root (empty path) get the bare segment; all others are
/// joined with a dot.
///
/// # Example
///
/// ```
/// use leafit_path::child_path;
///
/// assert_eq!(child_path("", "key"), "key");
/// assert_eq!(child_path("arr", 1), "arr.1");
/// assert_eq!(child_path("a.0", "Some Key"), "a.0.some-key");
/// ```
pub fn child_path<'a>(parent: &str, segment: impl Into<Segment<'a>>) -> String {
    let segment = segment.into().encode();
    if parent.is_empty() {
        return segment;
    }
    let mut out = String::with_capacity(parent.len() + 1 + segment.len());
    out.push_str(parent);
    out.push(SEPARATOR);
    out.push_str(&segment);
    out
}

/// Path of the parent of `path`: every segment but the last.
///
/// # Example
///
/// ```
/// use leafit_path::parent_path;
///
/// assert_eq!(parent_path("a.b.c"), "a.b");
/// assert_eq!(parent_path("a"), "");
/// assert_eq!(parent_path(""), "");
/// ```
pub fn parent_path(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Last segment of `path`, or the whole path when it has a single segment.
pub fn last_segment(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Iterates over the segments of `path`. The root path has none.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    let path = if path.is_empty() { None } else { Some(path) };
    path.into_iter().flat_map(|p| p.split(SEPARATOR))
}

/// Number of segments in `path`.
pub fn depth(path: &str) -> usize {
    segments(path).count()
}

/// Replaces the last segment of `path` with the encoded `segment`.
///
/// # Example
///
/// ```
/// use leafit_path::replace_last_segment;
///
/// assert_eq!(replace_last_segment("a.old", "New Name"), "a.new-name");
/// assert_eq!(replace_last_segment("old", "renamed"), "renamed");
/// ```
pub fn replace_last_segment<'a>(path: &str, segment: impl Into<Segment<'a>>) -> String {
    child_path(parent_path(path), segment)
}

/// Checks that `child` sits exactly one segment below `parent`.
///
/// Under the root any single segment qualifies, including the empty one
/// produced by an empty object key.
///
/// # Example
///
/// ```
/// use leafit_path::is_direct_child;
///
/// assert!(is_direct_child("", "key"));
/// assert!(is_direct_child("a.b", "a.b.c"));
/// assert!(!is_direct_child("a", "a.b.c"));
/// assert!(!is_direct_child("a", "ab"));
/// assert!(!is_direct_child("", "some.nested.key"));
/// ```
pub fn is_direct_child(parent: &str, child: &str) -> bool {
    if parent.is_empty() {
        return !child.contains(SEPARATOR);
    }
    child
        .strip_prefix(parent)
        .and_then(|rest| rest.strip_prefix(SEPARATOR))
        .is_some_and(|rest| !rest.contains(SEPARATOR))
}

/// Checks that `path` is `ancestor` itself or lies somewhere below it.
pub fn is_within(ancestor: &str, path: &str) -> bool {
    if ancestor.is_empty() || ancestor == path {
        return true;
    }
    path.strip_prefix(ancestor)
        .is_some_and(|rest| rest.starts_with(SEPARATOR))
}

/// The array index a segment encodes, if it is one.
///
/// Indices are written in canonical decimal, so `"01"` is a key, not index 1.
///
/// # Example
///
/// ```
/// use leafit_path::index_of;
///
/// assert_eq!(index_of("0"), Some(0));
/// assert_eq!(index_of("123"), Some(123));
/// assert_eq!(index_of("01"), None);
/// assert_eq!(index_of("some-key"), None);
/// ```
pub fn index_of(segment: &str) -> Option<usize> {
    match segment.as_bytes() {
        [] | [b'0', _, ..] => None,
        digits if digits.iter().all(u8::is_ascii_digit) => segment.parse().ok(),
        _ => None,
    }
}
