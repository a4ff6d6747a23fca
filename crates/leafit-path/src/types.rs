//! Type definitions for node paths.

use std::fmt;

use crate::util::slug;

/// Separator between two path segments.
pub const SEPARATOR: char = '.';

/// The last step of a path, as seen from the parent.
///
/// Object children are addressed by key, array children by index. Keys are
/// slugified when they are turned into a path segment; the original key is
/// kept by the node itself as its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// An object key, in its original (display) form.
    Key(&'a str),
    /// An array index.
    Index(usize),
}

impl Segment<'_> {
    /// The text this segment contributes to a path.
    ///
    /// # Example
    ///
    /// ```
    /// use leafit_path::Segment;
    ///
    /// assert_eq!(Segment::Key("Some Key").encode(), "some-key");
    /// assert_eq!(Segment::Index(3).encode(), "3");
    /// ```
    pub fn encode(&self) -> String {
        match self {
            Segment::Key(key) => slug(key),
            Segment::Index(index) => index.to_string(),
        }
    }
}

impl<'a> From<&'a str> for Segment<'a> {
    fn from(key: &'a str) -> Self {
        Segment::Key(key)
    }
}

impl<'a> From<&'a String> for Segment<'a> {
    fn from(key: &'a String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment<'_> {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

impl fmt::Display for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
