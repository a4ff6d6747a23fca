//! Node path utilities for leafit trees.
//!
//! A path addresses a node inside a tree built from a JSON value. The root has
//! the empty path, object children append the slug of their key and array
//! children append their index, segments being joined with `.`.
//!
//! # Example
//!
//! ```
//! use leafit_path::{child_path, parent_path, slug};
//!
//! let arr = child_path("", "arr");
//! let item = child_path(&arr, 1);
//! assert_eq!(item, "arr.1");
//! assert_eq!(child_path(&item, "Some Key"), "arr.1.some-key");
//! assert_eq!(parent_path(&item), "arr");
//! assert_eq!(slug("camelCaseKey"), "camel-case-key");
//! ```

pub mod types;
pub use types::{Segment, SEPARATOR};

pub mod util;
pub use util::{
    child_path, depth, index_of, is_direct_child, is_within, last_segment, parent_path,
    replace_last_segment, segments, slug,
};

pub mod validate;
pub use validate::{is_valid_segment, validate_path, PathError};
