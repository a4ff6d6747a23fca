//! Validation functions for node paths.

use thiserror::Error;

use crate::util::segments;

/// Maximum allowed path depth.
const MAX_PATH_DEPTH: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Path too deep ({depth} segments)")]
    TooDeep { depth: usize },
    #[error("Invalid path segment \"{segment}\" in \"{path}\"")]
    InvalidSegment { path: String, segment: String },
}

/// Check that a segment only uses the characters a slug or an index can
/// produce. The empty segment (an empty object key) is allowed.
pub fn is_valid_segment(segment: &str) -> bool {
    segment
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Validate a path string.
///
/// # Errors
///
/// Returns an error if:
/// - The path has more than 256 segments
/// - A segment contains a character no slug or index can contain
///
/// # Example
///
/// ```
/// use leafit_path::validate_path;
///
/// validate_path("").unwrap();
/// validate_path("arr.1.some-key").unwrap();
/// validate_path("Arr.1").unwrap_err();
/// ```
pub fn validate_path(path: &str) -> Result<(), PathError> {
    let mut depth = 0;
    for segment in segments(path) {
        depth += 1;
        if !is_valid_segment(segment) {
            return Err(PathError::InvalidSegment {
                path: path.to_string(),
                segment: segment.to_string(),
            });
        }
    }
    if depth > MAX_PATH_DEPTH {
        return Err(PathError::TooDeep { depth });
    }
    Ok(())
}
