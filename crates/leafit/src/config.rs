//! Editor configuration: readonly and collapse rules matched against node
//! paths, warning switch and translation overrides.
//!
//! A rule is either a flag applying to every node or a list of regular
//! expressions, a node being selected when any of them matches its path.
//!
//! ```
//! use leafit::EditorConfig;
//!
//! let config = EditorConfig::from_json_str(r#"{"readonly": ["^settings\\."]}"#).unwrap();
//! assert!(config.is_readonly("settings.theme"));
//! assert!(!config.is_readonly("data.0"));
//! ```

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::i18n;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid path pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Invalid editor config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A regular expression tested against node paths.
#[derive(Clone)]
pub struct PathPattern(Regex);

impl PathPattern {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        Regex::new(pattern)
            .map(PathPattern)
            .map_err(|source| ConfigError::Pattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.0.is_match(path)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for PathPattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PathPattern::new(s)
    }
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.0.as_str())
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<'de> Deserialize<'de> for PathPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        PathPattern::new(&pattern).map_err(de::Error::custom)
    }
}

/// A flag or a list of path patterns.
#[derive(Debug, Clone, PartialEq)]
pub enum PathRule {
    Flag(bool),
    Patterns(Vec<PathPattern>),
}

impl<'de> Deserialize<'de> for PathRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Patterns(Vec<String>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(flag) => Ok(PathRule::Flag(flag)),
            Raw::Patterns(patterns) => {
                PathRule::patterns(patterns.iter().map(String::as_str)).map_err(de::Error::custom)
            }
        }
    }
}

impl PathRule {
    pub fn patterns<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Result<Self, ConfigError> {
        patterns
            .into_iter()
            .map(PathPattern::new)
            .collect::<Result<Vec<_>, _>>()
            .map(PathRule::Patterns)
    }

    fn any_match(&self, path: &str) -> bool {
        match self {
            PathRule::Flag(_) => false,
            PathRule::Patterns(patterns) => patterns.iter().any(|p| p.is_match(path)),
        }
    }
}

/// `true` for a `true` flag, or for a pattern list when a path is given and
/// one pattern matches it.
pub fn is_readonly(rule: Option<&PathRule>, path: Option<&str>) -> bool {
    match (rule, path) {
        (Some(PathRule::Flag(flag)), _) => *flag,
        (Some(rule), Some(path)) => rule.any_match(path),
        _ => false,
    }
}

/// The flag itself, or for a pattern list whether a non-empty path matches.
pub fn should_collapse(rule: Option<&PathRule>, path: Option<&str>) -> bool {
    match (rule, path) {
        (Some(PathRule::Flag(flag)), _) => *flag,
        (Some(rule), Some(path)) if !path.is_empty() => rule.any_match(path),
        _ => false,
    }
}

/// Initial expansion state of the node at `path`.
pub fn should_expand(rule: Option<&PathRule>, path: Option<&str>) -> bool {
    !should_collapse(rule, path)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub readonly: Option<PathRule>,
    pub collapsed: Option<PathRule>,
    pub disable_warnings: bool,
    /// Overrides for the bundled English messages, as a nested object.
    pub translations: Option<Value>,
}

impl EditorConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn readonly_all() -> Self {
        EditorConfig {
            readonly: Some(PathRule::Flag(true)),
            ..Self::default()
        }
    }

    pub fn is_readonly(&self, path: &str) -> bool {
        is_readonly(self.readonly.as_ref(), Some(path))
    }

    pub fn should_collapse(&self, path: &str) -> bool {
        should_collapse(self.collapsed.as_ref(), Some(path))
    }

    pub fn should_expand(&self, path: &str) -> bool {
        should_expand(self.collapsed.as_ref(), Some(path))
    }

    /// Message for `key`, from the overrides first, then the bundled table.
    pub fn t(&self, key: &str) -> String {
        i18n::translate(key, self.translations.as_ref())
    }
}
