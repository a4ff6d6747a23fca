//! Message lookup in nested translation tables.
//!
//! Keys are dotted paths into a JSON object whose leaves are strings, e.g.
//! `leaf.edit.input.key.label`. A key that does not resolve to a string is
//! returned as is.

use std::sync::OnceLock;

use serde_json::Value;

static BUNDLED: OnceLock<Value> = OnceLock::new();

/// The English table shipped with the crate.
pub fn default_translations() -> &'static Value {
    BUNDLED.get_or_init(|| serde_json::from_str(include_str!("../i18n/en.json")).unwrap_or(Value::Null))
}

/// The string at `key` in `translations`, if any.
pub fn lookup<'a>(key: &str, translations: &'a Value) -> Option<&'a str> {
    key.split('.')
        .try_fold(translations, |table, part| table.get(part))
        .and_then(Value::as_str)
}

/// The string at `key` in `translations`, or `key` itself.
///
/// # Example
///
/// ```
/// use leafit::i18n::{default_translations, t};
///
/// assert_eq!(t("leaf.view.action.toolbar.label.open", default_translations()), "Open toolbar");
/// assert_eq!(t("leaf.view", default_translations()), "leaf.view");
/// ```
pub fn t(key: &str, translations: &Value) -> String {
    lookup(key, translations).unwrap_or(key).to_string()
}

/// [`t`] against `overrides` first, then the bundled table.
pub fn translate(key: &str, overrides: Option<&Value>) -> String {
    overrides
        .and_then(|table| lookup(key, table))
        .or_else(|| lookup(key, default_translations()))
        .unwrap_or(key)
        .to_string()
}
