//! Value classification: which [`NodeKind`] a host value becomes.

use thiserror::Error;

use crate::host::HostValue;
use crate::node::NodeKind;
use crate::plugin::PluginRegistry;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("{0} is not representable in JSON")]
    Unrepresentable(String),
}

/// Base classification, ignoring plugins.
///
/// # Errors
///
/// Undefined, big integers, binary data, opaque host values and non-finite
/// floats have no JSON form.
pub fn infer_kind(value: &HostValue) -> Result<NodeKind, ClassifyError> {
    match value {
        HostValue::Null => Ok(NodeKind::Null),
        HostValue::Bool(_) => Ok(NodeKind::Boolean),
        HostValue::Integer(_) | HostValue::UInteger(_) => Ok(NodeKind::Number),
        HostValue::Float(f) if f.is_finite() => Ok(NodeKind::Number),
        HostValue::Float(f) => Err(ClassifyError::Unrepresentable(f.to_string())),
        HostValue::Str(_) => Ok(NodeKind::String),
        HostValue::Array(_) => Ok(NodeKind::Array),
        HostValue::Object(_) => Ok(NodeKind::Object),
        HostValue::Undefined
        | HostValue::BigInt(_)
        | HostValue::Bytes(_)
        | HostValue::Opaque(_) => Err(ClassifyError::Unrepresentable(value.type_name().to_string())),
    }
}

/// Full classification: the first plugin claiming the value, otherwise the
/// base kind.
///
/// Plugins only refine values that already have a JSON form; an
/// unrepresentable value is an error whatever the registry holds.
pub fn classify(value: &HostValue, plugins: &PluginRegistry) -> Result<NodeKind, ClassifyError> {
    let inferred = infer_kind(value)?;
    Ok(plugins
        .find_match(value, &inferred)
        .map(|plugin| plugin.kind())
        .unwrap_or(inferred))
}
