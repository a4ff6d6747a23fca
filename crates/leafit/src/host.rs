//! [`HostValue`]: what a dynamic host can hand to the tree builder.
//!
//! A `serde_json::Value` is always representable. Hosts bridging from a
//! scripting runtime can also produce values JSON has no form for (undefined
//! entries, big integers, binary blobs, functions or symbols); the builder
//! skips or rejects those.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    /// An absent value. Dropped inside arrays and objects, rejected elsewhere.
    Undefined,
    Bool(bool),
    Integer(i64),
    UInteger(u64),
    Float(f64),
    BigInt(i128),
    Bytes(Vec<u8>),
    Str(String),
    Array(Vec<HostValue>),
    /// Ordered key-value pairs, as given by the host.
    Object(Vec<(String, HostValue)>),
    /// A host value with no data representation (function, symbol, handle),
    /// described by the host.
    Opaque(String),
}

impl HostValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, HostValue::Undefined)
    }

    /// Short description used in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            HostValue::Null => "null",
            HostValue::Undefined => "undefined",
            HostValue::Bool(_) => "boolean",
            HostValue::Integer(_) | HostValue::UInteger(_) | HostValue::Float(_) => "number",
            HostValue::BigInt(_) => "bigint",
            HostValue::Bytes(_) => "binary",
            HostValue::Str(_) => "string",
            HostValue::Array(_) => "array",
            HostValue::Object(_) => "object",
            HostValue::Opaque(desc) => desc,
        }
    }
}

impl From<Value> for HostValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => HostValue::Null,
            Value::Bool(b) => HostValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    HostValue::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    HostValue::UInteger(u)
                } else {
                    HostValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => HostValue::Str(s),
            Value::Array(arr) => HostValue::Array(arr.into_iter().map(HostValue::from).collect()),
            Value::Object(obj) => HostValue::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, HostValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for HostValue {
    fn from(v: &Value) -> Self {
        HostValue::from(v.clone())
    }
}
