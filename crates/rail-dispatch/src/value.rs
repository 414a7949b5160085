//! Type identities and runtime values exchanged with hosted methods.

use std::fmt;

use serde_json::Value as JsonValue;

/// Declared type of a parameter or return value.
///
/// The identity drives argument coercion and is published in the manifest
/// through [`ValueType::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// No value; only meaningful as a return type.
    Void,
    /// Signed integer.
    Int,
    /// Floating-point number.
    Float,
    /// Boolean flag.
    Bool,
    /// UTF-8 text.
    String,
    /// Any other type. Arguments of this type are never coerced.
    Opaque(&'static str),
}

impl ValueType {
    /// Returns the type name published in manifests.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Opaque(name) => name,
        }
    }

    /// Returns `true` for [`ValueType::Void`].
    #[must_use]
    pub const fn is_void(self) -> bool {
        matches!(self, Self::Void)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value flowing into or out of a hosted method.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Returned by methods without a result.
    Void,
    /// Signed integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// Boolean flag.
    Bool(bool),
    /// UTF-8 text.
    String(String),
    /// Structured data returned verbatim by a hosted method.
    Json(JsonValue),
}

impl Value {
    /// Returns `true` for [`Value::Void`].
    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// Returns the type identity of this value. Structured values report an
    /// opaque `json` type.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Void => ValueType::Void,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Bool(_) => ValueType::Bool,
            Self::String(_) => ValueType::String,
            Self::Json(_) => ValueType::Opaque("json"),
        }
    }

    /// Renders the value as the string carried by a result envelope.
    ///
    /// Numbers and booleans are stringified rather than kept as native JSON
    /// types; structured values become compact JSON text.
    #[must_use]
    pub fn to_result_string(&self) -> String {
        match self {
            Self::Void => String::from("void"),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
            Self::String(value) => value.clone(),
            Self::Json(value) => value.to_string(),
        }
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Void
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        Self::Json(value)
    }
}
