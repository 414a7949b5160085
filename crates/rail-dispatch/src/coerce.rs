//! Best-effort conversion of untyped JSON into declared parameter types.
//!
//! Coercion is deliberately permissive. Input that cannot be converted leaves
//! the argument slot unbound instead of failing the call, and the hosted
//! method then observes the zero value for that parameter. Callers that need
//! strict validation must perform it inside the hosted method.

use serde_json::Value as JsonValue;
use tracing::trace;

use crate::value::{Value, ValueType};

const COERCE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::coerce");

/// Converts `value` into the `target` type.
///
/// Returns `None` when no conversion applies; the slot stays unbound.
///
/// | target   | accepted input                                              |
/// |----------|-------------------------------------------------------------|
/// | `Int`    | numbers (truncated toward zero), numeric strings            |
/// | `Float`  | numbers, numeric strings                                    |
/// | `Bool`   | booleans; strings (`"true"` is true, anything else false)   |
/// | `String` | strings verbatim; any other value as its JSON text          |
/// | others   | nothing                                                     |
#[must_use]
pub fn coerce(value: &JsonValue, target: ValueType) -> Option<Value> {
    let coerced = match target {
        ValueType::Int => coerce_int(value).map(Value::Int),
        ValueType::Float => coerce_float(value).map(Value::Float),
        ValueType::Bool => coerce_bool(value).map(Value::Bool),
        ValueType::String => Some(Value::String(coerce_string(value))),
        ValueType::Void | ValueType::Opaque(_) => None,
    };
    if coerced.is_none() {
        trace!(target: COERCE_TARGET, %target, input = %value, "argument left unbound");
    }
    coerced
}

fn coerce_int(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(number) => number
            .as_i64()
            .or_else(|| number.as_u64().map(|wide| i64::try_from(wide).unwrap_or(i64::MAX)))
            .or_else(|| number.as_f64().and_then(truncate)),
        JsonValue::String(text) => parse_int(text),
        _ => None,
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| parse_finite(trimmed).and_then(truncate))
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "integer parameters truncate fractional input; `as` saturates out-of-range values"
)]
fn truncate(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.trunc() as i64)
}

fn coerce_float(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(number) => number.as_f64(),
        JsonValue::String(text) => parse_finite(text.trim()),
        _ => None,
    }
}

fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

fn coerce_bool(value: &JsonValue) -> Option<bool> {
    match value {
        JsonValue::Bool(flag) => Some(*flag),
        JsonValue::String(text) => Some(text == "true"),
        _ => None,
    }
}

fn coerce_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(text) => text.clone(),
        other => other.to_string(),
    }
}
