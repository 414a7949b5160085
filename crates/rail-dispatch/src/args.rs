//! Positional argument slots handed to method invokers.

use serde_json::Value as JsonValue;

use crate::value::Value;

/// Arguments bound for a single invocation, one slot per declared parameter.
///
/// Slots that could not be bound (missing input or failed coercion) hold
/// `None`. The typed accessors return the zero value for unbound or
/// mismatched slots so invokers never have to handle absence explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    slots: Vec<Option<Value>>,
}

impl Arguments {
    /// Creates `count` unbound slots.
    #[must_use]
    pub fn unbound(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    /// Binds `value` into the slot at `index`. Indices past the declared
    /// parameter count are ignored.
    pub fn bind(&mut self, index: usize, value: Option<Value>) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = value;
        }
    }

    /// Number of slots, equal to the method's declared parameter count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when the method declares no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the bound value at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Returns `true` when the slot at `index` holds a value.
    #[must_use]
    pub fn is_bound(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Integer at `index`, or `0`.
    #[must_use]
    pub fn int(&self, index: usize) -> i64 {
        match self.get(index) {
            Some(Value::Int(value)) => *value,
            _ => 0,
        }
    }

    /// Float at `index`, or `0.0`.
    #[must_use]
    pub fn float(&self, index: usize) -> f64 {
        match self.get(index) {
            Some(Value::Float(value)) => *value,
            _ => 0.0,
        }
    }

    /// Boolean at `index`, or `false`.
    #[must_use]
    pub fn bool(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Value::Bool(true)))
    }

    /// Text at `index`, or the empty string.
    #[must_use]
    pub fn string(&self, index: usize) -> &str {
        match self.get(index) {
            Some(Value::String(value)) => value.as_str(),
            _ => "",
        }
    }

    /// Structured value at `index`, if one was bound.
    #[must_use]
    pub fn json(&self, index: usize) -> Option<&JsonValue> {
        match self.get(index) {
            Some(Value::Json(value)) => Some(value),
            _ => None,
        }
    }
}

impl FromIterator<Option<Value>> for Arguments {
    fn from_iter<I: IntoIterator<Item = Option<Value>>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}
