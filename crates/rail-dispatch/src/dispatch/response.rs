//! The response envelope returned for every command.

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::value::Value;

const FALLBACK_RESPONSE: &str = r#"{"error":"Unknown dispatch error"}"#;

/// Either `{"result": "..."}` or `{"error": "..."}`, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    /// Successful invocation, with the stringified return value.
    Result(String),
    /// Failed dispatch, with the error message.
    Error(String),
}

impl Response {
    /// Wraps a successful return value.
    #[must_use]
    pub fn success(value: &Value) -> Self {
        Self::Result(value.to_result_string())
    }

    /// Wraps a dispatch failure.
    #[must_use]
    pub fn failure(error: &DispatchError) -> Self {
        Self::Error(error.to_string())
    }

    /// Builds the envelope for a pipeline outcome.
    #[must_use]
    pub fn from_outcome(outcome: &Result<Value, DispatchError>) -> Self {
        match outcome {
            Ok(value) => Self::success(value),
            Err(error) => Self::failure(error),
        }
    }

    /// Returns `true` for the error envelope.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Serialises the envelope as compact JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| FALLBACK_RESPONSE.to_owned())
    }
}
