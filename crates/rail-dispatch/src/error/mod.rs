//! Errors surfaced while dispatching a command.
//!
//! Every failure the dispatcher can report is a variant of [`DispatchError`].
//! The `Display` text of each variant is the exact message placed in the
//! `error` field of the JSON response, so callers on the other side of the
//! bridge can match on it.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Failure raised by a hosted method while it ran.
///
/// The message is surfaced verbatim after the `Dispatch exception: ` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InvocationError {
    message: String,
}

impl InvocationError {
    /// Creates an invocation error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Captures the display text of any error.
    pub fn from_error(error: &(dyn StdError + 'static)) -> Self {
        Self::new(error.to_string())
    }

    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Pipeline stage at which a dispatch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStage {
    /// Decoding the command text.
    Parse,
    /// Checking the command's shape.
    Validate,
    /// Working out which instance the command targets.
    ResolveContext,
    /// Looking the instance up in the registry.
    LookupInstance,
    /// Finding the method on the instance's type.
    ResolveMethod,
    /// Coercing supplied arguments.
    BuildArguments,
    /// Running the method.
    Invoke,
    /// Turning the result into text.
    Serialize,
}

impl DispatchStage {
    /// Stable label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Validate => "validate",
            Self::ResolveContext => "resolve_context",
            Self::LookupInstance => "lookup_instance",
            Self::ResolveMethod => "resolve_method",
            Self::BuildArguments => "build_arguments",
            Self::Invoke => "invoke",
            Self::Serialize => "serialize",
        }
    }
}

impl fmt::Display for DispatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced during command dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The command text is not valid JSON.
    #[error("JSON parse error: {message}")]
    MalformedJson {
        /// Parser diagnostic.
        message: String,
    },

    /// The command has no usable `method` field.
    #[error("Invalid JSON command structure: missing method")]
    MissingMethod,

    /// A command field has the wrong JSON type.
    #[error("Invalid JSON command structure: {message}")]
    InvalidStructure {
        /// Description of the offending field.
        message: String,
    },

    /// Neither `class` nor `context` was given and the method is unqualified.
    #[error(
        "Invalid JSON command structure: missing class or context, and method name '{method}' \
         has no dot separator."
    )]
    UnresolvableContext {
        /// Method name as supplied.
        method: String,
    },

    /// No instance is registered under the resolved identifier.
    #[error("Instance not found: {context}")]
    InstanceNotFound {
        /// Resolved instance identifier.
        context: String,
    },

    /// The instance's type exposes no method with the requested name.
    #[error("Method not found: {method} on type {type_name}")]
    MethodNotFound {
        /// Unqualified method name.
        method: String,
        /// Catalog name of the instance's type.
        type_name: String,
    },

    /// The method declares more parameters than dispatch supports.
    #[error("Too many arguments (max {max} supported)")]
    TooManyArguments {
        /// Parameter count declared by the method.
        declared: usize,
        /// Supported maximum.
        max: usize,
    },

    /// The hosted method failed.
    #[error("Dispatch exception: {0}")]
    Invocation(#[from] InvocationError),

    /// A method declared to return a value produced none.
    #[error("Invocation failed (returned invalid variant)")]
    InvalidResult {
        /// Qualified method name.
        method: String,
    },

    /// Any failure without a more specific classification.
    #[error("Unknown dispatch error")]
    Unknown,
}

impl DispatchError {
    /// Creates a malformed JSON error from a parser failure.
    pub fn from_json_error(source: &serde_json::Error) -> Self {
        Self::MalformedJson {
            message: source.to_string(),
        }
    }

    /// Creates an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    /// Creates an unresolvable context error.
    pub fn unresolvable_context(method: impl Into<String>) -> Self {
        Self::UnresolvableContext {
            method: method.into(),
        }
    }

    /// Creates an instance not found error.
    pub fn instance_not_found(context: impl Into<String>) -> Self {
        Self::InstanceNotFound {
            context: context.into(),
        }
    }

    /// Creates a method not found error.
    pub fn method_not_found(method: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::MethodNotFound {
            method: method.into(),
            type_name: type_name.into(),
        }
    }

    /// Creates a too many arguments error.
    #[must_use]
    pub const fn too_many_arguments(declared: usize, max: usize) -> Self {
        Self::TooManyArguments { declared, max }
    }

    /// Creates an invalid result error.
    pub fn invalid_result(method: impl Into<String>) -> Self {
        Self::InvalidResult {
            method: method.into(),
        }
    }

    /// Returns the pipeline stage this error belongs to.
    #[must_use]
    pub const fn stage(&self) -> DispatchStage {
        match self {
            Self::MalformedJson { .. } => DispatchStage::Parse,
            Self::MissingMethod | Self::InvalidStructure { .. } => DispatchStage::Validate,
            Self::UnresolvableContext { .. } => DispatchStage::ResolveContext,
            Self::InstanceNotFound { .. } => DispatchStage::LookupInstance,
            Self::MethodNotFound { .. } => DispatchStage::ResolveMethod,
            Self::TooManyArguments { .. } => DispatchStage::BuildArguments,
            Self::Invocation(_) | Self::Unknown => DispatchStage::Invoke,
            Self::InvalidResult { .. } => DispatchStage::Serialize,
        }
    }
}
