//! Command decoding and target resolution.

use serde_json::{Map, Value as JsonValue};

use crate::error::DispatchError;

/// A decoded command.
///
/// `null` values for optional fields are treated as absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    method: String,
    class: Option<String>,
    context: Option<String>,
    args: Option<JsonValue>,
}

impl Command {
    /// Parses command text.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedJson`] when `text` is not JSON, and
    /// the structural errors of [`Command::from_document`] otherwise.
    pub fn parse(text: &str) -> Result<Self, DispatchError> {
        let document: JsonValue =
            serde_json::from_str(text).map_err(|error| DispatchError::from_json_error(&error))?;
        Self::from_document(document)
    }

    /// Extracts a command from an already-decoded document.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MissingMethod`] when the document is not an
    /// object or has no `method`, and [`DispatchError::InvalidStructure`]
    /// when `method`, `class` or `context` is not a string.
    pub fn from_document(document: JsonValue) -> Result<Self, DispatchError> {
        let JsonValue::Object(mut fields) = document else {
            return Err(DispatchError::MissingMethod);
        };
        let method = take_string(&mut fields, "method")?.ok_or(DispatchError::MissingMethod)?;
        let class = take_string(&mut fields, "class")?;
        let context = take_string(&mut fields, "context")?;
        let args = fields.remove("args").filter(|value| !value.is_null());
        Ok(Self {
            method,
            class,
            context,
            args,
        })
    }

    /// The method field as supplied.
    #[must_use]
    pub const fn method(&self) -> &str {
        self.method.as_str()
    }

    /// Explicit `class` override, if present.
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// Explicit `context` override, if present.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Supplied arguments, if any.
    #[must_use]
    pub const fn args(&self) -> Option<&JsonValue> {
        self.args.as_ref()
    }
}

fn take_string(
    fields: &mut Map<String, JsonValue>,
    key: &str,
) -> Result<Option<String>, DispatchError> {
    match fields.remove(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(text)) => Ok(Some(text)),
        Some(_) => Err(DispatchError::invalid_structure(format!(
            "'{key}' must be a string"
        ))),
    }
}

/// The instance and method a command addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Registry identifier of the target instance.
    pub context: String,
    /// Unqualified method name.
    pub method: String,
}

impl Target {
    /// Works out the target of `command`.
    ///
    /// `class` takes priority over `context`; without either, the method is
    /// split on its last `.`. When an explicit context is given, any dotted
    /// prefix left on the method is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnresolvableContext`] when there is no
    /// explicit context and the method has no `.`.
    pub fn resolve(command: &Command) -> Result<Self, DispatchError> {
        if let Some(context) = command.class().or_else(|| command.context()) {
            let method = command
                .method()
                .rsplit_once('.')
                .map_or(command.method(), |(_, name)| name);
            return Ok(Self {
                context: context.to_owned(),
                method: method.to_owned(),
            });
        }
        command
            .method()
            .rsplit_once('.')
            .map(|(context, method)| Self {
                context: context.to_owned(),
                method: method.to_owned(),
            })
            .ok_or_else(|| DispatchError::unresolvable_context(command.method()))
    }
}
