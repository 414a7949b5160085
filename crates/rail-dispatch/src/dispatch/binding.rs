//! Binds supplied JSON arguments to declared parameters.

use serde_json::Value as JsonValue;

use crate::args::Arguments;
use crate::catalog::MethodDescriptor;
use crate::coerce::coerce;

/// Builds the argument slots for `method` from the command's `args` field.
///
/// An array binds by position; surplus entries are ignored. An object binds
/// each parameter whose name appears as a key. Anything else, including no
/// `args` at all, leaves every slot unbound. Values that fail coercion also
/// leave their slot unbound.
#[must_use]
pub fn bind_arguments(method: &MethodDescriptor, args: Option<&JsonValue>) -> Arguments {
    let parameters = method.parameters();
    let mut bound = Arguments::unbound(parameters.len());
    match args {
        Some(JsonValue::Array(values)) => {
            for (parameter, value) in parameters.iter().zip(values) {
                bound.bind(parameter.position(), coerce(value, parameter.value_type()));
            }
        }
        Some(JsonValue::Object(named)) => {
            for parameter in parameters {
                if let Some(value) = named.get(parameter.name()) {
                    bound.bind(parameter.position(), coerce(value, parameter.value_type()));
                }
            }
        }
        _ => {}
    }
    bound
}
