//! The reflective dispatcher.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};

use super::DISPATCH_TARGET;
use super::binding::bind_arguments;
use super::request::{Command, Target};
use super::response::Response;
use crate::catalog::Catalog;
use crate::error::DispatchError;
use crate::registry::InstanceRegistry;
use crate::value::Value;

/// Most parameters a dispatchable method may declare.
pub const MAX_ARGUMENTS: usize = 6;

/// Routes JSON commands to methods on registered instances.
///
/// The dispatcher shares the registry with the host application and the
/// catalog with the manifest generator. It holds no other state, so one
/// dispatcher may serve any number of threads.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<InstanceRegistry>,
    catalog: Arc<Catalog>,
}

impl Dispatcher {
    /// Creates a dispatcher over `registry` and `catalog`.
    #[must_use]
    pub const fn new(registry: Arc<InstanceRegistry>, catalog: Arc<Catalog>) -> Self {
        Self { registry, catalog }
    }

    /// The registry commands are resolved against.
    #[must_use]
    pub const fn registry(&self) -> &Arc<InstanceRegistry> {
        &self.registry
    }

    /// The catalog methods are resolved against.
    #[must_use]
    pub const fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Dispatches command text and returns the JSON response text.
    ///
    /// Always returns a JSON object with exactly one of `result` or `error`.
    /// The hosted method runs on the calling thread; see
    /// [`Invocable`](crate::Invocable) for the obligations this places on
    /// hosted types.
    #[must_use]
    pub fn dispatch(&self, command: &str) -> String {
        self.respond(command).to_json()
    }

    /// Dispatches command text and returns the response envelope.
    ///
    /// A panic inside a hosted method is contained and reported as
    /// [`DispatchError::Unknown`].
    #[must_use]
    pub fn respond(&self, command: &str) -> Response {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.execute(command)))
            .unwrap_or_else(|_| {
                warn!(target: DISPATCH_TARGET, "hosted method panicked");
                Err(DispatchError::Unknown)
            });
        Response::from_outcome(&outcome)
    }

    /// Runs the dispatch pipeline and returns the typed outcome.
    ///
    /// # Errors
    ///
    /// Returns the [`DispatchError`] of the first stage that fails.
    pub fn execute(&self, command: &str) -> Result<Value, DispatchError> {
        let outcome = self.run(command);
        if let Err(error) = &outcome {
            warn!(
                target: DISPATCH_TARGET,
                stage = %error.stage(),
                error = %error,
                "dispatch failed"
            );
        }
        outcome
    }

    fn run(&self, text: &str) -> Result<Value, DispatchError> {
        let command = Command::parse(text)?;
        let target = Target::resolve(&command)?;
        debug!(
            target: DISPATCH_TARGET,
            context = %target.context,
            method = %target.method,
            "command resolved"
        );

        let instance = self
            .registry
            .get(&target.context)
            .ok_or_else(|| DispatchError::instance_not_found(&target.context))?;
        let resolved = self.catalog.resolve(instance.as_ref(), &target.method)?;
        let descriptor = resolved.descriptor();

        let declared = descriptor.parameters().len();
        if declared > MAX_ARGUMENTS {
            return Err(DispatchError::too_many_arguments(declared, MAX_ARGUMENTS));
        }
        let arguments = bind_arguments(descriptor, command.args());

        let value = resolved.invoke(&arguments)?;
        if value.is_void() && !descriptor.return_type().is_void() {
            return Err(DispatchError::invalid_result(descriptor.qualified_name()));
        }
        debug!(
            target: DISPATCH_TARGET,
            method = %descriptor.qualified_name(),
            "command completed"
        );
        Ok(value)
    }
}
