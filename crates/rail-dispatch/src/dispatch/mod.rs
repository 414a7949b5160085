//! Command dispatch pipeline.
//!
//! A command travels through parse, validate, context resolution, instance
//! lookup, method resolution, argument binding, invocation and
//! serialisation. Any stage may short-circuit with a [`DispatchError`],
//! which is rendered into the `error` envelope instead of escaping.
//!
//! [`DispatchError`]: crate::DispatchError

mod binding;
mod dispatcher;
mod request;
mod response;

pub use binding::bind_arguments;
pub use dispatcher::{Dispatcher, MAX_ARGUMENTS};
pub use request::{Command, Target};
pub use response::Response;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
