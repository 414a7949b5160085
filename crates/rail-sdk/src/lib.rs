//! Hosting surface for applications driven by a remote controller.
//!
//! `rail-sdk` wraps the `rail-dispatch` engine in the lifecycle a host
//! application needs. A [`Rail`] owns the instance registry and method
//! catalog, publishes a manifest when it ignites, connects through a
//! [`Bridge`] and answers each inbound command with the reflective
//! dispatcher or a host-supplied custom dispatcher.
//!
//! Commands are answered on the bridge's thread. Hosted objects must be safe
//! to call from there, or forward the work to the thread that owns them.

pub mod bootstrap;
pub mod bridge;
pub mod errors;
pub mod lifecycle;
pub mod rail;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use self::bootstrap::{ArgsConfigLoader, BootstrapError, ConfigLoader, bootstrap_with};
pub use self::bridge::{Bridge, BridgeError, CommandCallback, InProcessBridge};
pub use self::errors::IgniteError;
pub use self::lifecycle::{LifecycleReporter, StructuredLifecycleReporter};
pub use self::rail::{CustomDispatcher, Rail};
pub use self::telemetry::{TelemetryError, TelemetryHandle};
