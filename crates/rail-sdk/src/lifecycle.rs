//! Structured reporting for host lifecycle events.

use std::path::Path;
use std::sync::Arc;

use rail_config::Config;
use rail_dispatch::ManifestError;

use crate::bootstrap::BootstrapError;
use crate::errors::IgniteError;

const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait LifecycleReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when an instance is placed in the registry.
    fn instance_registered(&self, id: &str);

    /// Invoked when an instance is removed from the registry.
    fn instance_unregistered(&self, id: &str, existed: bool);

    /// Invoked before the host connects.
    fn ignite_starting(&self, app_name: &str, version: &str);

    /// Invoked after the manifest has been written.
    fn manifest_saved(&self, path: &Path);

    /// Invoked when the manifest could not be written. Ignition continues.
    fn manifest_save_failed(&self, error: &ManifestError);

    /// Invoked once the bridge has accepted the connection.
    fn connected(&self, instance_id: &str);

    /// Invoked when ignition fails.
    fn ignite_failed(&self, error: &IgniteError);

    /// Invoked after the host disconnects.
    fn disconnected(&self);
}

impl<T> LifecycleReporter for Arc<T>
where
    T: LifecycleReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn instance_registered(&self, id: &str) {
        (**self).instance_registered(id);
    }

    fn instance_unregistered(&self, id: &str, existed: bool) {
        (**self).instance_unregistered(id, existed);
    }

    fn ignite_starting(&self, app_name: &str, version: &str) {
        (**self).ignite_starting(app_name, version);
    }

    fn manifest_saved(&self, path: &Path) {
        (**self).manifest_saved(path);
    }

    fn manifest_save_failed(&self, error: &ManifestError) {
        (**self).manifest_save_failed(error);
    }

    fn connected(&self, instance_id: &str) {
        (**self).connected(instance_id);
    }

    fn ignite_failed(&self, error: &IgniteError) {
        (**self).ignite_failed(error);
    }

    fn disconnected(&self) {
        (**self).disconnected();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLifecycleReporter;

impl StructuredLifecycleReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LifecycleReporter for StructuredLifecycleReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "bootstrap_starting",
            "starting host bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "bootstrap_succeeded",
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            manifest_path = %config.manifest_path(),
            "host bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "host bootstrap failed"
        );
    }

    fn instance_registered(&self, id: &str) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "instance_registered",
            id,
            "instance registered"
        );
    }

    fn instance_unregistered(&self, id: &str, existed: bool) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "instance_unregistered",
            id,
            existed,
            "instance unregistered"
        );
    }

    fn ignite_starting(&self, app_name: &str, version: &str) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "ignite_starting",
            app_name,
            version,
            "igniting host"
        );
    }

    fn manifest_saved(&self, path: &Path) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "manifest_saved",
            path = %path.display(),
            "manifest saved"
        );
    }

    fn manifest_save_failed(&self, error: &ManifestError) {
        tracing::warn!(
            target: LIFECYCLE_TARGET,
            event = "manifest_save_failed",
            error = %error,
            "failed to save manifest"
        );
    }

    fn connected(&self, instance_id: &str) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "connected",
            instance_id,
            "connected to controller"
        );
    }

    fn ignite_failed(&self, error: &IgniteError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "ignite_failed",
            error = %error,
            "ignition failed"
        );
    }

    fn disconnected(&self) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "disconnected",
            "disconnected from controller"
        );
    }
}
