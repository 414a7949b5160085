//! Crate-level BDD tests and bootstrap coverage.

use std::sync::{Arc, Mutex};

use mockall::mock;
use ortho_config::OrthoError;

use rail_config::Config;
use rail_dispatch::{Catalog, ManifestError};

use crate::bootstrap::{BootstrapError, ConfigLoader, bootstrap_with};
use crate::bridge::InProcessBridge;
use crate::errors::IgniteError;
use crate::lifecycle::LifecycleReporter;


mock! {
    Loader {}
    impl ConfigLoader for Loader {
        fn load(&self) -> Result<Config, Arc<OrthoError>>;
    }
}

#[derive(Default)]
struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    fn push(&self, event: impl Into<String>) {
        self.events.lock().expect("events lock").push(event.into());
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().expect("events lock").clone()
    }
}

impl LifecycleReporter for RecordingReporter {
    fn bootstrap_starting(&self) {
        self.push("bootstrap_starting");
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.push("bootstrap_succeeded");
    }

    fn bootstrap_failed(&self, _error: &BootstrapError) {
        self.push("bootstrap_failed");
    }

    fn instance_registered(&self, id: &str) {
        self.push(format!("registered:{id}"));
    }

    fn instance_unregistered(&self, id: &str, existed: bool) {
        self.push(format!("unregistered:{id}:{existed}"));
    }

    fn ignite_starting(&self, app_name: &str, version: &str) {
        self.push(format!("ignite_starting:{app_name}:{version}"));
    }

    fn manifest_saved(&self, _path: &std::path::Path) {
        self.push("manifest_saved");
    }

    fn manifest_save_failed(&self, _error: &ManifestError) {
        self.push("manifest_save_failed");
    }

    fn connected(&self, instance_id: &str) {
        self.push(format!("connected:{instance_id}"));
    }

    fn ignite_failed(&self, _error: &IgniteError) {
        self.push("ignite_failed");
    }

    fn disconnected(&self) {
        self.push("disconnected");
    }
}

#[test]
fn bootstrap_reports_success_and_builds_a_host() {
    let mut loader = MockLoader::new();
    loader.expect_load().times(1).returning(|| {
        Ok(Config {
            write_manifest: false,
            ..Config::default()
        })
    });
    let reporter = Arc::new(RecordingReporter::default());

    let rail = bootstrap_with(
        &loader,
        Arc::clone(&reporter) as Arc<dyn LifecycleReporter>,
        Catalog::default(),
        Arc::new(InProcessBridge::new()),
    )
    .expect("bootstrap succeeds");

    assert!(!rail.config().write_manifest());
    assert!(rail.ignite("Empty", "0.1.0", None));
    rail.disconnect();
    assert_eq!(
        reporter.events(),
        vec![
            "bootstrap_starting",
            "bootstrap_succeeded",
            "ignite_starting:Empty:0.1.0",
            "connected:Empty",
            "disconnected",
        ]
    );
}

#[test]
fn bootstrap_reports_invalid_log_filters() {
    let mut loader = MockLoader::new();
    loader.expect_load().returning(|| {
        Ok(Config {
            log_filter: "rail_sdk=loudest".to_owned(),
            ..Config::default()
        })
    });
    let reporter = Arc::new(RecordingReporter::default());

    let result = bootstrap_with(
        &loader,
        Arc::clone(&reporter) as Arc<dyn LifecycleReporter>,
        Catalog::default(),
        Arc::new(InProcessBridge::new()),
    );

    // The subscriber may already be installed by another test in this
    // binary, in which case the filter is never parsed.
    if let Err(error) = result {
        assert!(matches!(error, BootstrapError::Telemetry { .. }));
        assert_eq!(reporter.events(), vec!["bootstrap_starting", "bootstrap_failed"]);
    }
}
