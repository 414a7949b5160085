//! Unit tests for the host composition root.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use camino::Utf8PathBuf;
use mockall::mock;
use mockall::predicate::eq;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use rail_config::Config;
use rail_dispatch::{Catalog, Invocable, Signature, ValueType};

use super::*;
use crate::bridge::{Bridge, BridgeError, CommandCallback, InProcessBridge};

mock! {
    Transport {}
    impl Bridge for Transport {
        fn connect(
            &self,
            instance_id: &str,
            manifest: &str,
            callback: CommandCallback,
        ) -> Result<(), BridgeError>;
        fn disconnect(&self);
    }
}

#[derive(Default)]
struct Thermostat {
    target: AtomicI64,
}

impl Invocable for Thermostat {}

fn catalog() -> Catalog {
    let mut builder = Catalog::builder();
    builder
        .class::<Thermostat>("Thermostat")
        .method(
            Signature::new("SetTarget")
                .describe("Sets the target temperature")
                .param("celsius", ValueType::Int),
            |this: &Thermostat, args| {
                this.target.store(args.int(0), Ordering::SeqCst);
                Ok(())
            },
        )
        .method(
            Signature::new("Target").returns(ValueType::Int),
            |this: &Thermostat, _args| Ok(this.target.load(Ordering::SeqCst)),
        );
    builder.build().expect("class names are unique")
}

struct Workspace {
    dir: TempDir,
    config: Config,
}

impl Workspace {
    fn manifest_path(&self) -> std::path::PathBuf {
        self.dir.path().join("Rail.manifest.json")
    }
}

#[fixture]
fn workspace() -> Workspace {
    let dir = TempDir::new().expect("temp dir");
    let manifest_path = Utf8PathBuf::from_path_buf(dir.path().join("Rail.manifest.json"))
        .expect("temp paths are UTF-8");
    Workspace {
        dir,
        config: Config {
            manifest_path,
            ..Config::default()
        },
    }
}

fn rail_with(config: Config, bridge: Arc<dyn Bridge>) -> (Rail, Arc<Thermostat>) {
    let rail = Rail::new(config, catalog(), bridge);
    let thermostat = Arc::new(Thermostat::default());
    rail.register_shared("hall", &thermostat);
    (rail, thermostat)
}

#[rstest]
fn handle_command_uses_reflective_dispatch(workspace: Workspace) {
    let (rail, thermostat) = rail_with(workspace.config, Arc::new(InProcessBridge::new()));
    let response = rail.handle_command(r#"{"method":"hall.SetTarget","args":[21]}"#);
    assert_eq!(response, r#"{"result":"void"}"#);
    assert_eq!(thermostat.target.load(Ordering::SeqCst), 21);
}

#[rstest]
fn custom_dispatcher_overrides_and_can_be_cleared(workspace: Workspace) {
    let (rail, _thermostat) = rail_with(workspace.config, Arc::new(InProcessBridge::new()));
    rail.set_custom_dispatcher(|command: &str| format!(r#"{{"result":"custom {}"}}"#, command.len()));
    assert!(rail.has_custom_dispatcher());
    assert_eq!(rail.handle_command("abc"), r#"{"result":"custom 3"}"#);
    assert_eq!(
        rail.debug_dispatch(r#"{"method":"hall.Target"}"#),
        r#"{"result":"0"}"#
    );

    rail.clear_custom_dispatcher();
    assert!(!rail.has_custom_dispatcher());
    assert_eq!(
        rail.handle_command(r#"{"method":"hall.Target"}"#),
        r#"{"result":"0"}"#
    );
}

#[rstest]
fn ignite_connects_with_generated_manifest(workspace: Workspace) {
    let mut transport = MockTransport::new();
    transport
        .expect_connect()
        .withf(|instance_id, manifest, _callback| {
            instance_id == "Climate"
                && manifest.contains("\"Thermostat.SetTarget\"")
                && manifest.contains("\"appName\": \"Climate\"")
        })
        .times(1)
        .returning(|_, _, callback| {
            assert_eq!(callback(r#"{"method":"hall.Target"}"#), r#"{"result":"0"}"#);
            Ok(())
        });
    transport.expect_disconnect().times(1).return_const(());

    let path = workspace.manifest_path();
    let (rail, _thermostat) = rail_with(workspace.config, Arc::new(transport));
    assert!(rail.ignite("Climate", "1.0.0", None));
    assert!(rail.is_connected());

    let written = std::fs::read_to_string(path).expect("manifest written");
    let manifest: serde_json::Value = serde_json::from_str(&written).expect("manifest is JSON");
    assert_eq!(manifest["language"], "rust");
    assert_eq!(manifest["functions"].as_array().map(Vec::len), Some(2));

    rail.disconnect();
    assert!(!rail.is_connected());
}

#[rstest]
fn custom_manifest_is_published_verbatim(workspace: Workspace) {
    let custom = r#"{"instances":[{"id":"hall"}]}"#;
    let mut transport = MockTransport::new();
    transport
        .expect_connect()
        .with(eq("Climate"), eq(custom), mockall::predicate::always())
        .times(1)
        .returning(|_, _, _| Ok(()));
    transport.expect_disconnect().return_const(());

    let path = workspace.manifest_path();
    let (rail, _thermostat) = rail_with(workspace.config, Arc::new(transport));
    rail.try_ignite("Climate", "1.0.0", Some(custom))
        .expect("ignite succeeds");
    assert_eq!(std::fs::read_to_string(path).expect("written"), custom);
}

#[rstest]
fn blank_custom_manifest_falls_back_to_generated(workspace: Workspace) {
    let mut transport = MockTransport::new();
    transport
        .expect_connect()
        .withf(|_, manifest, _| manifest.contains("Thermostat.Target"))
        .times(1)
        .returning(|_, _, _| Ok(()));
    transport.expect_disconnect().return_const(());

    let (rail, _thermostat) = rail_with(workspace.config, Arc::new(transport));
    assert!(rail.ignite("Climate", "1.0.0", Some("   ")));
}

#[rstest]
fn invalid_custom_manifest_fails_before_connecting(workspace: Workspace) {
    let mut transport = MockTransport::new();
    transport.expect_connect().never();

    let (rail, _thermostat) = rail_with(workspace.config, Arc::new(transport));
    let error = rail
        .try_ignite("Climate", "1.0.0", Some("{broken"))
        .expect_err("custom manifest is not JSON");
    assert!(matches!(error, IgniteError::Manifest(_)));
    assert!(!rail.is_connected());
}

#[rstest]
fn bridge_refusal_leaves_host_disconnected(workspace: Workspace) {
    let mut transport = MockTransport::new();
    transport
        .expect_connect()
        .returning(|_, _, _| Err(BridgeError::ConnectionFailed { code: 5 }));
    transport.expect_disconnect().never();

    let (rail, _thermostat) = rail_with(workspace.config, Arc::new(transport));
    assert!(!rail.ignite("Climate", "1.0.0", None));
    assert!(!rail.is_connected());
}

#[rstest]
fn second_ignite_is_refused(workspace: Workspace) {
    let mut transport = MockTransport::new();
    transport
        .expect_connect()
        .times(1)
        .returning(|_, _, _| Ok(()));
    transport.expect_disconnect().times(1).return_const(());

    let (rail, _thermostat) = rail_with(workspace.config, Arc::new(transport));
    assert!(rail.ignite("Climate", "1.0.0", None));
    let error = rail
        .try_ignite("Climate", "1.0.0", None)
        .expect_err("already connected");
    assert!(matches!(error, IgniteError::AlreadyConnected));
}

/// Bridge that takes its time to connect and refuses the first attempts.
struct SluggishBridge {
    delay: Duration,
    refusals: AtomicUsize,
    connects: AtomicUsize,
}

impl SluggishBridge {
    fn new(delay: Duration, refusals: usize) -> Self {
        Self {
            delay,
            refusals: AtomicUsize::new(refusals),
            connects: AtomicUsize::new(0),
        }
    }
}

impl Bridge for SluggishBridge {
    fn connect(
        &self,
        _instance_id: &str,
        _manifest: &str,
        _callback: CommandCallback,
    ) -> Result<(), BridgeError> {
        thread::sleep(self.delay);
        self.connects.fetch_add(1, Ordering::SeqCst);
        let refused = self
            .refusals
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if refused {
            return Err(BridgeError::ConnectionFailed { code: 1 });
        }
        Ok(())
    }

    fn disconnect(&self) {}
}

#[rstest]
fn concurrent_ignites_connect_once(workspace: Workspace) {
    let bridge = Arc::new(SluggishBridge::new(Duration::from_millis(100), 0));
    let (rail, _thermostat) = rail_with(workspace.config, Arc::clone(&bridge) as Arc<dyn Bridge>);

    let host = &rail;
    let outcomes: Vec<bool> = thread::scope(|scope| {
        let handles =
            ["East", "West"].map(|app| scope.spawn(move || host.ignite(app, "1.0.0", None)));
        handles
            .into_iter()
            .map(|handle| handle.join().expect("ignite thread"))
            .collect()
    });

    assert_eq!(outcomes.iter().filter(|connected| **connected).count(), 1);
    assert_eq!(bridge.connects.load(Ordering::SeqCst), 1);
    assert!(rail.is_connected());
}

#[rstest]
fn ignite_can_be_retried_after_refusal(workspace: Workspace) {
    let bridge = Arc::new(SluggishBridge::new(Duration::ZERO, 1));
    let (rail, _thermostat) = rail_with(workspace.config, Arc::clone(&bridge) as Arc<dyn Bridge>);

    let error = rail
        .try_ignite("Climate", "1.0.0", None)
        .expect_err("first attempt refused");
    assert!(matches!(error, IgniteError::Bridge(_)));
    assert!(!rail.is_connected());

    rail.try_ignite("Climate", "1.0.0", None)
        .expect("second attempt connects");
    assert!(rail.is_connected());
    assert_eq!(bridge.connects.load(Ordering::SeqCst), 2);
}

#[rstest]
fn ignite_can_be_retried_after_an_invalid_manifest(workspace: Workspace) {
    let (rail, _thermostat) = rail_with(workspace.config, Arc::new(InProcessBridge::new()));
    assert!(!rail.ignite("Climate", "1.0.0", Some("{broken")));
    assert!(rail.ignite("Climate", "1.0.0", None));
}

#[rstest]
fn manifest_write_failure_does_not_stop_ignition() {
    let dir = TempDir::new().expect("temp dir");
    let manifest_path = Utf8PathBuf::from_path_buf(dir.path().join("absent").join("m.json"))
        .expect("temp paths are UTF-8");
    let config = Config {
        manifest_path,
        ..Config::default()
    };
    let bridge = Arc::new(InProcessBridge::new());
    let (rail, _thermostat) = rail_with(config, Arc::clone(&bridge) as Arc<dyn Bridge>);
    assert!(rail.ignite("Climate", "1.0.0", None));
    assert!(bridge.is_connected());
}

#[rstest]
fn manifest_is_not_written_when_disabled(workspace: Workspace) {
    let path = workspace.manifest_path();
    let config = Config {
        write_manifest: false,
        ..workspace.config.clone()
    };
    let (rail, _thermostat) = rail_with(config, Arc::new(InProcessBridge::new()));
    assert!(rail.ignite("Climate", "1.0.0", None));
    assert!(!path.exists());
}

#[rstest]
fn dropping_a_connected_host_disconnects_the_bridge(workspace: Workspace) {
    let bridge = Arc::new(InProcessBridge::new());
    let (rail, _thermostat) = rail_with(workspace.config, Arc::clone(&bridge) as Arc<dyn Bridge>);
    assert!(rail.ignite("Climate", "1.0.0", None));
    assert!(bridge.is_connected());
    drop(rail);
    assert!(!bridge.is_connected());
}

#[rstest]
fn unregister_reports_presence(workspace: Workspace) {
    let (rail, _thermostat) = rail_with(workspace.config, Arc::new(InProcessBridge::new()));
    assert!(rail.unregister("hall"));
    assert!(!rail.unregister("hall"));
    assert_eq!(
        rail.handle_command(r#"{"method":"hall.Target"}"#),
        r#"{"error":"Instance not found: hall"}"#
    );
}
