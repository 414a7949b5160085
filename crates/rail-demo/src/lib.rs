//! Demonstration host for the Rail command dispatcher.
//!
//! The host registers an [`OrderManager`] and a [`Calculator`], ignites over
//! an [`InProcessBridge`], then answers JSON Lines commands: each non-blank
//! input line is delivered through the bridge and its response envelope is
//! written as one output line. Configuration is read from `RAIL_*`
//! environment variables and the command line.

use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use rail_dispatch::CatalogError;
use rail_sdk::{
    ArgsConfigLoader, BootstrapError, Bridge, BridgeError, IgniteError, InProcessBridge, Rail,
    StructuredLifecycleReporter, bootstrap_with,
};
use thiserror::Error;
use tracing::{debug, info};

mod samples;


pub use samples::{Calculator, FIRST_ORDER_ID, OrderManager, catalog};

const DEMO_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::host");

/// Application name announced to the bridge and recorded in the manifest.
pub const APP_NAME: &str = "RailDemo";
/// Registry identifier of the sample order manager.
pub const ORDER_MANAGER_ID: &str = "OrderManager";
/// Registry identifier of the sample calculator.
pub const CALCULATOR_ID: &str = "Calculator";

/// Errors that stop the demonstration host.
#[derive(Debug, Error)]
pub enum DemoError {
    /// The sample catalog is inconsistent.
    #[error("failed to build the sample catalog: {0}")]
    Catalog(#[from] CatalogError),
    /// Configuration or telemetry could not be set up.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// The host could not connect.
    #[error("failed to ignite: {0}")]
    Ignite(#[from] IgniteError),
    /// A command could not be delivered through the bridge.
    #[error("failed to deliver command: {0}")]
    Deliver(#[from] BridgeError),
    /// The command stream could not be read.
    #[error("failed to read command: {0}")]
    Read(#[source] io::Error),
    /// A response could not be written.
    #[error("failed to write response: {0}")]
    Write(#[source] io::Error),
}

/// Bootstraps the sample host and connects it to `bridge`.
///
/// # Errors
///
/// Returns [`DemoError`] when the catalog, configuration, telemetry or
/// ignition fails.
pub fn host<I, A>(args: I, bridge: &Arc<InProcessBridge>) -> Result<Rail, DemoError>
where
    I: IntoIterator<Item = A>,
    A: Into<OsString>,
{
    let loader = ArgsConfigLoader::new(args);
    let transport: Arc<dyn Bridge> = Arc::<InProcessBridge>::clone(bridge);
    let rail = bootstrap_with(
        &loader,
        Arc::new(StructuredLifecycleReporter::new()),
        catalog()?,
        transport,
    )?;
    rail.register_instance(ORDER_MANAGER_ID, Arc::new(OrderManager::new()));
    rail.register_instance(CALCULATOR_ID, Arc::new(Calculator));
    rail.try_ignite(APP_NAME, env!("CARGO_PKG_VERSION"), None)?;
    Ok(rail)
}

/// Answers every non-blank line of `input` through `bridge`, returning the
/// number of commands served.
///
/// # Errors
///
/// Returns [`DemoError`] when reading, delivery or writing fails.
pub fn serve<R, W>(bridge: &InProcessBridge, input: R, output: &mut W) -> Result<usize, DemoError>
where
    R: BufRead,
    W: Write,
{
    let mut served = 0_usize;
    for entry in input.lines() {
        let text = entry.map_err(DemoError::Read)?;
        let command = text.trim();
        if command.is_empty() {
            continue;
        }

        let response = bridge.send(command)?;
        debug!(target: DEMO_TARGET, command, response = response.as_str(), "command served");
        writeln!(output, "{response}")
            .and_then(|()| output.flush())
            .map_err(DemoError::Write)?;
        served = served.saturating_add(1);
    }
    Ok(served)
}

/// Runs the demonstration host until `input` is exhausted.
///
/// Failures are written to `stderr` and reflected in the exit code.
pub fn run<I, R, W, E>(args: I, input: R, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: BufRead,
    W: Write,
    E: Write,
{
    match run_host(args, input, stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn run_host<I, R, W>(args: I, input: R, stdout: &mut W) -> Result<(), DemoError>
where
    I: IntoIterator<Item = OsString>,
    R: BufRead,
    W: Write,
{
    let bridge = Arc::new(InProcessBridge::new());
    let rail = host(args, &bridge)?;
    let outcome = serve(&bridge, input, stdout);
    rail.disconnect();
    let served = outcome?;
    info!(target: DEMO_TARGET, served, "command stream closed");
    Ok(())
}
