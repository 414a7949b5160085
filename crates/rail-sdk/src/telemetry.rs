//! Telemetry for Rail hosts.
//!
//! Every event is written to stderr. A host's stdout belongs to whatever
//! protocol it speaks, and a stray log line there would corrupt it. Events
//! from the dispatch engine and the host surface carry the
//! `rail_dispatch::*` and `rail_sdk::*` targets, so a filter such as
//! `warn,rail_dispatch::dispatch=debug` traces command handling alone.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use rail_config::{Config, LogFormat};

/// Level applied to targets the configured filter leaves unmentioned, and
/// to the whole host when the filter is blank.
pub const FALLBACK_LEVEL: LevelFilter = LevelFilter::INFO;

static INSTALLED: OnceCell<LogFormat> = OnceCell::new();

/// Proof that the global subscriber is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Format chosen by the call that installed the subscriber.
    #[must_use]
    pub const fn format(self) -> LogFormat {
        self.format
    }
}

/// Errors raised while installing host telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter expression does not parse.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Another global subscriber was installed first.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the stderr subscriber described by `config`.
///
/// Only the first successful call installs anything. Later calls return a
/// handle naming the format already in use, whatever `config` says.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the filter does not parse and
/// [`TelemetryError::Subscriber`] when a subscriber was installed elsewhere.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED
        .get_or_try_init(|| install(config).map(|()| config.log_format()))
        .map(|format| TelemetryHandle { format: *format })
}

fn host_filter(expression: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::builder()
        .with_default_directive(FALLBACK_LEVEL.into())
        .parse(expression.trim())
        .map_err(|error| TelemetryError::Filter(error.to_string()))
}

fn uses_ansi(format: LogFormat) -> bool {
    format.allows_ansi() && io::stderr().is_terminal()
}

fn stderr_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_names(true)
        .with_ansi(uses_ansi(format))
        .with_timer(UtcTime::rfc_3339());
    match format {
        LogFormat::Json => layer.json().flatten_event(true).boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

fn install(config: &Config) -> Result<(), TelemetryError> {
    let filter = host_filter(config.log_filter())?;
    let subscriber = tracing_subscriber::registry()
        .with(stderr_layer(config.log_format()))
        .with(filter);
    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}
