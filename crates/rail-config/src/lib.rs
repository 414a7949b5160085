//! Shared configuration for processes hosting the Rail dispatcher.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults, then an
//! optional TOML file, then `RAIL_*` environment variables, then command-line
//! flags. The resolved [`Config`] controls telemetry and where the generated
//! manifest is written when a host ignites.

mod defaults;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MANIFEST_FILE, default_log_filter, default_log_filter_string,
    default_log_format, default_manifest_path, default_write_manifest,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration for a Rail host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "RAIL")]
pub struct Config {
    /// `tracing` filter expression applied to the global subscriber.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format for telemetry.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
    /// Destination of the manifest written at ignite time.
    #[serde(default = "default_manifest_path")]
    pub manifest_path: Utf8PathBuf,
    /// Whether the manifest is persisted at ignite time.
    #[serde(default = "default_write_manifest")]
    pub write_manifest: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            manifest_path: default_manifest_path(),
            write_manifest: default_write_manifest(),
        }
    }
}

impl Config {
    /// Returns the telemetry filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the telemetry output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the manifest destination.
    #[must_use]
    pub fn manifest_path(&self) -> &Utf8Path {
        self.manifest_path.as_path()
    }

    /// Returns whether the manifest is written at ignite time.
    #[must_use]
    pub const fn write_manifest(&self) -> bool {
        self.write_manifest
    }
}
