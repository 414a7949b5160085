use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// File name the hosting process writes its manifest to for static discovery.
pub const DEFAULT_MANIFEST_FILE: &str = "Rail.manifest.json";

/// Default log filter expression used by hosting processes.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by hosting processes.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for hosting processes.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Manifest path relative to the working directory, matching the location
/// remote controllers scan when the host is not running.
#[must_use]
pub fn default_manifest_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_MANIFEST_FILE)
}

/// Manifests are persisted at ignite time unless disabled.
#[must_use]
pub const fn default_write_manifest() -> bool {
    true
}
