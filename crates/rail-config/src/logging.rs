//! Telemetry output formats for Rail hosts.
//!
//! Host telemetry always goes to stderr. Hosts such as the demo speak JSON
//! Lines on stdout, so no format ever writes there.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How a host renders its telemetry events on stderr.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, with event fields flattened into the
    /// object. Never coloured.
    #[default]
    Json,
    /// Single-line text for a developer watching the host in a terminal.
    Compact,
}

impl LogFormat {
    /// Returns `true` when each event is a self-contained JSON document.
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Returns `true` when the format may carry ANSI colour codes. Escape
    /// sequences would corrupt structured events, so only text formats
    /// qualify.
    #[must_use]
    pub const fn allows_ansi(self) -> bool {
        !self.is_structured()
    }
}

/// Error raised when text names no known [`LogFormat`].
pub type LogFormatParseError = strum::ParseError;
