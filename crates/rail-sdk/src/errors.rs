//! Errors raised while igniting a host.

use rail_dispatch::ManifestError;
use thiserror::Error;

use crate::bridge::BridgeError;

/// Errors surfaced by [`Rail::try_ignite`](crate::Rail::try_ignite).
#[derive(Debug, Error)]
pub enum IgniteError {
    /// The host is already connected.
    #[error("host is already connected")]
    AlreadyConnected,

    /// The manifest could not be prepared.
    #[error("failed to prepare manifest: {0}")]
    Manifest(#[from] ManifestError),

    /// The bridge refused or failed the connection.
    #[error("failed to connect through the bridge: {0}")]
    Bridge(#[from] BridgeError),
}
