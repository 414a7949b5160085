//! Transport seam between a host and the remote controller.
//!
//! The production transport (a named pipe reached through a bridge library)
//! lives outside this crate. Hosts plug it in by implementing [`Bridge`].
//! [`InProcessBridge`] loops commands straight back into the host's callback
//! and is used for local tooling and tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

/// Callback a bridge invokes for every inbound command.
///
/// It runs on the bridge's own thread and returns the JSON response text.
pub type CommandCallback = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Errors reported by a bridge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The transport could not be reached or loaded.
    #[error("bridge unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// The transport refused the connection.
    #[error("connection failed with code {code}")]
    ConnectionFailed {
        /// Transport status code.
        code: i32,
    },

    /// A command was sent while no host was connected.
    #[error("bridge is not connected")]
    NotConnected,
}

impl BridgeError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// A transport that delivers commands to a host.
pub trait Bridge: Send + Sync {
    /// Announces the host under `instance_id` with its manifest and starts
    /// delivering commands to `callback`.
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError`] when the connection cannot be established.
    fn connect(
        &self,
        instance_id: &str,
        manifest: &str,
        callback: CommandCallback,
    ) -> Result<(), BridgeError>;

    /// Stops delivering commands. Disconnecting twice is harmless.
    fn disconnect(&self);
}

struct Connection {
    instance_id: String,
    manifest: String,
    callback: CommandCallback,
}

/// Bridge that hands commands directly to the connected callback.
#[derive(Default)]
pub struct InProcessBridge {
    connection: Mutex<Option<Connection>>,
}

impl InProcessBridge {
    /// Creates a disconnected bridge.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Delivers `command` to the connected host and returns its response.
    ///
    /// The callback runs on the caller's thread, outside the bridge lock.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotConnected`] when no host is connected.
    pub fn send(&self, command: &str) -> Result<String, BridgeError> {
        let callback = self
            .lock()
            .as_ref()
            .map(|connection| Arc::clone(&connection.callback))
            .ok_or(BridgeError::NotConnected)?;
        Ok(callback(command))
    }

    /// Returns `true` while a host is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.lock().is_some()
    }

    /// Identifier the connected host announced.
    #[must_use]
    pub fn instance_id(&self) -> Option<String> {
        self.lock()
            .as_ref()
            .map(|connection| connection.instance_id.clone())
    }

    /// Manifest the connected host published.
    #[must_use]
    pub fn manifest(&self) -> Option<String> {
        self.lock()
            .as_ref()
            .map(|connection| connection.manifest.clone())
    }
}

impl Bridge for InProcessBridge {
    fn connect(
        &self,
        instance_id: &str,
        manifest: &str,
        callback: CommandCallback,
    ) -> Result<(), BridgeError> {
        let previous = self.lock().replace(Connection {
            instance_id: instance_id.to_owned(),
            manifest: manifest.to_owned(),
            callback,
        });
        drop(previous);
        Ok(())
    }

    fn disconnect(&self) {
        let previous = self.lock().take();
        drop(previous);
    }
}

impl std::fmt::Debug for InProcessBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessBridge")
            .field("instance_id", &self.instance_id())
            .finish_non_exhaustive()
    }
}
