//! Thread-safe map from instance identifiers to live objects.
//!
//! The [`InstanceRegistry`] is shared between the application thread that
//! registers objects and the transport thread that dispatches commands.
//! Registering under an existing identifier replaces the previous entry.
//! Objects that leave the registry are dropped only after the lock has been
//! released, so a destructor that touches the registry cannot deadlock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::instance::{Instance, Invocable};

const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Registry of named instances available to dispatch.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rail_dispatch::{InstanceRegistry, Invocable};
///
/// struct Counter;
/// impl Invocable for Counter {}
///
/// let registry = InstanceRegistry::new();
/// registry.register("counter", Arc::new(Counter));
/// assert!(registry.contains("counter"));
/// ```
#[derive(Default)]
pub struct InstanceRegistry {
    instances: Mutex<HashMap<String, Instance>>,
}

impl InstanceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Instance>> {
        self.instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `instance` under `id`, replacing any existing entry.
    pub fn register(&self, id: impl Into<String>, instance: Instance) {
        let key = id.into();
        let displaced = self.lock().insert(key.clone(), instance);
        debug!(
            target: REGISTRY_TARGET,
            id = %key,
            replaced = displaced.is_some(),
            "instance registered"
        );
        drop(displaced);
    }

    /// Registers a typed shared handle, keeping the caller's clone usable.
    pub fn register_shared<T: Invocable>(&self, id: impl Into<String>, instance: &Arc<T>) {
        let erased: Instance = Arc::clone(instance) as Instance;
        self.register(id, erased);
    }

    /// Returns the instance registered under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Instance> {
        self.lock().get(id).cloned()
    }

    /// Removes the entry for `id`. Returns `true` when one existed.
    pub fn unregister(&self, id: &str) -> bool {
        let removed = self.lock().remove(id);
        let existed = removed.is_some();
        debug!(
            target: REGISTRY_TARGET,
            id = %id,
            existed,
            "instance unregistered"
        );
        drop(removed);
        existed
    }

    /// Returns `true` when an instance is registered under `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    /// Number of registered instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Registered identifiers in sorted order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Removes every entry. Returns how many were removed.
    pub fn shutdown(&self) -> usize {
        let drained = std::mem::take(&mut *self.lock());
        let count = drained.len();
        debug!(target: REGISTRY_TARGET, count, "registry cleared");
        drop(drained);
        count
    }
}

impl std::fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests;
