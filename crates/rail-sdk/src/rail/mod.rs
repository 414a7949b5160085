//! The host composition root.
//!
//! [`Rail`] owns everything a host needs to be driven remotely: the instance
//! registry, the method catalog, the reflective dispatcher, an optional
//! custom dispatcher, the bridge and the lifecycle reporter. Hosts build one
//! at startup, register their objects, then [`Rail::ignite`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use rail_config::Config;
use rail_dispatch::{
    Catalog, Dispatcher, Instance, InstanceRegistry, Invocable, Manifest, ManifestDocument,
    write_manifest,
};

use crate::bridge::{Bridge, CommandCallback};
use crate::errors::IgniteError;
use crate::lifecycle::{LifecycleReporter, StructuredLifecycleReporter};

/// Replacement for the reflective dispatcher, taking command text and
/// returning response text.
pub type CustomDispatcher = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// State shared with the bridge callback.
struct CommandRouter {
    dispatcher: Dispatcher,
    custom: RwLock<Option<CustomDispatcher>>,
}

impl CommandRouter {
    fn custom(&self) -> Option<CustomDispatcher> {
        self.custom
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_custom(&self, custom: Option<CustomDispatcher>) {
        let previous = std::mem::replace(
            &mut *self.custom.write().unwrap_or_else(PoisonError::into_inner),
            custom,
        );
        drop(previous);
    }

    fn handle(&self, command: &str) -> String {
        match self.custom() {
            Some(custom) => custom(command),
            None => self.dispatcher.dispatch(command),
        }
    }
}

/// A host that can be driven by a remote controller.
pub struct Rail {
    config: Config,
    registry: Arc<InstanceRegistry>,
    catalog: Arc<Catalog>,
    router: Arc<CommandRouter>,
    bridge: Arc<dyn Bridge>,
    reporter: Arc<dyn LifecycleReporter>,
    connected: AtomicBool,
}

impl Rail {
    /// Creates a disconnected host over `catalog`, reporting through
    /// [`StructuredLifecycleReporter`].
    #[must_use]
    pub fn new(config: Config, catalog: Catalog, bridge: Arc<dyn Bridge>) -> Self {
        let registry = Arc::new(InstanceRegistry::new());
        let shared_catalog = Arc::new(catalog);
        let dispatcher = Dispatcher::new(Arc::clone(&registry), Arc::clone(&shared_catalog));
        Self {
            config,
            registry,
            catalog: shared_catalog,
            router: Arc::new(CommandRouter {
                dispatcher,
                custom: RwLock::new(None),
            }),
            bridge,
            reporter: Arc::new(StructuredLifecycleReporter::new()),
            connected: AtomicBool::new(false),
        }
    }

    /// Replaces the lifecycle reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn LifecycleReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The registry commands resolve against.
    #[must_use]
    pub const fn registry(&self) -> &Arc<InstanceRegistry> {
        &self.registry
    }

    /// The method catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Makes `instance` addressable as `id`, replacing any previous holder.
    pub fn register_instance(&self, id: impl Into<String>, instance: Instance) {
        let key = id.into();
        self.reporter.instance_registered(&key);
        self.registry.register(key, instance);
    }

    /// Registers a typed shared handle; the caller keeps its own clone.
    pub fn register_shared<T: Invocable>(&self, id: impl Into<String>, instance: &Arc<T>) {
        let erased: Instance = Arc::clone(instance) as Instance;
        self.register_instance(id, erased);
    }

    /// Removes `id` from the registry. Returns `true` when it was present.
    pub fn unregister(&self, id: &str) -> bool {
        let existed = self.registry.unregister(id);
        self.reporter.instance_unregistered(id, existed);
        existed
    }

    /// Routes every command to `dispatcher` instead of the reflective one.
    pub fn set_custom_dispatcher<F>(&self, dispatcher: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.router.set_custom(Some(Arc::new(dispatcher)));
    }

    /// Restores reflective dispatch.
    pub fn clear_custom_dispatcher(&self) {
        self.router.set_custom(None);
    }

    /// Returns `true` when a custom dispatcher is installed.
    #[must_use]
    pub fn has_custom_dispatcher(&self) -> bool {
        self.router.custom().is_some()
    }

    /// Handles one command exactly as the bridge would.
    ///
    /// Commands normally arrive on the bridge's thread, not the host's main
    /// thread, and hosted methods run wherever this is called. Objects
    /// reachable through the registry must tolerate that or hand the work
    /// over to their owning thread.
    #[must_use]
    pub fn handle_command(&self, command: &str) -> String {
        self.router.handle(command)
    }

    /// The callback handed to the bridge on connect.
    #[must_use]
    pub fn command_callback(&self) -> CommandCallback {
        let router = Arc::clone(&self.router);
        Arc::new(move |command: &str| router.handle(command))
    }

    /// Dispatches through the reflective dispatcher, ignoring any custom
    /// dispatcher.
    #[must_use]
    pub fn debug_dispatch(&self, command: &str) -> String {
        self.router.dispatcher.dispatch(command)
    }

    /// Generates the manifest for the registered catalog.
    #[must_use]
    pub fn manifest(&self, app_name: &str) -> Manifest {
        Manifest::generate(app_name, &self.catalog)
    }

    /// Publishes the manifest and connects through the bridge. Returns
    /// whether the host is now connected.
    ///
    /// Failures are reported through the lifecycle reporter; use
    /// [`Rail::try_ignite`] to inspect them.
    pub fn ignite(&self, app_name: &str, version: &str, custom_manifest: Option<&str>) -> bool {
        self.try_ignite(app_name, version, custom_manifest).is_ok()
    }

    /// Publishes the manifest and connects through the bridge.
    ///
    /// A non-blank `custom_manifest` is published instead of the generated
    /// one. When enabled in the configuration the manifest is also written
    /// to disk; a write failure is reported but does not stop ignition. The
    /// application name doubles as the instance identifier announced to the
    /// bridge.
    ///
    /// # Errors
    ///
    /// Returns [`IgniteError::AlreadyConnected`] when called while connected,
    /// [`IgniteError::Manifest`] when a custom manifest is not JSON, and
    /// [`IgniteError::Bridge`] when the bridge refuses the connection.
    pub fn try_ignite(
        &self,
        app_name: &str,
        version: &str,
        custom_manifest: Option<&str>,
    ) -> Result<(), IgniteError> {
        self.reporter.ignite_starting(app_name, version);
        self.connect(app_name, custom_manifest)
            .inspect_err(|error| self.reporter.ignite_failed(error))
    }

    fn connect(&self, app_name: &str, custom_manifest: Option<&str>) -> Result<(), IgniteError> {
        // Claimed before any work so concurrent ignites cannot both reach the bridge.
        if self
            .connected
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(IgniteError::AlreadyConnected);
        }

        self.publish(app_name, custom_manifest)
            .inspect_err(|_| self.connected.store(false, Ordering::SeqCst))?;
        self.reporter.connected(app_name);
        Ok(())
    }

    fn publish(&self, app_name: &str, custom_manifest: Option<&str>) -> Result<(), IgniteError> {
        let document = match custom_manifest.filter(|text| !text.trim().is_empty()) {
            Some(text) => ManifestDocument::custom(text)?,
            None => ManifestDocument::Generated(self.manifest(app_name)),
        };
        let text = document.to_text()?;
        self.persist_manifest(&text);

        self.bridge
            .connect(app_name, &text, self.command_callback())?;
        Ok(())
    }

    fn persist_manifest(&self, text: &str) {
        if !self.config.write_manifest() {
            return;
        }
        let path = self.config.manifest_path().as_std_path();
        match write_manifest(path, text) {
            Ok(()) => self.reporter.manifest_saved(path),
            Err(error) => self.reporter.manifest_save_failed(&error),
        }
    }

    /// Disconnects from the bridge. Calling this while disconnected only
    /// reports the event.
    pub fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.bridge.disconnect();
        }
        self.reporter.disconnected();
    }

    /// Returns `true` between a successful ignite and disconnect, and while
    /// an ignite is in progress.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Drop for Rail {
    fn drop(&mut self) {
        if self.is_connected() {
            self.disconnect();
        }
    }
}

impl std::fmt::Debug for Rail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rail")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
