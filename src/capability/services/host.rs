//! Host startup orchestration: discover, launch, register, and record
//! plugins.

use super::{
    CapabilityCatalogService, ConflictPolicy, PluginClient, PluginDependentResource,
    PluginRegistry, PluginRegistryError, RegisteredCapability,
};
use crate::capability::{
    domain::CapabilityOwner,
    ports::{
        CapabilityInfoRepository, LaunchError, PluginCallError, PluginLauncher, ResourceStore,
    },
    wire::HandshakeConfig,
};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Host configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginHostConfig {
    plugin_dir: Option<Utf8PathBuf>,
    conflict_policy: ConflictPolicy,
    handshake: HandshakeConfig,
}

impl PluginHostConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory scanned for plugin executables.
    #[must_use]
    pub fn with_plugin_dir(mut self, plugin_dir: impl Into<Utf8PathBuf>) -> Self {
        self.plugin_dir = Some(plugin_dir.into());
        self
    }

    /// Sets the registry conflict policy.
    #[must_use]
    pub const fn with_conflict_policy(mut self, conflict_policy: ConflictPolicy) -> Self {
        self.conflict_policy = conflict_policy;
        self
    }

    /// Sets the handshake parameters.
    #[must_use]
    pub fn with_handshake(mut self, handshake: HandshakeConfig) -> Self {
        self.handshake = handshake;
        self
    }

    /// Returns the plugin directory.
    #[must_use]
    pub fn plugin_dir(&self) -> Option<&Utf8Path> {
        self.plugin_dir.as_deref()
    }

    /// Returns the registry conflict policy.
    #[must_use]
    pub const fn conflict_policy(&self) -> ConflictPolicy {
        self.conflict_policy
    }

    /// Returns the handshake parameters.
    #[must_use]
    pub const fn handshake(&self) -> &HandshakeConfig {
        &self.handshake
    }
}

/// Host-level errors.
#[derive(Debug, Clone, Error)]
pub enum PluginHostError {
    /// No plugin directory is configured.
    #[error("no plugin directory configured")]
    NoPluginDirectory,

    /// The plugin directory could not be read.
    #[error("failed to read plugin directory '{dir}': {source}")]
    Discovery {
        /// Directory being scanned.
        dir: Utf8PathBuf,
        /// Underlying I/O failure.
        source: Arc<std::io::Error>,
    },

    /// A plugin could not be launched.
    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// Registration failed.
    #[error(transparent)]
    Registry(#[from] PluginRegistryError),

    /// A call to a resolved plugin failed.
    #[error(transparent)]
    Plugin(#[from] PluginCallError),

    /// Background work could not complete.
    #[error("plugin host runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl PluginHostError {
    /// Wraps a runtime failure.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }

    fn discovery(dir: &Utf8Path, err: std::io::Error) -> Self {
        Self::Discovery {
            dir: dir.to_owned(),
            source: Arc::new(err),
        }
    }
}

/// Result type for host operations.
pub type PluginHostResult<T> = Result<T, PluginHostError>;

/// Owns the registry and drives plugin startup.
///
/// Launch and registration block on plugin calls, so they run on the
/// blocking pool.
pub struct PluginHost<L, R, C>
where
    L: PluginLauncher + 'static,
    R: CapabilityInfoRepository,
    C: Clock + Send + Sync,
{
    config: PluginHostConfig,
    launcher: Arc<L>,
    registry: Arc<PluginRegistry>,
    catalog: CapabilityCatalogService<R, C>,
}

impl<L, R, C> PluginHost<L, R, C>
where
    L: PluginLauncher + 'static,
    R: CapabilityInfoRepository,
    C: Clock + Send + Sync,
{
    /// Creates a host with an empty registry.
    #[must_use]
    pub fn new(
        config: PluginHostConfig,
        launcher: Arc<L>,
        repository: Arc<R>,
        clock: Arc<C>,
    ) -> Self {
        let registry = Arc::new(PluginRegistry::new(config.conflict_policy()));
        Self {
            config,
            launcher,
            registry,
            catalog: CapabilityCatalogService::new(repository, clock),
        }
    }

    /// Returns the registry shared with lookup sites.
    #[must_use]
    pub const fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// Returns the host configuration.
    #[must_use]
    pub const fn config(&self) -> &PluginHostConfig {
        &self.config
    }

    /// Discovers and loads every plugin in the configured directory.
    ///
    /// Stops at the first plugin that fails to start or register.
    ///
    /// # Errors
    ///
    /// Returns [`PluginHostError`] when discovery, launch, or registration
    /// fails.
    pub async fn load_all(&self) -> PluginHostResult<Vec<RegisteredCapability>> {
        let dir = self
            .config
            .plugin_dir()
            .ok_or(PluginHostError::NoPluginDirectory)?;
        let mut registered = Vec::new();
        for path in discover_plugins(dir)? {
            registered.extend(self.load_plugin(&path).await?);
        }
        Ok(registered)
    }

    /// Launches the plugin at `path` and registers it.
    ///
    /// # Errors
    ///
    /// Returns [`PluginHostError`] when launch or registration fails.
    pub async fn load_plugin(&self, path: &Utf8Path) -> PluginHostResult<Vec<RegisteredCapability>> {
        let launcher = Arc::clone(&self.launcher);
        let handshake = self.config.handshake().clone();
        let owned_path = path.to_owned();
        let launched = tokio::task::spawn_blocking(move || launcher.launch(&owned_path, &handshake))
            .await
            .map_err(PluginHostError::runtime)??;
        info!(plugin = %launched.name, %path, "launched plugin");
        self.attach(Arc::new(PluginClient::from_launched(launched)))
            .await
    }

    /// Registers an already connected plugin and records its capabilities.
    ///
    /// A pair whose record cannot be persisted is removed from the registry.
    /// The plugin is killed when registration fails or leaves it with
    /// nothing to handle.
    ///
    /// # Errors
    ///
    /// Returns [`PluginHostError::Registry`] when registration fails.
    pub async fn attach(
        &self,
        plugin: Arc<PluginClient>,
    ) -> PluginHostResult<Vec<RegisteredCapability>> {
        let registry = Arc::clone(&self.registry);
        let candidate = Arc::clone(&plugin);
        let outcome = tokio::task::spawn_blocking(move || registry.register(&candidate))
            .await
            .map_err(PluginHostError::runtime)?;
        let registered = match outcome {
            Ok(registered) => registered,
            Err(err) => {
                error!(plugin = plugin.name(), error = %err, "plugin registration failed");
                plugin.kill();
                return Err(err.into());
            }
        };

        let mut recorded = Vec::with_capacity(registered.len());
        for capability in registered {
            match self
                .catalog
                .record(&capability.category, &capability.type_info)
                .await
            {
                Ok(catalog_outcome) => {
                    info!(
                        plugin = plugin.name(),
                        category = %capability.category,
                        capability_type = %capability.type_info.capability_type(),
                        outcome = ?catalog_outcome,
                        "recorded capability"
                    );
                    recorded.push(capability);
                }
                Err(err) => {
                    error!(
                        plugin = plugin.name(),
                        category = %capability.category,
                        capability_type = %capability.type_info.capability_type(),
                        error = %err,
                        "failed to record capability; unregistering it"
                    );
                    self.registry.remove(
                        capability.category.as_str(),
                        capability.type_info.capability_type().as_str(),
                    )?;
                }
            }
        }

        let still_registered = self
            .registry
            .plugins()?
            .iter()
            .any(|known| known.id() == plugin.id());
        if !still_registered {
            warn!(plugin = plugin.name(), "plugin handles no capability; killing it");
            plugin.kill();
        }
        Ok(recorded)
    }

    /// Resolves the plugin handling `category`/`capability_type`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginHostError::Registry`] with
    /// [`PluginRegistryError::NotFound`] when no plugin handles the pair.
    pub fn resolve(
        &self,
        category: &str,
        capability_type: &str,
    ) -> PluginHostResult<Arc<PluginClient>> {
        Ok(self.registry.resolve(category, capability_type)?)
    }

    /// Returns the dependent-resource proxies the handling plugin declares
    /// for `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginHostError`] when no plugin handles the owner's
    /// capability or the plugin call fails.
    pub fn dependents_for(
        &self,
        owner: &CapabilityOwner,
        store: &Arc<dyn ResourceStore>,
    ) -> PluginHostResult<Vec<PluginDependentResource>> {
        let plugin = self.resolve(owner.category().as_str(), owner.capability_type().as_str())?;
        Ok(plugin.ready_for(owner, store)?)
    }

    /// Kills every registered plugin.
    ///
    /// # Errors
    ///
    /// Returns [`PluginHostError::Registry`] when the registry lock is
    /// poisoned.
    pub fn shutdown(&self) -> PluginHostResult<()> {
        for plugin in self.registry.plugins()? {
            plugin.kill();
        }
        Ok(())
    }
}

/// Lists candidate plugin executables in `dir`, sorted by name.
///
/// Hidden entries and non-files are skipped. On Unix, files without any
/// execute bit are skipped too.
///
/// # Errors
///
/// Returns [`PluginHostError::Discovery`] when the directory cannot be read.
pub fn discover_plugins(dir: &Utf8Path) -> PluginHostResult<Vec<Utf8PathBuf>> {
    let handle = Dir::open_ambient_dir(dir, ambient_authority())
        .map_err(|err| PluginHostError::discovery(dir, err))?;
    let mut plugins = Vec::new();
    for entry in handle
        .entries()
        .map_err(|err| PluginHostError::discovery(dir, err))?
    {
        let dir_entry = entry.map_err(|err| PluginHostError::discovery(dir, err))?;
        let file_name = dir_entry
            .file_name()
            .map_err(|err| PluginHostError::discovery(dir, err))?;
        if file_name.starts_with('.') {
            continue;
        }
        let metadata = dir_entry
            .metadata()
            .map_err(|err| PluginHostError::discovery(dir, err))?;
        if metadata.is_file() && is_executable(&metadata) {
            plugins.push(dir.join(file_name));
        }
    }
    plugins.sort();
    Ok(plugins)
}

#[cfg(unix)]
fn is_executable(metadata: &cap_std::fs::Metadata) -> bool {
    use cap_std::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
const fn is_executable(_metadata: &cap_std::fs::Metadata) -> bool {
    true
}
