//! Shared world state for capability plugin BDD scenarios.

use std::sync::Arc;

use caplink::capability::{
    adapters::{
        LoopbackLauncher,
        memory::{InMemoryCapabilityInfoRepository, InMemoryResourceStore},
    },
    domain::{CapabilityCategory, CapabilityOwner, CapabilityType},
    ports::{DependentResourceError, PluginResource, ResourceStore},
    services::{PluginHost, PluginHostResult, RegisteredCapability},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Host type used by the BDD world.
pub type TestHost = PluginHost<LoopbackLauncher, InMemoryCapabilityInfoRepository, DefaultClock>;

/// Plugin made available to the launcher before the host starts.
pub struct PendingPlugin {
    /// Executable file name.
    pub name: String,
    /// Plugin-side resource.
    pub resource: Arc<dyn PluginResource>,
    /// Category the plugin advertises.
    pub category: String,
}

/// Scenario world for capability plugin behaviour tests.
pub struct PluginWorld {
    /// Plugins queued for launch, in load order.
    pub pending_plugins: Vec<PendingPlugin>,
    /// Host created once the plugins are loaded.
    pub host: Option<TestHost>,
    /// Store consulted by dependent-resource proxies.
    pub store: Arc<dyn ResourceStore>,
    /// Load result per plugin name.
    pub load_results: Vec<(String, PluginHostResult<Vec<RegisteredCapability>>)>,
    /// Result of the last dependent-resource update.
    pub last_update_result: Option<Result<bool, DependentResourceError>>,
}

impl PluginWorld {
    /// Creates a world with no plugins.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending_plugins: Vec::new(),
            host: None,
            store: Arc::new(InMemoryResourceStore::new()),
            load_results: Vec::new(),
            last_update_result: None,
        }
    }

    /// Returns the started host.
    ///
    /// # Errors
    ///
    /// Returns an error when no plugins have been loaded yet.
    pub fn host(&self) -> Result<&TestHost, eyre::Report> {
        self.host
            .as_ref()
            .ok_or_else(|| eyre::eyre!("host has not loaded any plugins yet"))
    }

    /// Builds an owner requesting the capability of the first plugin.
    ///
    /// # Errors
    ///
    /// Returns an error when no plugin was declared.
    pub fn owner_named(&self, name: &str) -> Result<CapabilityOwner, eyre::Report> {
        let plugin = self
            .pending_plugins
            .first()
            .ok_or_else(|| eyre::eyre!("no plugin declared in scenario world"))?;
        let capability_type = plugin
            .resource
            .supported_types()
            .first()
            .map(|type_info| type_info.capability_type().clone())
            .ok_or_else(|| eyre::eyre!("plugin '{}' declares no types", plugin.name))?;
        Ok(CapabilityOwner::new(
            name,
            "default",
            CapabilityCategory::new(plugin.category.as_str())?,
            CapabilityType::new(capability_type.as_str())?,
        )?)
    }
}

impl Default for PluginWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> PluginWorld {
    PluginWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
