//! Port contracts for plugin transport, launch, storage, and resources.

mod catalog;
mod launcher;
mod resource;
mod store;
mod transport;

pub use catalog::{
    CapabilityInfoRepository, CapabilityInfoRepositoryError, CapabilityInfoRepositoryResult,
};
pub use launcher::{LaunchError, LaunchResult, LaunchedPlugin, PluginLauncher};
pub use resource::{DependentResource, DependentResourceError, DependentResult, PluginResource};
pub use store::{ResourceStore, ResourceStoreError, ResourceStoreResult};
#[cfg(test)]
pub use transport::MockPluginTransport;
pub use transport::{
    PluginCallError, PluginCallResult, PluginTransport, TransportError, TransportResult,
};
