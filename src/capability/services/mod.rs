//! Services for plugin calls, registration, serving, and startup.

mod aggregate;
mod catalog;
mod client;
mod dependent;
mod host;
mod memo;
mod registry;
mod server;

pub use aggregate::AggregatePluginResource;
pub use catalog::{
    CapabilityCatalogError, CapabilityCatalogResult, CapabilityCatalogService, CatalogOutcome,
};
pub use client::PluginClient;
pub use dependent::PluginDependentResource;
pub use host::{PluginHost, PluginHostConfig, PluginHostError, PluginHostResult, discover_plugins};
pub use registry::{
    ConflictPolicy, PluginRegistry, PluginRegistryError, PluginRegistryResult,
    RegisteredCapability, RegistryEntry,
};
pub use server::PluginServer;
