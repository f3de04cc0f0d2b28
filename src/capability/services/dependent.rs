//! Host-side proxy for a dependent resource managed by a plugin.

use super::PluginClient;
use super::memo::Memo;
use crate::capability::{
    domain::{
        CapabilityOwner, DependentResourceConfig, GenericObject, Object, ReadyStatus,
        TypeDescriptor,
    },
    ports::{
        DependentResource, DependentResourceError, DependentResult, PluginCallError,
        ResourceStore,
    },
    wire::{BuildResponse, PluginMethod, UpdateResponse},
};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// Local stand-in for one secondary resource a plugin manages for an owner.
///
/// The name and configuration are fetched from the plugin at most once.
/// Every other operation is forwarded on each call. Live state is read from
/// the host's [`ResourceStore`], never from the plugin.
pub struct PluginDependentResource {
    client: PluginClient,
    owner: CapabilityOwner,
    descriptor: TypeDescriptor,
    store: Arc<dyn ResourceStore>,
    config: Memo<DependentResourceConfig>,
    name: Memo<String>,
}

impl PluginDependentResource {
    /// Creates a proxy for the `descriptor` resource of `owner`.
    ///
    /// `client` should be bound to `owner` so forwarded calls carry it.
    #[must_use]
    pub const fn new(
        client: PluginClient,
        owner: CapabilityOwner,
        descriptor: TypeDescriptor,
        store: Arc<dyn ResourceStore>,
    ) -> Self {
        Self {
            client,
            owner,
            descriptor,
            store,
            config: Memo::new(),
            name: Memo::new(),
        }
    }

    /// Returns the descriptor this proxy routes calls to.
    #[must_use]
    pub const fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Returns the client calls are forwarded through.
    #[must_use]
    pub const fn client(&self) -> &PluginClient {
        &self.client
    }

    fn forward<R: DeserializeOwned>(
        &self,
        method: PluginMethod,
        args: &[&dyn Object],
    ) -> DependentResult<R> {
        self.client
            .call(method, &self.descriptor, args)
            .map_err(into_dependent_error)
    }
}

fn into_dependent_error(err: PluginCallError) -> DependentResourceError {
    match err {
        PluginCallError::Business { message, .. } => DependentResourceError::Business(message),
        other => DependentResourceError::Call(other),
    }
}

impl DependentResource for PluginDependentResource {
    fn owner(&self) -> &CapabilityOwner {
        &self.owner
    }

    fn name(&self) -> DependentResult<String> {
        self.name
            .get_or_try_init(|| self.forward(PluginMethod::Name, &[]))
    }

    fn name_from(&self, object: &dyn Object) -> DependentResult<String> {
        self.forward(PluginMethod::NameFrom, &[object])
    }

    fn fetch(&self) -> DependentResult<Option<Box<dyn Object>>> {
        let config = self.config()?;
        let name = self.name()?;
        let live = self
            .store
            .get(config.descriptor(), &name, self.owner.namespace())?;
        Ok(live.map(|object| Box::new(object) as Box<dyn Object>))
    }

    fn build(&self, prototype_only: bool) -> DependentResult<Box<dyn Object>> {
        if prototype_only {
            return Ok(Box::new(GenericObject::new(&self.descriptor)));
        }
        let response: BuildResponse = self.forward(PluginMethod::Build, &[])?;
        Ok(Box::new(response.built))
    }

    fn update(&self, current: &mut dyn Object) -> DependentResult<bool> {
        let response: UpdateResponse = self.forward(PluginMethod::Update, &[&*current])?;
        if let Some(message) = response.error {
            return Err(DependentResourceError::Business(message));
        }
        if let Some(updated) = response.updated {
            current.replace_from(&updated)?;
        }
        Ok(response.needs_update)
    }

    fn is_ready(&self, current: &dyn Object) -> DependentResult<ReadyStatus> {
        self.forward(PluginMethod::IsReady, &[current])
    }

    fn config(&self) -> DependentResult<DependentResourceConfig> {
        self.config
            .get_or_try_init(|| self.forward(PluginMethod::GetConfig, &[]))
    }
}

impl fmt::Debug for PluginDependentResource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PluginDependentResource")
            .field("plugin", &self.client.name())
            .field("owner", &self.owner.name())
            .field("descriptor", &self.descriptor)
            .field("name", &self.name.get())
            .finish_non_exhaustive()
    }
}
