//! Host-side handle to a plugin process.

use super::PluginDependentResource;
use super::memo::Memo;
use crate::capability::{
    domain::{
        CapabilityCategory, CapabilityOwner, Object, PluginId, TypeDescriptor, TypeInfo, encode,
    },
    ports::{LaunchedPlugin, PluginCallError, PluginCallResult, PluginTransport, ResourceStore},
    wire::{FaultKind, PluginMethod, PluginRequest, PluginResponse},
};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info};

/// Remote call client for one plugin process.
///
/// A client may be bound to a [`CapabilityOwner`], in which case every
/// envelope it sends carries that owner. Bound copies created with
/// [`PluginClient::bound_to`] share the channel, the liveness flag, and the
/// memoised category and types with the client they came from.
#[derive(Clone)]
pub struct PluginClient {
    id: PluginId,
    name: String,
    transport: Arc<dyn PluginTransport>,
    owner: Option<CapabilityOwner>,
    category: Arc<Memo<CapabilityCategory>>,
    types: Arc<Memo<Vec<TypeInfo>>>,
    alive: Arc<AtomicBool>,
}

impl PluginClient {
    /// Creates an unbound client over `transport`.
    #[must_use]
    pub fn new(name: impl Into<String>, transport: Arc<dyn PluginTransport>) -> Self {
        Self {
            id: PluginId::new(),
            name: name.into(),
            transport,
            owner: None,
            category: Arc::new(Memo::new()),
            types: Arc::new(Memo::new()),
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Creates an unbound client for a freshly launched plugin.
    #[must_use]
    pub fn from_launched(launched: LaunchedPlugin) -> Self {
        Self::new(launched.name, launched.transport)
    }

    /// Returns the handle identifier, shared by bound copies.
    #[must_use]
    pub const fn id(&self) -> PluginId {
        self.id
    }

    /// Returns the plugin name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the owner this client is bound to, if any.
    #[must_use]
    pub const fn owner(&self) -> Option<&CapabilityOwner> {
        self.owner.as_ref()
    }

    /// Returns whether the plugin can still be called.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Returns a copy of this client bound to `owner`.
    #[must_use]
    pub fn bound_to(&self, owner: CapabilityOwner) -> Self {
        Self {
            owner: Some(owner),
            ..self.clone()
        }
    }

    /// Issues `method` against `target` with at most one argument and
    /// decodes the reply body into `R`.
    ///
    /// An empty `target` sends a category/type-level call. The argument's
    /// own descriptor is used to encode it, falling back to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginCallError::TooManyArguments`] without sending anything
    /// when more than one argument is given, [`PluginCallError::Unavailable`]
    /// once the plugin is dead, [`PluginCallError::Transport`] when the
    /// channel fails (the plugin is then marked dead), and
    /// [`PluginCallError::Protocol`] or [`PluginCallError::Business`] for
    /// faults reported by the plugin.
    pub fn call<R: DeserializeOwned>(
        &self,
        method: PluginMethod,
        target: &TypeDescriptor,
        args: &[&dyn Object],
    ) -> PluginCallResult<R> {
        if args.len() > 1 {
            error!(
                plugin = %self.name,
                %method,
                count = args.len(),
                "refusing plugin call with more than one argument"
            );
            return Err(PluginCallError::TooManyArguments {
                plugin: self.name.clone(),
                method,
                count: args.len(),
            });
        }
        if !self.is_alive() {
            return Err(PluginCallError::Unavailable(self.name.clone()));
        }

        let request = self.envelope(method, target, args.first().copied())?;
        debug!(plugin = %self.name, %method, %target, "dispatching plugin call");

        match self.transport.call(method, &request) {
            Ok(PluginResponse::Ok(body)) => serde_json::from_value(body).map_err(|err| {
                self.protocol_violation(method, format!("undecodable reply: {err}"))
            }),
            Ok(PluginResponse::Fault(fault)) => match fault.kind() {
                FaultKind::Protocol => Err(self.protocol_violation(method, fault.message())),
                FaultKind::Business => Err(PluginCallError::Business {
                    plugin: self.name.clone(),
                    method,
                    message: fault.message().to_owned(),
                }),
            },
            Err(source) => {
                self.alive.store(false, Ordering::Release);
                error!(
                    plugin = %self.name,
                    %method,
                    error = %source,
                    "plugin transport failed; marking plugin unusable"
                );
                Err(PluginCallError::Transport {
                    plugin: self.name.clone(),
                    method,
                    source,
                })
            }
        }
    }

    fn envelope(
        &self,
        method: PluginMethod,
        target: &TypeDescriptor,
        arg: Option<&dyn Object>,
    ) -> PluginCallResult<PluginRequest> {
        let mut request = PluginRequest::new();
        if let Some(owner) = &self.owner {
            request = request.with_owner(owner.clone());
        }
        if !target.is_empty() {
            request = request.with_target(target.clone());
        }
        if let Some(object) = arg {
            let descriptor = object
                .descriptor()
                .filter(|descriptor| !descriptor.is_empty())
                .unwrap_or_else(|| target.clone());
            let generic = encode(object, &descriptor)
                .map_err(|err| self.protocol_violation(method, err.to_string()))?;
            request = request.with_arg(generic);
        }
        Ok(request)
    }

    fn protocol_violation(
        &self,
        method: PluginMethod,
        message: impl Into<String>,
    ) -> PluginCallError {
        let diagnostic = message.into();
        error!(plugin = %self.name, %method, message = %diagnostic, "plugin protocol violation");
        PluginCallError::Protocol {
            plugin: self.name.clone(),
            method,
            message: diagnostic,
        }
    }

    /// Returns the plugin's category, fetched once per plugin.
    ///
    /// # Errors
    ///
    /// Returns [`PluginCallError`] when the first fetch fails.
    pub fn category(&self) -> PluginCallResult<CapabilityCategory> {
        self.category.get_or_try_init(|| {
            self.call(PluginMethod::GetCategory, &TypeDescriptor::empty(), &[])
        })
    }

    /// Returns the plugin's supported types, fetched once per plugin.
    ///
    /// # Errors
    ///
    /// Returns [`PluginCallError`] when the first fetch fails.
    pub fn types(&self) -> PluginCallResult<Vec<TypeInfo>> {
        self.types
            .get_or_try_init(|| self.call(PluginMethod::GetTypes, &TypeDescriptor::empty(), &[]))
    }

    /// Returns the descriptors of the dependent resources the plugin needs
    /// for `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginCallError`] when the call fails.
    pub fn dependent_resource_types(
        &self,
        owner: &CapabilityOwner,
    ) -> PluginCallResult<Vec<TypeDescriptor>> {
        self.bound_to(owner.clone()).call(
            PluginMethod::GetDependentResourceTypes,
            &TypeDescriptor::empty(),
            &[],
        )
    }

    /// Returns one proxy per dependent resource the plugin needs for
    /// `owner`, in the order the plugin declares them.
    ///
    /// # Errors
    ///
    /// Returns [`PluginCallError`] when the descriptors cannot be fetched.
    pub fn ready_for(
        &self,
        owner: &CapabilityOwner,
        store: &Arc<dyn ResourceStore>,
    ) -> PluginCallResult<Vec<PluginDependentResource>> {
        let descriptors = self.dependent_resource_types(owner)?;
        let bound = self.bound_to(owner.clone());
        Ok(descriptors
            .into_iter()
            .map(|descriptor| {
                PluginDependentResource::new(
                    bound.clone(),
                    owner.clone(),
                    descriptor,
                    Arc::clone(store),
                )
            })
            .collect())
    }

    /// Closes the channel and terminates the plugin process.
    pub fn kill(&self) {
        if self.alive.swap(false, Ordering::AcqRel) {
            info!(plugin = %self.name, "killing plugin");
            self.transport.kill();
        }
    }
}

impl fmt::Debug for PluginClient {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PluginClient")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("owner", &self.owner.as_ref().map(CapabilityOwner::name))
            .field("category", &self.category.get())
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}
