//! Plugin-side call dispatcher.

use crate::capability::{
    domain::{CapabilityOwner, Object, TypeDescriptor, decode, encode},
    ports::{DependentResource, DependentResourceError, PluginResource},
    wire::{
        BuildResponse, PluginMethod, PluginRequest, PluginResponse, RemoteFault, UpdateResponse,
    },
};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

type Dispatch<T> = Result<T, RemoteFault>;

/// Serves remote calls against a local [`PluginResource`].
///
/// Target-level calls are routed to the dependent resource whose declared
/// descriptor equals the envelope's target. Arguments are decoded into a
/// prototype the resource builds in prototype-only mode.
#[derive(Clone)]
pub struct PluginServer {
    resource: Arc<dyn PluginResource>,
}

impl PluginServer {
    /// Creates a server for `resource`.
    #[must_use]
    pub fn new(resource: Arc<dyn PluginResource>) -> Self {
        Self { resource }
    }

    /// Handles one call and returns the reply to send back.
    #[must_use]
    pub fn handle(&self, method: PluginMethod, request: &PluginRequest) -> PluginResponse {
        debug!(%method, "handling plugin call");
        match self.dispatch(method, request) {
            Ok(body) => PluginResponse::Ok(body),
            Err(fault) => {
                warn!(%method, kind = %fault.kind(), message = fault.message(), "plugin call failed");
                PluginResponse::Fault(fault)
            }
        }
    }

    fn dispatch(&self, method: PluginMethod, request: &PluginRequest) -> Dispatch<Value> {
        match method {
            PluginMethod::GetCategory => to_body(&self.resource.supported_category()),
            PluginMethod::GetTypes => to_body(&self.resource.supported_types()),
            PluginMethod::GetDependentResourceTypes => {
                let owner = require_owner(request)?;
                let descriptors = self
                    .resource
                    .dependent_resources_with(owner)
                    .iter()
                    .map(|dependent| {
                        dependent
                            .config()
                            .map(|config| config.descriptor().clone())
                            .map_err(into_fault)
                    })
                    .collect::<Dispatch<Vec<TypeDescriptor>>>()?;
                to_body(&descriptors)
            }
            _ => self.dispatch_targeted(method, request),
        }
    }

    fn dispatch_targeted(&self, method: PluginMethod, request: &PluginRequest) -> Dispatch<Value> {
        let owner = require_owner(request)?;
        let target = request
            .target()
            .ok_or_else(|| RemoteFault::protocol(format!("{method} requires a target descriptor")))?;
        let dependent = self.dependent_for(owner, target)?;

        match method {
            PluginMethod::Name => to_body(&dependent.name().map_err(into_fault)?),
            PluginMethod::NameFrom => {
                let object = requested_arg(dependent.as_ref(), method, request)?;
                to_body(&dependent.name_from(object.as_ref()).map_err(into_fault)?)
            }
            PluginMethod::Build => {
                let built = dependent.build(false).map_err(into_fault)?;
                let generic = encode(built.as_ref(), target)
                    .map_err(|err| RemoteFault::protocol(err.to_string()))?;
                to_body(&BuildResponse { built: generic })
            }
            PluginMethod::Update => {
                let mut object = requested_arg(dependent.as_ref(), method, request)?;
                to_body(&update(dependent.as_ref(), object.as_mut(), target)?)
            }
            PluginMethod::IsReady => {
                let object = requested_arg(dependent.as_ref(), method, request)?;
                to_body(&dependent.is_ready(object.as_ref()).map_err(into_fault)?)
            }
            PluginMethod::GetConfig => to_body(&dependent.config().map_err(into_fault)?),
            PluginMethod::GetCategory
            | PluginMethod::GetTypes
            | PluginMethod::GetDependentResourceTypes => Err(RemoteFault::protocol(format!(
                "{method} is not a targeted method"
            ))),
        }
    }

    fn dependent_for(
        &self,
        owner: &CapabilityOwner,
        target: &TypeDescriptor,
    ) -> Dispatch<Box<dyn DependentResource>> {
        for dependent in self.resource.dependent_resources_with(owner) {
            if dependent.config().map_err(into_fault)?.descriptor() == target {
                return Ok(dependent);
            }
        }
        Err(RemoteFault::protocol(format!(
            "no dependent resource of {target} for owner '{}'",
            owner.name()
        )))
    }
}

impl fmt::Debug for PluginServer {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PluginServer")
            .field("category", &self.resource.supported_category())
            .finish_non_exhaustive()
    }
}

fn update(
    dependent: &dyn DependentResource,
    object: &mut dyn Object,
    target: &TypeDescriptor,
) -> Dispatch<UpdateResponse> {
    match dependent.update(object) {
        Ok(needs_update) => {
            let updated = encode(object, target)
                .map_err(|err| RemoteFault::protocol(err.to_string()))?;
            Ok(UpdateResponse {
                needs_update,
                error: None,
                updated: Some(updated),
            })
        }
        Err(DependentResourceError::Codec(err)) => Err(RemoteFault::protocol(err.to_string())),
        Err(err) => Ok(UpdateResponse {
            needs_update: false,
            error: Some(err.to_string()),
            updated: None,
        }),
    }
}

fn require_owner(request: &PluginRequest) -> Dispatch<&CapabilityOwner> {
    request
        .owner()
        .ok_or_else(|| RemoteFault::protocol("call requires an owner"))
}

fn requested_arg(
    dependent: &dyn DependentResource,
    method: PluginMethod,
    request: &PluginRequest,
) -> Dispatch<Box<dyn Object>> {
    let arg = request
        .arg()
        .ok_or_else(|| RemoteFault::protocol(format!("{method} requires an argument")))?;
    let prototype = dependent.build(true).map_err(into_fault)?;
    decode(arg, prototype).map_err(|err| RemoteFault::protocol(err.to_string()))
}

fn to_body<T: Serialize>(value: &T) -> Dispatch<Value> {
    serde_json::to_value(value).map_err(|err| RemoteFault::protocol(err.to_string()))
}

fn into_fault(err: DependentResourceError) -> RemoteFault {
    match err {
        DependentResourceError::Codec(codec) => RemoteFault::protocol(codec.to_string()),
        other => RemoteFault::business(other.to_string()),
    }
}
