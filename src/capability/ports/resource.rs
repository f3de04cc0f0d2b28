//! Dependent-resource and plugin-resource contracts.
//!
//! Plugin authors implement [`PluginResource`] and [`DependentResource`] for
//! their typed objects. The host sees the same [`DependentResource`]
//! contract through proxies that forward each operation to the plugin.

use super::{PluginCallError, ResourceStoreError};
use crate::capability::domain::{
    CapabilityCategory, CapabilityOwner, CodecError, DependentResourceConfig, Object, ReadyStatus,
    TypeInfo,
};
use thiserror::Error;

/// Result type for dependent-resource operations.
pub type DependentResult<T> = Result<T, DependentResourceError>;

/// A secondary resource a capability needs, bound to one owner.
pub trait DependentResource: Send + Sync {
    /// Returns the owner this resource is bound to.
    fn owner(&self) -> &CapabilityOwner;

    /// Returns the resource's concrete name, usually derived from the owner.
    ///
    /// # Errors
    ///
    /// Returns [`DependentResourceError`] when the name cannot be computed.
    fn name(&self) -> DependentResult<String>;

    /// Derives a name from an arbitrary object, ignoring owner state.
    ///
    /// # Errors
    ///
    /// Returns [`DependentResourceError`] when the name cannot be derived.
    fn name_from(&self, object: &dyn Object) -> DependentResult<String>;

    /// Looks up the live resource, returning `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DependentResourceError`] when the lookup fails.
    fn fetch(&self) -> DependentResult<Option<Box<dyn Object>>>;

    /// Builds the desired resource state. With `prototype_only`, returns a
    /// zero value suitable as a decoding prototype.
    ///
    /// # Errors
    ///
    /// Returns [`DependentResourceError`] when the resource cannot be built.
    fn build(&self, prototype_only: bool) -> DependentResult<Box<dyn Object>>;

    /// Reconciles `current` in place, returning whether it had to change.
    ///
    /// # Errors
    ///
    /// Returns [`DependentResourceError`] when reconciliation fails.
    fn update(&self, current: &mut dyn Object) -> DependentResult<bool>;

    /// Evaluates readiness of the live object.
    ///
    /// # Errors
    ///
    /// Returns [`DependentResourceError`] when readiness cannot be evaluated.
    fn is_ready(&self, current: &dyn Object) -> DependentResult<ReadyStatus>;

    /// Returns the resource's declared configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DependentResourceError`] when the configuration cannot be
    /// obtained.
    fn config(&self) -> DependentResult<DependentResourceConfig>;
}

/// Behaviour a plugin exposes for one capability category.
///
/// A plugin supports exactly one category but may provide several types
/// within it (for example `postgresql` and `mysql` within `database`).
pub trait PluginResource: Send + Sync {
    /// Returns the supported category.
    fn supported_category(&self) -> CapabilityCategory;

    /// Returns the supported types with their versions.
    fn supported_types(&self) -> Vec<TypeInfo>;

    /// Returns the ordered dependent resources for `owner`.
    fn dependent_resources_with(&self, owner: &CapabilityOwner)
    -> Vec<Box<dyn DependentResource>>;
}

/// Failures of dependent-resource operations.
#[derive(Debug, Clone, Error)]
pub enum DependentResourceError {
    /// The capability logic failed for this owner. Not fatal to the plugin.
    #[error("{0}")]
    Business(String),

    /// The remote call failed.
    #[error(transparent)]
    Call(#[from] PluginCallError),

    /// An object could not be converted.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The host store failed.
    #[error(transparent)]
    Store(#[from] ResourceStoreError),
}

impl DependentResourceError {
    /// Creates a business error.
    #[must_use]
    pub fn business(message: impl Into<String>) -> Self {
        Self::Business(message.into())
    }
}
