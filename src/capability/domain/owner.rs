//! The controller-side object that requested a capability.

use super::{CapabilityCategory, CapabilityDomainError, CapabilityType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Capability request on whose behalf dependent resources are resolved.
///
/// Owners are sent by value in every bound call so that plugin code can
/// compute names and ownership without access to the controller's store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityOwner {
    name: String,
    #[serde(default)]
    namespace: String,
    category: CapabilityCategory,
    #[serde(rename = "type")]
    capability_type: CapabilityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    parameters: BTreeMap<String, String>,
}

impl CapabilityOwner {
    /// Creates an owner requesting `category`/`capability_type`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError::EmptyOwnerName`] when `name` is empty
    /// after trimming.
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        category: CapabilityCategory,
        capability_type: CapabilityType,
    ) -> Result<Self, CapabilityDomainError> {
        let normalized_name = name.into().trim().to_owned();
        if normalized_name.is_empty() {
            return Err(CapabilityDomainError::EmptyOwnerName);
        }
        Ok(Self {
            name: normalized_name,
            namespace: namespace.into().trim().to_owned(),
            category,
            capability_type,
            version: None,
            parameters: BTreeMap::new(),
        })
    }

    /// Sets the requested capability version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Replaces the free-form capability parameters.
    #[must_use]
    pub fn with_parameters(
        mut self,
        parameters: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.parameters = parameters.into_iter().collect();
        self
    }

    /// Returns the owner name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the owner namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the requested category.
    #[must_use]
    pub const fn category(&self) -> &CapabilityCategory {
        &self.category
    }

    /// Returns the requested type.
    #[must_use]
    pub const fn capability_type(&self) -> &CapabilityType {
        &self.capability_type
    }

    /// Returns the requested version, if any.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns a single parameter value.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// Returns all parameters.
    #[must_use]
    pub const fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }
}
