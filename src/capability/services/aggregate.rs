//! Single plugin resource backed by several implementations of one category.

use crate::capability::{
    domain::{CapabilityCategory, CapabilityDomainError, CapabilityOwner, TypeInfo},
    ports::{DependentResource, PluginResource},
};
use std::sync::Arc;

/// Combines plugin resources of the same category so one plugin process can
/// serve several types, routing each owner to the resource declaring its
/// type.
#[derive(Clone)]
pub struct AggregatePluginResource {
    category: CapabilityCategory,
    resources: Vec<Arc<dyn PluginResource>>,
}

impl AggregatePluginResource {
    /// Aggregates `resources`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError::NoAggregatedResources`] when
    /// `resources` is empty and [`CapabilityDomainError::MixedCategories`]
    /// when they do not all provide the same category.
    pub fn new(resources: Vec<Arc<dyn PluginResource>>) -> Result<Self, CapabilityDomainError> {
        let category = resources
            .first()
            .map(|first| first.supported_category())
            .ok_or(CapabilityDomainError::NoAggregatedResources)?;
        if let Some(mismatch) = resources
            .iter()
            .map(|resource| resource.supported_category())
            .find(|found| !found.matches(&category))
        {
            return Err(CapabilityDomainError::MixedCategories {
                expected: category.to_string(),
                found: mismatch.to_string(),
            });
        }
        Ok(Self {
            category,
            resources,
        })
    }

    fn resource_for(&self, owner: &CapabilityOwner) -> Option<&Arc<dyn PluginResource>> {
        self.resources.iter().find(|resource| {
            resource
                .supported_types()
                .iter()
                .any(|type_info| type_info.capability_type().matches(owner.capability_type()))
        })
    }
}

impl PluginResource for AggregatePluginResource {
    fn supported_category(&self) -> CapabilityCategory {
        self.category.clone()
    }

    fn supported_types(&self) -> Vec<TypeInfo> {
        self.resources
            .iter()
            .flat_map(|resource| resource.supported_types())
            .collect()
    }

    fn dependent_resources_with(
        &self,
        owner: &CapabilityOwner,
    ) -> Vec<Box<dyn DependentResource>> {
        self.resource_for(owner)
            .map(|resource| resource.dependent_resources_with(owner))
            .unwrap_or_default()
    }
}
