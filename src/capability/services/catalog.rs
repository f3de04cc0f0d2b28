//! Service recording advertised capabilities as metadata records.

use crate::capability::{
    domain::{CapabilityCategory, CapabilityInfo, CapabilityInfoName, TypeInfo},
    ports::{CapabilityInfoRepository, CapabilityInfoRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for the capability catalog.
#[derive(Debug, Clone, Error)]
pub enum CapabilityCatalogError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] CapabilityInfoRepositoryError),
}

/// Result type for catalog operations.
pub type CapabilityCatalogResult<T> = Result<T, CapabilityCatalogError>;

/// What recording a capability did to its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOutcome {
    /// No record existed; one was created.
    Created,
    /// The record existed with different metadata and was updated.
    Updated,
    /// The record already matched.
    Unchanged,
}

/// Records capabilities provided by loaded plugins.
#[derive(Clone)]
pub struct CapabilityCatalogService<R, C>
where
    R: CapabilityInfoRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> CapabilityCatalogService<R, C>
where
    R: CapabilityInfoRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new catalog service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates the record for `type_info` within `category` if absent, or
    /// updates it when its metadata changed.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityCatalogError`] when the repository fails.
    pub async fn record(
        &self,
        category: &CapabilityCategory,
        type_info: &TypeInfo,
    ) -> CapabilityCatalogResult<CatalogOutcome> {
        let name = CapabilityInfoName::for_pair(category, type_info.capability_type());
        match self.repository.find_by_name(&name).await? {
            None => {
                let info = CapabilityInfo::new(category.clone(), type_info, &*self.clock);
                self.repository.create(&info).await?;
                Ok(CatalogOutcome::Created)
            }
            Some(mut info) => {
                if !info.refresh(category, type_info, &*self.clock) {
                    return Ok(CatalogOutcome::Unchanged);
                }
                self.repository.update(&info).await?;
                Ok(CatalogOutcome::Updated)
            }
        }
    }

    /// Finds a record by name.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityCatalogError`] when the repository fails.
    pub async fn find(
        &self,
        name: &CapabilityInfoName,
    ) -> CapabilityCatalogResult<Option<CapabilityInfo>> {
        Ok(self.repository.find_by_name(name).await?)
    }

    /// Lists every record.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityCatalogError`] when the repository fails.
    pub async fn list_all(&self) -> CapabilityCatalogResult<Vec<CapabilityInfo>> {
        Ok(self.repository.list_all().await?)
    }
}
