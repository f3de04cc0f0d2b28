//! Repository port for advertised capability metadata.

use crate::capability::domain::{CapabilityInfo, CapabilityInfoName};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for capability info repository operations.
pub type CapabilityInfoRepositoryResult<T> = Result<T, CapabilityInfoRepositoryError>;

/// Persistence contract for capability metadata records.
#[async_trait]
pub trait CapabilityInfoRepository: Send + Sync {
    /// Stores a new record.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityInfoRepositoryError::Duplicate`] when a record
    /// with the same name exists.
    async fn create(&self, info: &CapabilityInfo) -> CapabilityInfoRepositoryResult<()>;

    /// Replaces an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityInfoRepositoryError::NotFound`] when no record
    /// with that name exists.
    async fn update(&self, info: &CapabilityInfo) -> CapabilityInfoRepositoryResult<()>;

    /// Finds a record by name.
    async fn find_by_name(
        &self,
        name: &CapabilityInfoName,
    ) -> CapabilityInfoRepositoryResult<Option<CapabilityInfo>>;

    /// Returns every record.
    async fn list_all(&self) -> CapabilityInfoRepositoryResult<Vec<CapabilityInfo>>;
}

/// Errors returned by capability info repository implementations.
#[derive(Debug, Clone, Error)]
pub enum CapabilityInfoRepositoryError {
    /// A record with the same name already exists.
    #[error("duplicate capability info: {0}")]
    Duplicate(CapabilityInfoName),

    /// The record was not found.
    #[error("capability info not found: {0}")]
    NotFound(CapabilityInfoName),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CapabilityInfoRepositoryError {
    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
