//! Host-side read access to live secondary resources.

use crate::capability::domain::{GenericObject, TypeDescriptor};
use std::sync::Arc;
use thiserror::Error;

/// Result type for resource store lookups.
pub type ResourceStoreResult<T> = Result<T, ResourceStoreError>;

/// Lookup of live resources owned by the host's cluster connection.
///
/// Plugins never fetch live state themselves; dependent-resource proxies
/// read it through this port.
pub trait ResourceStore: Send + Sync {
    /// Returns the live resource of `descriptor` named `name` in
    /// `namespace`, or `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceStoreError`] when the backing store fails.
    fn get(
        &self,
        descriptor: &TypeDescriptor,
        name: &str,
        namespace: &str,
    ) -> ResourceStoreResult<Option<GenericObject>>;
}

/// Errors returned by resource store adapters.
#[derive(Debug, Clone, Error)]
pub enum ResourceStoreError {
    /// Backing store failure.
    #[error("resource store error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl ResourceStoreError {
    /// Wraps a backing store failure.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
