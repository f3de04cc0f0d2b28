//! In-memory store of live secondary resources.

use crate::capability::{
    domain::{GenericObject, TypeDescriptor},
    ports::{ResourceStore, ResourceStoreError, ResourceStoreResult},
};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, RwLock};

type ResourceKey = (TypeDescriptor, String, String);

/// Thread-safe in-memory resource store keyed by descriptor, namespace,
/// and name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResourceStore {
    objects: Arc<RwLock<HashMap<ResourceKey, GenericObject>>>,
}

impl InMemoryResourceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `object`, replacing any object with the same identity.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceStoreError`] when the object has no descriptor or
    /// name, or the lock is poisoned.
    pub fn put(&self, object: GenericObject) -> ResourceStoreResult<()> {
        let descriptor = object.type_descriptor().ok_or_else(|| {
            ResourceStoreError::backend(io::Error::new(
                io::ErrorKind::InvalidInput,
                "object has no apiVersion/kind",
            ))
        })?;
        let name = object.name().map(str::to_owned).ok_or_else(|| {
            ResourceStoreError::backend(io::Error::new(
                io::ErrorKind::InvalidInput,
                "object has no metadata.name",
            ))
        })?;
        let namespace = object.namespace().unwrap_or_default().to_owned();
        let mut objects = self
            .objects
            .write()
            .map_err(|err| ResourceStoreError::backend(io::Error::other(err.to_string())))?;
        objects.insert((descriptor, namespace, name), object);
        Ok(())
    }
}

impl ResourceStore for InMemoryResourceStore {
    fn get(
        &self,
        descriptor: &TypeDescriptor,
        name: &str,
        namespace: &str,
    ) -> ResourceStoreResult<Option<GenericObject>> {
        let objects = self
            .objects
            .read()
            .map_err(|err| ResourceStoreError::backend(io::Error::other(err.to_string())))?;
        Ok(objects
            .get(&(descriptor.clone(), namespace.to_owned(), name.to_owned()))
            .cloned())
    }
}
