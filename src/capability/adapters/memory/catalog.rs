//! In-memory repository for capability metadata records.

use crate::capability::{
    domain::{CapabilityInfo, CapabilityInfoName},
    ports::{
        CapabilityInfoRepository, CapabilityInfoRepositoryError, CapabilityInfoRepositoryResult,
    },
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory capability info repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCapabilityInfoRepository {
    records: Arc<RwLock<BTreeMap<CapabilityInfoName, CapabilityInfo>>>,
}

impl InMemoryCapabilityInfoRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: &impl ToString) -> CapabilityInfoRepositoryError {
    CapabilityInfoRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl CapabilityInfoRepository for InMemoryCapabilityInfoRepository {
    async fn create(&self, info: &CapabilityInfo) -> CapabilityInfoRepositoryResult<()> {
        let mut records = self.records.write().map_err(|err| poisoned(&err))?;
        if records.contains_key(info.name()) {
            return Err(CapabilityInfoRepositoryError::Duplicate(info.name().clone()));
        }
        records.insert(info.name().clone(), info.clone());
        Ok(())
    }

    async fn update(&self, info: &CapabilityInfo) -> CapabilityInfoRepositoryResult<()> {
        let mut records = self.records.write().map_err(|err| poisoned(&err))?;
        let stored = records
            .get_mut(info.name())
            .ok_or_else(|| CapabilityInfoRepositoryError::NotFound(info.name().clone()))?;
        info.clone_into(stored);
        Ok(())
    }

    async fn find_by_name(
        &self,
        name: &CapabilityInfoName,
    ) -> CapabilityInfoRepositoryResult<Option<CapabilityInfo>> {
        let records = self.records.read().map_err(|err| poisoned(&err))?;
        Ok(records.get(name).cloned())
    }

    async fn list_all(&self) -> CapabilityInfoRepositoryResult<Vec<CapabilityInfo>> {
        let records = self.records.read().map_err(|err| poisoned(&err))?;
        Ok(records.values().cloned().collect())
    }
}
