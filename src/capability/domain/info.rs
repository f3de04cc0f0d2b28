//! Persistable record of a capability a loaded plugin provides.

use super::{CapabilityCategory, CapabilityType, TypeInfo};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique record name derived from the normalised category and type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityInfoName(String);

impl CapabilityInfoName {
    /// Derives the record name `<category>-<type>` in lower case.
    #[must_use]
    pub fn for_pair(category: &CapabilityCategory, capability_type: &CapabilityType) -> Self {
        Self(format!("{}-{}", category.key(), capability_type.key()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityInfoName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Metadata record advertising that a capability type is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityInfo {
    name: CapabilityInfoName,
    category: CapabilityCategory,
    capability_type: CapabilityType,
    versions: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCapabilityInfoData {
    /// Persisted category.
    pub category: CapabilityCategory,
    /// Persisted type.
    pub capability_type: CapabilityType,
    /// Persisted versions.
    pub versions: Vec<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl CapabilityInfo {
    /// Creates a new record for `type_info` within `category`.
    #[must_use]
    pub fn new(category: CapabilityCategory, type_info: &TypeInfo, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            name: CapabilityInfoName::for_pair(&category, type_info.capability_type()),
            category,
            capability_type: type_info.capability_type().clone(),
            versions: type_info.versions().to_vec(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a record from persisted data.
    #[must_use]
    pub fn from_persisted(data: PersistedCapabilityInfoData) -> Self {
        Self {
            name: CapabilityInfoName::for_pair(&data.category, &data.capability_type),
            category: data.category,
            capability_type: data.capability_type,
            versions: data.versions,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Applies freshly declared metadata, returning whether anything changed.
    ///
    /// The update timestamp only moves when the record actually changes.
    pub fn refresh(
        &mut self,
        category: &CapabilityCategory,
        type_info: &TypeInfo,
        clock: &impl Clock,
    ) -> bool {
        let unchanged = self.category == *category
            && self.capability_type == *type_info.capability_type()
            && self.versions == type_info.versions();
        if unchanged {
            return false;
        }
        category.clone_into(&mut self.category);
        type_info
            .capability_type()
            .clone_into(&mut self.capability_type);
        self.versions = type_info.versions().to_vec();
        self.updated_at = clock.utc();
        true
    }

    /// Returns the record name.
    #[must_use]
    pub const fn name(&self) -> &CapabilityInfoName {
        &self.name
    }

    /// Returns the category as declared by the plugin.
    #[must_use]
    pub const fn category(&self) -> &CapabilityCategory {
        &self.category
    }

    /// Returns the type as declared by the plugin.
    #[must_use]
    pub const fn capability_type(&self) -> &CapabilityType {
        &self.capability_type
    }

    /// Returns the supported versions.
    #[must_use]
    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
