//! Capability category and type values.
//!
//! Categories and types are compared case-insensitively: `Database`,
//! `database`, and `DATABASE` name the same category. The original spelling
//! is preserved for display and for persisted metadata, while [`key`] gives
//! the normalised form used for registry lookups.
//!
//! [`key`]: CapabilityCategory::key

use super::CapabilityDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad capability domain such as `database` or `cache`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CapabilityCategory(String);

impl CapabilityCategory {
    /// Creates a validated category.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError::EmptyCategory`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, CapabilityDomainError> {
        let normalized = value.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(CapabilityDomainError::EmptyCategory);
        }
        Ok(Self(normalized))
    }

    /// Returns the lower-cased registry key.
    #[must_use]
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    /// Returns whether both categories name the same domain, ignoring case.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.key() == other.key()
    }

    /// Returns the category as given at construction.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CapabilityCategory {
    type Error = CapabilityDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CapabilityCategory> for String {
    fn from(value: CapabilityCategory) -> Self {
        value.0
    }
}

impl AsRef<str> for CapabilityCategory {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CapabilityCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Specific implementation within a category such as `postgresql`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CapabilityType(String);

impl CapabilityType {
    /// Creates a validated capability type.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError::EmptyType`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, CapabilityDomainError> {
        let normalized = value.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(CapabilityDomainError::EmptyType);
        }
        Ok(Self(normalized))
    }

    /// Returns the lower-cased registry key.
    #[must_use]
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    /// Returns whether both types name the same implementation, ignoring case.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.key() == other.key()
    }

    /// Returns the type as given at construction.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CapabilityType {
    type Error = CapabilityDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CapabilityType> for String {
    fn from(value: CapabilityType) -> Self {
        value.0
    }
}

impl AsRef<str> for CapabilityType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CapabilityType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A supported capability type with the versions a plugin can provision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTypeInfo")]
pub struct TypeInfo {
    #[serde(rename = "type")]
    capability_type: CapabilityType,
    #[serde(default)]
    versions: Vec<String>,
}

impl TypeInfo {
    /// Creates type information without declared versions.
    #[must_use]
    pub const fn new(capability_type: CapabilityType) -> Self {
        Self {
            capability_type,
            versions: Vec::new(),
        }
    }

    /// Sets the supported versions.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError::EmptyVersion`] when any version is
    /// empty after trimming.
    pub fn with_versions<I, S>(mut self, versions: I) -> Result<Self, CapabilityDomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut accepted = Vec::new();
        for version in versions {
            let trimmed = version.into().trim().to_owned();
            if trimmed.is_empty() {
                return Err(CapabilityDomainError::EmptyVersion(
                    self.capability_type.to_string(),
                ));
            }
            accepted.push(trimmed);
        }
        self.versions = accepted;
        Ok(self)
    }

    /// Returns the capability type.
    #[must_use]
    pub const fn capability_type(&self) -> &CapabilityType {
        &self.capability_type
    }

    /// Returns the supported versions, possibly empty.
    #[must_use]
    pub fn versions(&self) -> &[String] {
        &self.versions
    }
}

#[derive(Deserialize)]
struct RawTypeInfo {
    #[serde(rename = "type")]
    capability_type: CapabilityType,
    #[serde(default)]
    versions: Vec<String>,
}

impl TryFrom<RawTypeInfo> for TypeInfo {
    type Error = CapabilityDomainError;

    fn try_from(raw: RawTypeInfo) -> Result<Self, Self::Error> {
        Self::new(raw.capability_type).with_versions(raw.versions)
    }
}

/// Category and type list a plugin resource declares.
///
/// Plugin authors embed this in their resource implementations and delegate
/// `supported_category` and `supported_types` to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityDeclaration {
    category: CapabilityCategory,
    types: Vec<TypeInfo>,
}

impl CapabilityDeclaration {
    /// Declares a single supported type within `category`.
    #[must_use]
    pub fn new(category: CapabilityCategory, type_info: TypeInfo) -> Self {
        Self {
            category,
            types: vec![type_info],
        }
    }

    /// Adds another supported type.
    #[must_use]
    pub fn with_type(mut self, type_info: TypeInfo) -> Self {
        self.types.push(type_info);
        self
    }

    /// Returns the declared category.
    #[must_use]
    pub const fn category(&self) -> &CapabilityCategory {
        &self.category
    }

    /// Returns the declared types.
    #[must_use]
    pub fn types(&self) -> &[TypeInfo] {
        &self.types
    }
}
