//! Group/version/kind identity of secondary resources.

use super::CapabilityDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of the concrete shape of a secondary resource.
///
/// Descriptors are the routing key a plugin uses to find which of its local
/// resources should answer a call. The empty descriptor (all parts empty)
/// marks a call that is not bound to a secondary resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTypeDescriptor")]
pub struct TypeDescriptor {
    #[serde(default)]
    group: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    kind: String,
}

impl TypeDescriptor {
    /// Creates a validated descriptor. An empty `group` denotes the core
    /// group.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError::EmptyDescriptorVersion`] or
    /// [`CapabilityDomainError::EmptyDescriptorKind`] when those parts are
    /// empty after trimming.
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Result<Self, CapabilityDomainError> {
        let normalized_version = version.into().trim().to_owned();
        if normalized_version.is_empty() {
            return Err(CapabilityDomainError::EmptyDescriptorVersion);
        }
        let normalized_kind = kind.into().trim().to_owned();
        if normalized_kind.is_empty() {
            return Err(CapabilityDomainError::EmptyDescriptorKind);
        }
        Ok(Self {
            group: group.into().trim().to_owned(),
            version: normalized_version,
            kind: normalized_kind,
        })
    }

    /// Parses a descriptor from an `apiVersion` string (`group/version` or
    /// plain `version`) and a kind.
    ///
    /// # Errors
    ///
    /// Returns the same validation errors as [`TypeDescriptor::new`].
    pub fn from_api_version(
        api_version: &str,
        kind: impl Into<String>,
    ) -> Result<Self, CapabilityDomainError> {
        match api_version.split_once('/') {
            Some((group, version)) => Self::new(group, version, kind),
            None => Self::new("", api_version, kind),
        }
    }

    pub(crate) fn from_static(group: &str, version: &str, kind: &str) -> Self {
        Self {
            group: group.to_owned(),
            version: version.to_owned(),
            kind: kind.to_owned(),
        }
    }

    /// Returns the empty descriptor.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            group: String::new(),
            version: String::new(),
            kind: String::new(),
        }
    }

    /// Returns whether every part of the descriptor is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.group.is_empty() && self.version.is_empty() && self.kind.is_empty()
    }

    /// Returns the API group, empty for the core group.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Returns the API version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the `apiVersion` rendering of group and version.
    #[must_use]
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

#[derive(Deserialize)]
struct RawTypeDescriptor {
    #[serde(default)]
    group: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    kind: String,
}

impl TryFrom<RawTypeDescriptor> for TypeDescriptor {
    type Error = CapabilityDomainError;

    fn try_from(raw: RawTypeDescriptor) -> Result<Self, Self::Error> {
        let blank = [&raw.group, &raw.version, &raw.kind]
            .iter()
            .all(|part| part.trim().is_empty());
        if blank {
            return Ok(Self::empty());
        }
        Self::new(raw.group, raw.version, raw.kind)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}, Kind={}", self.api_version(), self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("v1", "", "v1")]
    #[case("apps/v1", "apps", "v1")]
    #[case("kubedb.com/v1alpha1", "kubedb.com", "v1alpha1")]
    fn parses_api_version(#[case] api_version: &str, #[case] group: &str, #[case] version: &str) {
        let descriptor =
            TypeDescriptor::from_api_version(api_version, "Secret").expect("valid descriptor");
        assert_eq!(descriptor.group(), group);
        assert_eq!(descriptor.version(), version);
        assert_eq!(descriptor.api_version(), api_version);
    }

    #[rstest]
    fn empty_kind_is_rejected() {
        assert_eq!(
            TypeDescriptor::new("", "v1", " "),
            Err(CapabilityDomainError::EmptyDescriptorKind)
        );
    }

    #[rstest]
    fn default_descriptor_is_empty() {
        assert!(TypeDescriptor::default().is_empty());
        assert_eq!(TypeDescriptor::default(), TypeDescriptor::empty());
    }

    #[rstest]
    fn display_mirrors_group_version_kind() {
        let descriptor = TypeDescriptor::new("apps", "v1", "Deployment").expect("valid");
        assert_eq!(descriptor.to_string(), "apps/v1, Kind=Deployment");
    }

    #[rstest]
    fn decoded_descriptor_parts_are_trimmed() {
        let descriptor: TypeDescriptor = serde_json::from_value(
            serde_json::json!({"group": " apps ", "version": "v1 ", "kind": " Deployment"}),
        )
        .expect("valid descriptor");
        assert_eq!(
            descriptor,
            TypeDescriptor::new("apps", "v1", "Deployment").expect("valid")
        );
    }

    #[rstest]
    fn blank_decoded_descriptor_is_empty() {
        let descriptor: TypeDescriptor =
            serde_json::from_value(serde_json::json!({"version": " "})).expect("empty descriptor");
        assert!(descriptor.is_empty());
    }

    #[rstest]
    #[case(serde_json::json!({"version": "v1"}))]
    #[case(serde_json::json!({"group": "apps", "kind": "Deployment"}))]
    fn partial_decoded_descriptor_is_rejected(#[case] raw: serde_json::Value) {
        assert!(serde_json::from_value::<TypeDescriptor>(raw).is_err());
    }
}
