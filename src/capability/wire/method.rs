//! Remote method names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Methods a plugin serves. Names are fixed by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginMethod {
    /// Returns the plugin's capability category.
    GetCategory,
    /// Returns the supported types and their versions.
    GetTypes,
    /// Returns the descriptors of the dependent resources for an owner.
    GetDependentResourceTypes,
    /// Returns the concrete name of the targeted resource.
    Name,
    /// Derives a name from the supplied object.
    NameFrom,
    /// Builds the desired state of the targeted resource.
    Build,
    /// Reconciles the supplied live object with the desired state.
    Update,
    /// Evaluates readiness of the supplied live object.
    IsReady,
    /// Returns the targeted resource's declared configuration.
    GetConfig,
}

impl PluginMethod {
    /// Returns the canonical method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetCategory => "GetCategory",
            Self::GetTypes => "GetTypes",
            Self::GetDependentResourceTypes => "GetDependentResourceTypes",
            Self::Name => "Name",
            Self::NameFrom => "NameFrom",
            Self::Build => "Build",
            Self::Update => "Update",
            Self::IsReady => "IsReady",
            Self::GetConfig => "GetConfig",
        }
    }

    /// Returns whether the method must target a dependent resource.
    #[must_use]
    pub const fn requires_target(self) -> bool {
        !matches!(
            self,
            Self::GetCategory | Self::GetTypes | Self::GetDependentResourceTypes
        )
    }
}

impl fmt::Display for PluginMethod {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
