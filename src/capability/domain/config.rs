//! Declared configuration and readiness of dependent resources.

use super::TypeDescriptor;
use serde::{Deserialize, Serialize};

/// Configuration a dependent resource declares about itself.
///
/// The descriptor identifies the resource kind; the flags tell the
/// controller how to treat instances of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentResourceConfig {
    descriptor: TypeDescriptor,
    #[serde(default = "enabled")]
    owned: bool,
    #[serde(default = "enabled")]
    created: bool,
    #[serde(default = "enabled")]
    updated: bool,
    #[serde(default = "enabled")]
    watched: bool,
    #[serde(default)]
    checked_for_readiness: bool,
}

const fn enabled() -> bool {
    true
}

impl DependentResourceConfig {
    /// Creates the default configuration for `descriptor`: owned, created,
    /// updated, and watched, but not checked for readiness.
    #[must_use]
    pub const fn new(descriptor: TypeDescriptor) -> Self {
        Self {
            descriptor,
            owned: true,
            created: true,
            updated: true,
            watched: true,
            checked_for_readiness: false,
        }
    }

    /// Sets whether the controller owns instances of this resource.
    #[must_use]
    pub const fn with_owned(mut self, owned: bool) -> Self {
        self.owned = owned;
        self
    }

    /// Sets whether the controller creates missing instances.
    #[must_use]
    pub const fn with_created(mut self, created: bool) -> Self {
        self.created = created;
        self
    }

    /// Sets whether the controller updates existing instances.
    #[must_use]
    pub const fn with_updated(mut self, updated: bool) -> Self {
        self.updated = updated;
        self
    }

    /// Sets whether the controller watches instances for changes.
    #[must_use]
    pub const fn with_watched(mut self, watched: bool) -> Self {
        self.watched = watched;
        self
    }

    /// Sets whether readiness of instances gates the owner's readiness.
    #[must_use]
    pub const fn with_checked_for_readiness(mut self, checked: bool) -> Self {
        self.checked_for_readiness = checked;
        self
    }

    /// Returns the resource descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Returns whether instances are owned by the capability owner.
    #[must_use]
    pub const fn owned(&self) -> bool {
        self.owned
    }

    /// Returns whether missing instances are created.
    #[must_use]
    pub const fn created(&self) -> bool {
        self.created
    }

    /// Returns whether existing instances are updated.
    #[must_use]
    pub const fn updated(&self) -> bool {
        self.updated
    }

    /// Returns whether instances are watched.
    #[must_use]
    pub const fn watched(&self) -> bool {
        self.watched
    }

    /// Returns whether instance readiness is checked.
    #[must_use]
    pub const fn checked_for_readiness(&self) -> bool {
        self.checked_for_readiness
    }
}

/// Readiness verdict for a live dependent resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyStatus {
    ready: bool,
    #[serde(default)]
    message: String,
}

impl ReadyStatus {
    /// Creates a ready verdict.
    #[must_use]
    pub fn ready() -> Self {
        Self {
            ready: true,
            message: String::new(),
        }
    }

    /// Creates a not-ready verdict with an explanation.
    #[must_use]
    pub fn pending(message: impl Into<String>) -> Self {
        Self {
            ready: false,
            message: message.into(),
        }
    }

    /// Returns whether the resource is ready.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Returns the human-readable explanation.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
