//! Reply envelope and method-specific response bodies.

use crate::capability::domain::GenericObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Outcome of a remote call as sent back by the plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "body", rename_all = "snake_case")]
pub enum PluginResponse {
    /// The method ran; the body is its method-specific result.
    Ok(Value),
    /// The method could not run or its logic failed.
    Fault(RemoteFault),
}

/// Classification of a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// Host and plugin disagree on the protocol: unknown target, missing
    /// owner or argument, undecodable argument.
    Protocol,
    /// The plugin's own logic failed for this owner.
    Business,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol => formatter.write_str("protocol"),
            Self::Business => formatter.write_str("business"),
        }
    }
}

/// Failure reported by the plugin side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFault {
    kind: FaultKind,
    message: String,
}

impl RemoteFault {
    /// Creates a protocol-violation fault.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self {
            kind: FaultKind::Protocol,
            message: message.into(),
        }
    }

    /// Creates a business-logic fault.
    #[must_use]
    pub fn business(message: impl Into<String>) -> Self {
        Self {
            kind: FaultKind::Business,
            message: message.into(),
        }
    }

    /// Returns the fault classification.
    #[must_use]
    pub const fn kind(&self) -> FaultKind {
        self.kind
    }

    /// Returns the diagnostic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Body of a `Build` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildResponse {
    /// Desired state of the targeted resource.
    pub built: GenericObject,
}

/// Body of an `Update` reply.
///
/// Business errors travel inside the body rather than as a fault so that the
/// caller receives them as an ordinary result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateResponse {
    /// Whether the live object had to change.
    pub needs_update: bool,
    /// Error raised by the plugin's update logic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Live object after the plugin applied its changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<GenericObject>,
}
