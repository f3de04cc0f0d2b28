//! Request envelope carried by every remote call.

use crate::capability::domain::{CapabilityOwner, GenericObject, TypeDescriptor};
use serde::{Deserialize, Serialize};

/// Envelope binding a call to an owner, a target resource, and an argument.
///
/// A missing target means the call addresses the plugin as a whole rather
/// than one of its dependent resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    owner: Option<CapabilityOwner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<TypeDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arg: Option<GenericObject>,
}

impl PluginRequest {
    /// Creates an empty envelope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the envelope to an owner.
    #[must_use]
    pub fn with_owner(mut self, owner: CapabilityOwner) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Targets a dependent resource. Empty descriptors leave the envelope
    /// untargeted.
    #[must_use]
    pub fn with_target(mut self, target: TypeDescriptor) -> Self {
        self.target = (!target.is_empty()).then_some(target);
        self
    }

    /// Attaches the encoded argument.
    #[must_use]
    pub fn with_arg(mut self, arg: GenericObject) -> Self {
        self.arg = Some(arg);
        self
    }

    /// Returns the bound owner.
    #[must_use]
    pub const fn owner(&self) -> Option<&CapabilityOwner> {
        self.owner.as_ref()
    }

    /// Returns the targeted descriptor.
    #[must_use]
    pub const fn target(&self) -> Option<&TypeDescriptor> {
        self.target.as_ref()
    }

    /// Returns the encoded argument.
    #[must_use]
    pub const fn arg(&self) -> Option<&GenericObject> {
        self.arg.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn empty_envelope_serialises_to_empty_object() {
        let value = serde_json::to_value(PluginRequest::new()).expect("serialisable");
        assert_eq!(value, json!({}));
    }

    #[rstest]
    fn empty_target_is_dropped() {
        let request = PluginRequest::new().with_target(TypeDescriptor::empty());
        assert!(request.target().is_none());
    }

    #[rstest]
    fn targeted_envelope_survives_the_wire() {
        let target = TypeDescriptor::new("", "v1", "Secret").expect("valid descriptor");
        let request = PluginRequest::new()
            .with_target(target.clone())
            .with_arg(GenericObject::new(&target));

        let text = serde_json::to_string(&request).expect("serialisable");
        let parsed: PluginRequest = serde_json::from_str(&text).expect("parsable");

        assert_eq!(parsed, request);
        assert_eq!(parsed.target(), Some(&target));
    }
}
