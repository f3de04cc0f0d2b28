//! Domain model for capability plugins.
//!
//! Values here describe what a plugin offers (category, types, versions),
//! who asks for it (the capability owner), and which secondary resources a
//! plugin manages (type descriptors and their configuration). The object
//! codec that bridges typed plugin objects and the transport-neutral tree
//! also lives here, as it has no infrastructure dependencies.

mod category;
mod config;
mod descriptor;
mod error;
mod ids;
mod info;
mod object;
mod owner;

pub use category::{CapabilityCategory, CapabilityDeclaration, CapabilityType, TypeInfo};
pub use config::{DependentResourceConfig, ReadyStatus};
pub use descriptor::TypeDescriptor;
pub use error::{CapabilityDomainError, CodecError, CodecResult};
pub use ids::PluginId;
pub use info::{CapabilityInfo, CapabilityInfoName, PersistedCapabilityInfoData};
pub use object::{
    DomainObject, GenericObject, Object, ObjectMeta, decode, decode_into, downcast_mut,
    downcast_ref, encode,
};
pub use owner::CapabilityOwner;
