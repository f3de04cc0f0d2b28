//! Error types for capability domain validation and object conversion.

use thiserror::Error;

/// Errors returned while constructing capability domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityDomainError {
    /// The capability category is empty after trimming.
    #[error("capability category must not be empty")]
    EmptyCategory,

    /// The capability type is empty after trimming.
    #[error("capability type must not be empty")]
    EmptyType,

    /// A declared version string is empty after trimming.
    #[error("version of capability type '{0}' must not be empty")]
    EmptyVersion(String),

    /// The type descriptor kind is empty after trimming.
    #[error("type descriptor kind must not be empty")]
    EmptyDescriptorKind,

    /// The type descriptor version is empty after trimming.
    #[error("type descriptor version must not be empty")]
    EmptyDescriptorVersion,

    /// The capability owner name is empty after trimming.
    #[error("capability owner name must not be empty")]
    EmptyOwnerName,

    /// An aggregate was created without any plugin resources.
    #[error("cannot aggregate an empty set of plugin resources")]
    NoAggregatedResources,

    /// Plugin resources providing different categories were aggregated.
    #[error("can only aggregate plugin resources providing the same category, got '{expected}' and '{found}'")]
    MixedCategories {
        /// Category of the first aggregated resource.
        expected: String,
        /// Category of the offending resource.
        found: String,
    },
}

/// Errors returned by the object codec.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The object did not serialise to a field-name to value tree.
    #[error("object of kind '{kind}' does not encode to a field tree: {reason}")]
    NotAnObjectTree {
        /// Kind of the offending object.
        kind: String,
        /// Serialiser diagnostic.
        reason: String,
    },

    /// The generic tree does not fit the prototype's concrete shape.
    #[error("cannot decode generic object into '{kind}': {reason}")]
    PrototypeMismatch {
        /// Kind expected by the prototype.
        kind: String,
        /// Deserialiser diagnostic.
        reason: String,
    },

    /// Neither the object nor the call carried a type descriptor.
    #[error("object has no type descriptor and none was supplied")]
    MissingDescriptor,
}

/// Result type for object codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
