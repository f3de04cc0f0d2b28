//! Object codec between typed plugin objects and the generic wire tree.
//!
//! Host and plugin never share compiled type definitions. Typed objects are
//! therefore converted to a [`GenericObject`], a self-describing
//! field-name to value tree, before crossing the boundary. Decoding on the
//! other side needs a prototype of the expected concrete type, because the
//! tree carries no type information beyond its descriptor.

use super::{CodecError, CodecResult, TypeDescriptor};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

const API_VERSION_FIELD: &str = "apiVersion";
const KIND_FIELD: &str = "kind";
const METADATA_FIELD: &str = "metadata";
const NAME_FIELD: &str = "name";
const NAMESPACE_FIELD: &str = "namespace";

/// Transport-neutral tree representation of any object.
///
/// The descriptor lives in the conventional `apiVersion`/`kind` fields and
/// identity in `metadata.name`/`metadata.namespace`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenericObject(Map<String, Value>);

impl GenericObject {
    /// Creates an empty tree stamped with `descriptor`.
    #[must_use]
    pub fn new(descriptor: &TypeDescriptor) -> Self {
        let mut object = Self::default();
        object.set_type_descriptor(descriptor);
        object
    }

    /// Wraps an existing field map.
    #[must_use]
    pub const fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Returns the descriptor stamped on the tree, if complete and valid.
    #[must_use]
    pub fn type_descriptor(&self) -> Option<TypeDescriptor> {
        let api_version = self.0.get(API_VERSION_FIELD).and_then(Value::as_str)?;
        let kind = self.0.get(KIND_FIELD).and_then(Value::as_str)?;
        TypeDescriptor::from_api_version(api_version, kind).ok()
    }

    /// Stamps `descriptor` into the `apiVersion` and `kind` fields.
    pub fn set_type_descriptor(&mut self, descriptor: &TypeDescriptor) {
        self.0.insert(
            API_VERSION_FIELD.to_owned(),
            Value::String(descriptor.api_version()),
        );
        self.0.insert(
            KIND_FIELD.to_owned(),
            Value::String(descriptor.kind().to_owned()),
        );
    }

    /// Returns `metadata.name`.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.metadata_str(NAME_FIELD)
    }

    /// Returns `metadata.namespace`.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.metadata_str(NAMESPACE_FIELD)
    }

    /// Sets `metadata.name`.
    pub fn set_name(&mut self, name: impl Into<String>) {
        if let Some(metadata) = self.metadata_mut() {
            metadata.insert(NAME_FIELD.to_owned(), Value::String(name.into()));
        }
    }

    /// Sets `metadata.namespace`.
    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        if let Some(metadata) = self.metadata_mut() {
            metadata.insert(NAMESPACE_FIELD.to_owned(), Value::String(namespace.into()));
        }
    }

    /// Returns a top-level field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Inserts a top-level field, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Returns all top-level fields.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the tree, returning its fields.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    fn metadata_str(&self, field: &str) -> Option<&str> {
        self.0
            .get(METADATA_FIELD)
            .and_then(Value::as_object)
            .and_then(|metadata| metadata.get(field))
            .and_then(Value::as_str)
    }

    fn metadata_mut(&mut self) -> Option<&mut Map<String, Value>> {
        let entry = self
            .0
            .entry(METADATA_FIELD)
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        entry.as_object_mut()
    }
}

/// Object-safe view of any value that can cross the plugin boundary.
///
/// Implemented for every [`DomainObject`] and for [`GenericObject`], so
/// host-side generic values and plugin-side typed values flow through the
/// same dependent-resource operations.
pub trait Object: fmt::Debug + Send + Sync + Any {
    /// Returns the object's descriptor, when known.
    fn descriptor(&self) -> Option<TypeDescriptor>;

    /// Converts the object to its generic tree.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::NotAnObjectTree`] when the object does not
    /// serialise to a field map.
    fn to_generic(&self) -> CodecResult<GenericObject>;

    /// Replaces the object's contents with the decoded `generic` tree.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::PrototypeMismatch`] when the tree does not fit
    /// the object's concrete shape. The object is left unchanged.
    fn replace_from(&mut self, generic: &GenericObject) -> CodecResult<()>;

    /// Returns the object as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns the object as mutable [`Any`] for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Typed object a plugin builds and inspects.
///
/// The associated constants name the object's descriptor; `GROUP` is empty
/// for core kinds.
pub trait DomainObject:
    Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static
{
    /// API group.
    const GROUP: &'static str;
    /// API version.
    const VERSION: &'static str;
    /// Kind.
    const KIND: &'static str;

    /// Returns the descriptor assembled from the associated constants.
    #[must_use]
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::from_static(Self::GROUP, Self::VERSION, Self::KIND)
    }
}

impl<T: DomainObject> Object for T {
    fn descriptor(&self) -> Option<TypeDescriptor> {
        Some(T::type_descriptor())
    }

    fn to_generic(&self) -> CodecResult<GenericObject> {
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => Ok(GenericObject(fields)),
            Ok(other) => Err(CodecError::NotAnObjectTree {
                kind: T::KIND.to_owned(),
                reason: format!("encoded as {}", json_type_name(&other)),
            }),
            Err(err) => Err(CodecError::NotAnObjectTree {
                kind: T::KIND.to_owned(),
                reason: err.to_string(),
            }),
        }
    }

    fn replace_from(&mut self, generic: &GenericObject) -> CodecResult<()> {
        *self = decode_into::<T>(generic)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Object for GenericObject {
    fn descriptor(&self) -> Option<TypeDescriptor> {
        self.type_descriptor()
    }

    fn to_generic(&self) -> CodecResult<GenericObject> {
        Ok(self.clone())
    }

    fn replace_from(&mut self, generic: &GenericObject) -> CodecResult<()> {
        generic.clone_into(self);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Encodes `object` into a generic tree stamped with `descriptor`.
///
/// # Errors
///
/// Returns [`CodecError::MissingDescriptor`] when `descriptor` is empty, or
/// [`CodecError::NotAnObjectTree`] when the object cannot be converted.
pub fn encode(object: &dyn Object, descriptor: &TypeDescriptor) -> CodecResult<GenericObject> {
    if descriptor.is_empty() {
        return Err(CodecError::MissingDescriptor);
    }
    let mut generic = object.to_generic()?;
    generic.set_type_descriptor(descriptor);
    Ok(generic)
}

/// Decodes `generic` into `prototype`, a zero value of the expected type.
///
/// # Errors
///
/// Returns [`CodecError::PrototypeMismatch`] when the tree does not fit the
/// prototype's shape.
pub fn decode(
    generic: &GenericObject,
    mut prototype: Box<dyn Object>,
) -> CodecResult<Box<dyn Object>> {
    prototype.replace_from(generic)?;
    Ok(prototype)
}

/// Decodes `generic` directly into a statically known type.
///
/// # Errors
///
/// Returns [`CodecError::PrototypeMismatch`] when the tree does not fit `T`.
pub fn decode_into<T: DomainObject>(generic: &GenericObject) -> CodecResult<T> {
    serde_json::from_value(Value::Object(generic.0.clone())).map_err(|err| {
        CodecError::PrototypeMismatch {
            kind: T::KIND.to_owned(),
            reason: err.to_string(),
        }
    })
}

/// Downcasts a dynamic object to a concrete type.
#[must_use]
pub fn downcast_ref<T: Object>(object: &dyn Object) -> Option<&T> {
    object.as_any().downcast_ref::<T>()
}

/// Mutably downcasts a dynamic object to a concrete type.
pub fn downcast_mut<T: Object>(object: &mut dyn Object) -> Option<&mut T> {
    object.as_any_mut().downcast_mut::<T>()
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Identity metadata shared by typed plugin objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Object name.
    #[serde(default)]
    pub name: String,
    /// Object namespace.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// Object labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl ObjectMeta {
    /// Creates metadata with a name and namespace.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            labels: BTreeMap::new(),
        }
    }
}
