//! Database capability plugin used by the behaviour tests.

use caplink::capability::{
    domain::{
        CapabilityCategory, CapabilityOwner, CapabilityType, DependentResourceConfig,
        DomainObject, Object, ObjectMeta, ReadyStatus, TypeInfo, downcast_mut, downcast_ref,
    },
    ports::{DependentResource, DependentResourceError, DependentResult, PluginResource},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Credentials object the plugin creates for each database owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    /// Object identity.
    pub metadata: ObjectMeta,
    /// Plain-text entries.
    #[serde(default, rename = "stringData")]
    pub string_data: BTreeMap<String, String>,
}

impl DomainObject for Secret {
    const GROUP: &'static str = "";
    const VERSION: &'static str = "v1";
    const KIND: &'static str = "Secret";
}

struct CredentialsDependent {
    owner: CapabilityOwner,
    capability_type: String,
}

impl CredentialsDependent {
    fn resource_name(&self) -> String {
        format!("{}-credentials", self.owner.name())
    }

    fn desired_entries(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("user".to_owned(), self.owner.name().to_owned()),
            ("engine".to_owned(), self.capability_type.clone()),
        ])
    }
}

impl DependentResource for CredentialsDependent {
    fn owner(&self) -> &CapabilityOwner {
        &self.owner
    }

    fn name(&self) -> DependentResult<String> {
        Ok(self.resource_name())
    }

    fn name_from(&self, object: &dyn Object) -> DependentResult<String> {
        downcast_ref::<Secret>(object)
            .map(|secret| secret.metadata.name.clone())
            .ok_or_else(|| DependentResourceError::business("expected a Secret"))
    }

    fn fetch(&self) -> DependentResult<Option<Box<dyn Object>>> {
        Ok(None)
    }

    fn build(&self, prototype_only: bool) -> DependentResult<Box<dyn Object>> {
        if prototype_only {
            return Ok(Box::new(Secret::default()));
        }
        Ok(Box::new(Secret {
            metadata: ObjectMeta::new(self.resource_name(), self.owner.namespace()),
            string_data: self.desired_entries(),
        }))
    }

    fn update(&self, current: &mut dyn Object) -> DependentResult<bool> {
        let secret = downcast_mut::<Secret>(current)
            .ok_or_else(|| DependentResourceError::business("expected a Secret"))?;
        let desired = self.desired_entries();
        if secret.string_data == desired {
            return Ok(false);
        }
        secret.string_data = desired;
        Ok(true)
    }

    fn is_ready(&self, _current: &dyn Object) -> DependentResult<ReadyStatus> {
        Ok(ReadyStatus::ready())
    }

    fn config(&self) -> DependentResult<DependentResourceConfig> {
        Ok(DependentResourceConfig::new(Secret::type_descriptor()))
    }
}

/// Plugin resource providing one database engine.
pub struct DatabasePlugin {
    category: CapabilityCategory,
    type_info: TypeInfo,
}

impl DatabasePlugin {
    /// Creates a plugin advertising `capability_type` with `versions`.
    ///
    /// # Errors
    ///
    /// Returns an error when the category, type, or a version is blank.
    pub fn new(
        category: &str,
        capability_type: &str,
        versions: &[String],
    ) -> Result<Self, eyre::Report> {
        let type_info =
            TypeInfo::new(CapabilityType::new(capability_type)?).with_versions(versions.to_vec())?;
        Ok(Self {
            category: CapabilityCategory::new(category)?,
            type_info,
        })
    }
}

impl PluginResource for DatabasePlugin {
    fn supported_category(&self) -> CapabilityCategory {
        self.category.clone()
    }

    fn supported_types(&self) -> Vec<TypeInfo> {
        vec![self.type_info.clone()]
    }

    fn dependent_resources_with(
        &self,
        owner: &CapabilityOwner,
    ) -> Vec<Box<dyn DependentResource>> {
        let credentials: Box<dyn DependentResource> = Box::new(CredentialsDependent {
            owner: owner.clone(),
            capability_type: self.type_info.capability_type().as_str().to_owned(),
        });
        vec![credentials]
    }
}
