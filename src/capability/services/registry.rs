//! Category/type registry of loaded plugins.

use super::PluginClient;
use crate::capability::{
    domain::{CapabilityCategory, TypeInfo},
    ports::PluginCallError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{info, warn};

/// How the registry treats a plugin claiming an already registered pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Reject the whole plugin; nothing it declares is registered.
    #[default]
    Fail,
    /// Skip the conflicting pair with a warning; the first registrant stays
    /// authoritative.
    Skip,
}

/// Errors returned by the plugin registry.
#[derive(Debug, Clone, Error)]
pub enum PluginRegistryError {
    /// Another plugin already handles the pair.
    #[error(
        "plugin '{rejected}' cannot register {category}/{capability_type}: already handled by '{existing}'"
    )]
    Conflict {
        /// Normalised category key.
        category: String,
        /// Normalised type key.
        capability_type: String,
        /// Plugin holding the pair.
        existing: String,
        /// Plugin that was refused.
        rejected: String,
    },

    /// No plugin handles the pair.
    #[error("no plugin handles capability {category}/{capability_type}")]
    NotFound {
        /// Normalised category key.
        category: String,
        /// Normalised type key.
        capability_type: String,
    },

    /// The plugin's declared surface could not be fetched.
    #[error(transparent)]
    Plugin(#[from] PluginCallError),

    /// The registry lock was poisoned.
    #[error("plugin registry lock poisoned: {0}")]
    Poisoned(String),
}

/// Result type for registry operations.
pub type PluginRegistryResult<T> = Result<T, PluginRegistryError>;

/// A (category, type) pair registered for a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredCapability {
    /// Category as declared by the plugin.
    pub category: CapabilityCategory,
    /// Type and versions as declared by the plugin.
    pub type_info: TypeInfo,
}

/// Snapshot of one registry entry.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    /// Normalised category key.
    pub category: String,
    /// Normalised type key.
    pub capability_type: String,
    /// Handling plugin.
    pub plugin: Arc<PluginClient>,
}

type Entries = HashMap<String, HashMap<String, Arc<PluginClient>>>;

/// Maps normalised (category, type) pairs to the plugin handling them.
///
/// At most one plugin handles a pair. The registry is owned by the host's
/// startup sequence and shared by reference with whatever needs lookups.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    policy: ConflictPolicy,
    entries: RwLock<Entries>,
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

impl PluginRegistry {
    /// Creates an empty registry using `policy` for conflicts.
    #[must_use]
    pub fn new(policy: ConflictPolicy) -> Self {
        Self {
            policy,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the conflict policy.
    #[must_use]
    pub const fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Registers every (category, type) pair `plugin` declares.
    ///
    /// Returns the pairs that were actually registered. Registering the same
    /// plugin twice is a no-op for the pairs it already holds.
    ///
    /// # Errors
    ///
    /// Returns [`PluginRegistryError::Plugin`] when the plugin's category or
    /// types cannot be fetched and [`PluginRegistryError::Conflict`] under
    /// [`ConflictPolicy::Fail`] when another plugin holds one of the pairs.
    pub fn register(
        &self,
        plugin: &Arc<PluginClient>,
    ) -> PluginRegistryResult<Vec<RegisteredCapability>> {
        let category = plugin.category()?;
        let types = plugin.types()?;
        let category_key = category.key();

        let mut entries = self
            .entries
            .write()
            .map_err(|err| PluginRegistryError::Poisoned(err.to_string()))?;

        if self.policy == ConflictPolicy::Fail
            && let Some(conflict) = find_conflict(&entries, &category_key, &types, plugin)
        {
            warn!(
                plugin = plugin.name(),
                error = %conflict,
                "rejecting plugin with conflicting capability"
            );
            return Err(conflict);
        }

        let by_type = entries.entry(category_key.clone()).or_default();
        let mut registered = Vec::with_capacity(types.len());
        for type_info in types {
            let type_key = type_info.capability_type().key();
            match by_type.get(&type_key) {
                Some(existing) if existing.id() == plugin.id() => {}
                Some(existing) => warn!(
                    plugin = plugin.name(),
                    existing = existing.name(),
                    category = %category_key,
                    capability_type = %type_key,
                    "skipping capability already handled by another plugin"
                ),
                None => {
                    info!(
                        plugin = plugin.name(),
                        category = %category_key,
                        capability_type = %type_key,
                        versions = ?type_info.versions(),
                        "registered capability"
                    );
                    by_type.insert(type_key, Arc::clone(plugin));
                    registered.push(RegisteredCapability {
                        category: category.clone(),
                        type_info,
                    });
                }
            }
        }
        Ok(registered)
    }

    /// Resolves the plugin handling `category`/`capability_type`, ignoring
    /// case.
    ///
    /// # Errors
    ///
    /// Returns [`PluginRegistryError::NotFound`] when no plugin handles the
    /// pair.
    pub fn resolve(
        &self,
        category: &str,
        capability_type: &str,
    ) -> PluginRegistryResult<Arc<PluginClient>> {
        let category_key = normalize(category);
        let type_key = normalize(capability_type);
        let entries = self
            .entries
            .read()
            .map_err(|err| PluginRegistryError::Poisoned(err.to_string()))?;
        entries
            .get(&category_key)
            .and_then(|by_type| by_type.get(&type_key))
            .cloned()
            .ok_or(PluginRegistryError::NotFound {
                category: category_key,
                capability_type: type_key,
            })
    }

    /// Removes the entry for `category`/`capability_type`, returning the
    /// plugin that handled it.
    ///
    /// # Errors
    ///
    /// Returns [`PluginRegistryError::Poisoned`] when the lock is poisoned.
    pub fn remove(
        &self,
        category: &str,
        capability_type: &str,
    ) -> PluginRegistryResult<Option<Arc<PluginClient>>> {
        let category_key = normalize(category);
        let mut entries = self
            .entries
            .write()
            .map_err(|err| PluginRegistryError::Poisoned(err.to_string()))?;
        let Some(by_type) = entries.get_mut(&category_key) else {
            return Ok(None);
        };
        let removed = by_type.remove(&normalize(capability_type));
        if by_type.is_empty() {
            entries.remove(&category_key);
        }
        Ok(removed)
    }

    /// Returns every distinct registered plugin.
    ///
    /// # Errors
    ///
    /// Returns [`PluginRegistryError::Poisoned`] when the lock is poisoned.
    pub fn plugins(&self) -> PluginRegistryResult<Vec<Arc<PluginClient>>> {
        let mut plugins: Vec<Arc<PluginClient>> = Vec::new();
        for entry in self.entries()? {
            if !plugins.iter().any(|known| known.id() == entry.plugin.id()) {
                plugins.push(entry.plugin);
            }
        }
        Ok(plugins)
    }

    /// Returns a snapshot of all entries sorted by category then type.
    ///
    /// # Errors
    ///
    /// Returns [`PluginRegistryError::Poisoned`] when the lock is poisoned.
    pub fn entries(&self) -> PluginRegistryResult<Vec<RegistryEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|err| PluginRegistryError::Poisoned(err.to_string()))?;
        let mut snapshot: Vec<RegistryEntry> = entries
            .iter()
            .flat_map(|(category, by_type)| {
                by_type.iter().map(|(capability_type, plugin)| RegistryEntry {
                    category: category.clone(),
                    capability_type: capability_type.clone(),
                    plugin: Arc::clone(plugin),
                })
            })
            .collect();
        snapshot.sort_by(|left, right| {
            (&left.category, &left.capability_type).cmp(&(&right.category, &right.capability_type))
        });
        Ok(snapshot)
    }
}

fn find_conflict(
    entries: &Entries,
    category_key: &str,
    types: &[TypeInfo],
    plugin: &PluginClient,
) -> Option<PluginRegistryError> {
    let by_type = entries.get(category_key)?;
    types.iter().find_map(|type_info| {
        let type_key = type_info.capability_type().key();
        by_type
            .get(&type_key)
            .filter(|existing| existing.id() != plugin.id())
            .map(|existing| PluginRegistryError::Conflict {
                category: category_key.to_owned(),
                capability_type: type_key.clone(),
                existing: existing.name().to_owned(),
                rejected: plugin.name().to_owned(),
            })
    })
}
