//! Mode catalog
//!
//! Immutable, validated collection of modes with reverse indices for exact
//! triggers and prefix triggers. Built once at startup; a reload needs a restart.

pub mod loader;
pub mod validation;

pub use loader::{load_catalog, load_mode_records, mode_files};
pub use validation::{validate_record, CatalogError};

use crate::models::{ModeDefinition, ModeRecord};
use std::collections::HashMap;
use std::sync::Arc;

/// Validated mode catalog
#[derive(Debug, Clone, Default)]
pub struct ModeCatalog {
    /// Modes in declaration order
    modes: Vec<Arc<ModeDefinition>>,
    by_name: HashMap<String, usize>,
    exact: HashMap<String, usize>,
    /// (prefix, mode index) in declaration order; first match wins
    prefixes: Vec<(String, usize)>,
}

impl ModeCatalog {
    /// Build the catalog from validated definitions, in declaration order
    pub fn load(definitions: Vec<ModeDefinition>) -> Result<Self, CatalogError> {
        let mut catalog = ModeCatalog::default();

        for definition in definitions {
            let index = catalog.modes.len();
            if catalog.by_name.contains_key(&definition.name) {
                return Err(CatalogError::DuplicateMode(definition.name));
            }

            for trigger in &definition.exact_triggers {
                if trigger.is_empty() {
                    return Err(CatalogError::EmptyTrigger(definition.name.clone()));
                }
                if let Some(&owner) = catalog.exact.get(trigger) {
                    // repeated within this mode
                    if owner == index {
                        continue;
                    }
                    return Err(CatalogError::DuplicateTrigger {
                        trigger: trigger.clone(),
                        first: catalog.modes[owner].name.clone(),
                        second: definition.name.clone(),
                    });
                }
                catalog.exact.insert(trigger.clone(), index);
            }

            for prefix in &definition.prefix_triggers {
                if prefix.is_empty() {
                    return Err(CatalogError::EmptyPrefix(definition.name.clone()));
                }
                if let Some((_, owner)) = catalog.prefixes.iter().find(|(p, _)| p == prefix) {
                    if *owner == index {
                        continue;
                    }
                    tracing::warn!(
                        prefix = %prefix,
                        kept = %catalog.modes[*owner].name,
                        ignored = %definition.name,
                        "Prefix trigger declared twice; the first declaration wins"
                    );
                }
                catalog.prefixes.push((prefix.clone(), index));
            }

            catalog.by_name.insert(definition.name.clone(), index);
            catalog.modes.push(Arc::new(definition));
        }

        Ok(catalog)
    }

    /// Validate raw records and build the catalog
    pub fn from_records(records: Vec<ModeRecord>) -> Result<Self, CatalogError> {
        let definitions = records
            .into_iter()
            .map(validate_record)
            .collect::<Result<Vec<_>, _>>()?;
        Self::load(definitions)
    }

    /// Mode a token switches to persistently, if it is an exact trigger
    pub fn resolve_exact(&self, token: &str) -> Option<&Arc<ModeDefinition>> {
        self.exact.get(token).map(|&index| &self.modes[index])
    }

    /// First-declared prefix trigger that `token` starts with, with the matched prefix
    pub fn resolve_prefix(&self, token: &str) -> Option<(&Arc<ModeDefinition>, &str)> {
        self.prefixes
            .iter()
            .find(|(prefix, _)| token.starts_with(prefix.as_str()))
            .map(|(prefix, index)| (&self.modes[*index], prefix.as_str()))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ModeDefinition>> {
        self.by_name.get(name).map(|&index| &self.modes[index])
    }

    /// Look up a mode that must exist, such as the configured default
    pub fn require(&self, name: &str) -> Result<&Arc<ModeDefinition>, CatalogError> {
        self.get(name)
            .ok_or_else(|| CatalogError::UnknownDefaultMode {
                name: name.to_string(),
                available: self.names().into_iter().map(str::to_string).collect(),
            })
    }

    /// Mode names in declaration order
    pub fn names(&self) -> Vec<&str> {
        self.modes.iter().map(|mode| mode.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ModeDefinition>> {
        self.modes.iter()
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}
