//! Persona catalog: load and validate the set of personas a discussion draws from.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::triggers::TriggerTable;

use super::types::{Persona, PersonaRole};

/// Validated, read-only list of personas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaCatalog {
    personas: Vec<Persona>,
}

impl PersonaCatalog {
    /// Build a catalog from personas already in memory.
    pub fn new(personas: Vec<Persona>) -> Result<Self> {
        let catalog = Self {
            personas: personas.into_iter().map(fill_name).collect(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a catalog from TOML (`[[personas]]` tables).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: PersonaCatalog = toml::from_str(content).map_err(|e| Error::CatalogParse {
            message: e.to_string(),
            source: Some(e),
        })?;
        Self::new(raw.personas)
    }

    /// Load a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading persona catalog");
        let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let catalog = Self::from_toml_str(&content)?;
        info!(path = %path.display(), personas = catalog.len(), "Persona catalog loaded");
        Ok(catalog)
    }

    /// Catalog shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(super::registry::BUNDLED_PERSONAS)
    }

    fn validate(&self) -> Result<()> {
        if self.personas.is_empty() {
            return Err(Error::catalog_invalid("catalog contains no personas"));
        }

        let mut seen = HashSet::new();
        for persona in &self.personas {
            if persona.id.trim().is_empty() {
                return Err(Error::catalog_invalid("persona id must not be empty"));
            }
            if !seen.insert(persona.id.as_str()) {
                return Err(Error::persona_invalid(
                    &persona.id,
                    format!("duplicate persona id '{}'", persona.id),
                ));
            }
            if !(0.0..=1.0).contains(&persona.empathy_level) {
                return Err(Error::persona_invalid(
                    &persona.id,
                    format!(
                        "empathy_level {} for '{}' must be between 0 and 1",
                        persona.empathy_level, persona.id
                    ),
                ));
            }
        }

        Ok(())
    }

    /// Roles used by this catalog that have no dedicated trigger entry.
    ///
    /// Those personas still work (they fall back to the default entry) but
    /// lose their role-specific phrases and moments.
    pub fn missing_trigger_roles(&self, triggers: &TriggerTable) -> Vec<PersonaRole> {
        let mut missing: Vec<PersonaRole> = self
            .personas
            .iter()
            .map(|p| p.role)
            .filter(|role| triggers.get(*role).is_none())
            .collect();
        missing.sort();
        missing.dedup();

        for role in &missing {
            warn!(role = %role, "No trigger entry for role, default phrases will be used");
        }
        missing
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

fn fill_name(mut persona: Persona) -> Persona {
    if persona.name.trim().is_empty() {
        persona.name = persona.id.clone();
    }
    persona
}
