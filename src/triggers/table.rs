//! Trigger table: static per-role conversation moments and phrase banks.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::persona::registry::BUNDLED_TRIGGERS;
use crate::persona::PersonaRole;

// ─────────────────────────────────────────────────────────────────
// Contextual Trigger
// ─────────────────────────────────────────────────────────────────

/// Conversation moments and phrase banks for one role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextualTrigger {
    /// Phrases describing when this role wants to speak.
    pub conversation_moments: Vec<String>,
    pub build_on: Vec<String>,
    pub question: Vec<String>,
    pub support: Vec<String>,
    pub transition: Vec<String>,
    pub agreement: Vec<String>,
    pub memory_reference: Vec<String>,
    pub emotional_reflection: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────
// Fillers
// ─────────────────────────────────────────────────────────────────

/// Which filler bank a decorated utterance opens with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillerType {
    Agreement,
    Transition,
    Hesitation,
    Thinking,
    Casual,
}

impl FillerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillerType::Agreement => "agreement",
            FillerType::Transition => "transition",
            FillerType::Hesitation => "hesitation",
            FillerType::Thinking => "thinking",
            FillerType::Casual => "casual",
        }
    }
}

impl fmt::Display for FillerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role-independent filler phrases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillerBanks {
    pub agreement: Vec<String>,
    pub transition: Vec<String>,
    pub hesitation: Vec<String>,
    pub thinking: Vec<String>,
    pub casual: Vec<String>,
}

impl FillerBanks {
    pub fn bank(&self, filler: FillerType) -> &[String] {
        match filler {
            FillerType::Agreement => &self.agreement,
            FillerType::Transition => &self.transition,
            FillerType::Hesitation => &self.hesitation,
            FillerType::Thinking => &self.thinking,
            FillerType::Casual => &self.casual,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Trigger Table
// ─────────────────────────────────────────────────────────────────

/// On-disk layout; role sections are keyed by free text until validated.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTriggerTable {
    fillers: FillerBanks,
    default: ContextualTrigger,
    roles: BTreeMap<String, ContextualTrigger>,
}

/// Per-role trigger entries with an explicit fallback entry.
#[derive(Debug, Clone, Default)]
pub struct TriggerTable {
    fillers: FillerBanks,
    default: ContextualTrigger,
    roles: HashMap<PersonaRole, ContextualTrigger>,
}

impl TriggerTable {
    /// Build a table in memory.
    pub fn new(fillers: FillerBanks, default: ContextualTrigger) -> Self {
        Self {
            fillers,
            default,
            roles: HashMap::new(),
        }
    }

    /// Builder-style role entry.
    pub fn with_role(mut self, role: PersonaRole, trigger: ContextualTrigger) -> Self {
        self.roles.insert(role, trigger);
        self
    }

    /// Parse a table from TOML. Unknown role sections are rejected.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawTriggerTable = toml::from_str(content)
            .map_err(|e| Error::trigger_table(format!("failed to parse TOML: {}", e)))?;

        let mut roles = HashMap::with_capacity(raw.roles.len());
        for (name, trigger) in raw.roles {
            let role: PersonaRole = name
                .parse()
                .map_err(|_| Error::trigger_table(format!("unknown role section [roles.{}]", name)))?;
            roles.insert(role, trigger);
        }

        Ok(Self {
            fillers: raw.fillers,
            default: raw.default,
            roles,
        })
    }

    /// Load a table file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading trigger table");
        let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let table = Self::from_toml_str(&content)?;
        info!(path = %path.display(), roles = table.roles.len(), "Trigger table loaded");
        Ok(table)
    }

    /// Table shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(BUNDLED_TRIGGERS)
    }

    /// Dedicated entry for a role, if any.
    pub fn get(&self, role: PersonaRole) -> Option<&ContextualTrigger> {
        self.roles.get(&role)
    }

    /// Entry for a role, falling back to the default entry.
    pub fn for_role(&self, role: PersonaRole) -> &ContextualTrigger {
        match self.roles.get(&role) {
            Some(trigger) => trigger,
            None => {
                trace!(role = %role, "Using default trigger entry");
                &self.default
            }
        }
    }

    pub fn fillers(&self) -> &FillerBanks {
        &self.fillers
    }

    pub fn default_entry(&self) -> &ContextualTrigger {
        &self.default
    }

    /// Roles that have a dedicated entry.
    pub fn roles(&self) -> impl Iterator<Item = &PersonaRole> {
        self.roles.keys()
    }
}
