//! Core types for the persona catalog.
//!
//! A persona is an immutable identity record owned by the host's catalog.
//! The engine only ever reads it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ─────────────────────────────────────────────────────────────────
// Persona Role
// ─────────────────────────────────────────────────────────────────

/// Known discussion roles. Trigger tables are keyed by these.
///
/// `Generalist` is the explicit fallback for personas without a more
/// specific role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersonaRole {
    /// Keeps the discussion moving and inclusive.
    Facilitator,
    /// Frames goals and trade-offs.
    Strategist,
    /// Concerned with how things get built.
    Engineer,
    /// Questions risks and weak assumptions.
    Skeptic,
    /// Brings evidence and prior art.
    Researcher,
    /// Speaks for users and experience.
    Designer,
    /// Learner-type role; asks for clarification.
    Newcomer,
    /// Fallback role.
    Generalist,
}

impl PersonaRole {
    /// Slug used in catalog files and trigger-table section names.
    pub fn slug(&self) -> &'static str {
        match self {
            PersonaRole::Facilitator => "facilitator",
            PersonaRole::Strategist => "strategist",
            PersonaRole::Engineer => "engineer",
            PersonaRole::Skeptic => "skeptic",
            PersonaRole::Researcher => "researcher",
            PersonaRole::Designer => "designer",
            PersonaRole::Newcomer => "newcomer",
            PersonaRole::Generalist => "generalist",
        }
    }

    /// All roles in declaration order.
    pub fn all() -> &'static [PersonaRole] {
        &[
            PersonaRole::Facilitator,
            PersonaRole::Strategist,
            PersonaRole::Engineer,
            PersonaRole::Skeptic,
            PersonaRole::Researcher,
            PersonaRole::Designer,
            PersonaRole::Newcomer,
            PersonaRole::Generalist,
        ]
    }

    /// Learner-type roles lean towards asking for clarification.
    pub fn is_learner(&self) -> bool {
        matches!(self, PersonaRole::Newcomer)
    }
}

impl Default for PersonaRole {
    fn default() -> Self {
        PersonaRole::Generalist
    }
}

impl fmt::Display for PersonaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for PersonaRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        PersonaRole::all()
            .iter()
            .copied()
            .find(|role| role.slug() == normalized)
            .ok_or_else(|| Error::UnknownRole { role: s.to_string() })
    }
}

// ─────────────────────────────────────────────────────────────────
// Voice Traits
// ─────────────────────────────────────────────────────────────────

/// Speaking register of a persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tone {
    Formal,
    Casual,
    Cautious,
    Enthusiastic,
    Analytical,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Formal => "formal",
            Tone::Casual => "casual",
            Tone::Cautious => "cautious",
            Tone::Enthusiastic => "enthusiastic",
            Tone::Analytical => "analytical",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse energy level of a persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
}

impl EnergyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyLevel::Low => "low",
            EnergyLevel::Medium => "medium",
            EnergyLevel::High => "high",
        }
    }
}

impl fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────
// Persona
// ─────────────────────────────────────────────────────────────────

/// A simulated discussion participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    /// Stable identifier, unique within a catalog.
    pub id: String,

    /// Display name; defaults to the id.
    #[serde(default)]
    pub name: String,

    /// Role used to look up trigger phrases.
    #[serde(default)]
    pub role: PersonaRole,

    pub tone: Tone,

    pub energy_level: EnergyLevel,

    /// 0.0 ..= 1.0
    pub empathy_level: f64,

    /// Topical expertise keywords.
    #[serde(default)]
    pub expertise: Vec<String>,
}

impl Persona {
    /// Create a persona with an empty expertise list.
    pub fn new(
        id: impl Into<String>,
        role: PersonaRole,
        tone: Tone,
        energy_level: EnergyLevel,
        empathy_level: f64,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            role,
            tone,
            energy_level,
            empathy_level,
            expertise: Vec::new(),
        }
    }

    /// Builder-style expertise setter.
    pub fn with_expertise<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expertise = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style display name setter.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Name to show in transcripts.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
