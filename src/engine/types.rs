//! Engine data types
//!
//! Everything the per-turn pipeline reads or produces. Contexts, scores and
//! enhancement records are ephemeral; `ConversationState` is the one value
//! that lives for a whole discussion.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::StateSettings;
use crate::triggers::FillerType;

// ─────────────────────────────────────────────────────────────────
// Context Labels
// ─────────────────────────────────────────────────────────────────

/// Emotional register of the last few messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallTone {
    Collaborative,
    #[default]
    Neutral,
    Tense,
}

impl OverallTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallTone::Collaborative => "collaborative",
            OverallTone::Neutral => "neutral",
            OverallTone::Tense => "tense",
        }
    }
}

impl fmt::Display for OverallTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the discussion is heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Momentum {
    Building,
    Deciding,
    Clarifying,
    #[default]
    Steady,
}

impl Momentum {
    pub fn as_str(&self) -> &'static str {
        match self {
            Momentum::Building => "building",
            Momentum::Deciding => "deciding",
            Momentum::Clarifying => "clarifying",
            Momentum::Steady => "steady",
        }
    }
}

impl fmt::Display for Momentum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicStability {
    #[default]
    Stable,
    Shifting,
}

impl TopicStability {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicStability::Stable => "stable",
            TopicStability::Shifting => "shifting",
        }
    }
}

impl fmt::Display for TopicStability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rhetorical role of an upcoming turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscourseAct {
    #[default]
    Primary,
    FollowUp,
    Agreement,
    Concern,
    Transition,
    Clarification,
}

impl DiscourseAct {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscourseAct::Primary => "primary",
            DiscourseAct::FollowUp => "follow-up",
            DiscourseAct::Agreement => "agreement",
            DiscourseAct::Concern => "concern",
            DiscourseAct::Transition => "transition",
            DiscourseAct::Clarification => "clarification",
        }
    }

    pub fn all() -> &'static [DiscourseAct] {
        &[
            DiscourseAct::Primary,
            DiscourseAct::FollowUp,
            DiscourseAct::Agreement,
            DiscourseAct::Concern,
            DiscourseAct::Transition,
            DiscourseAct::Clarification,
        ]
    }
}

impl fmt::Display for DiscourseAct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────
// History & Context
// ─────────────────────────────────────────────────────────────────

/// One prior turn, as supplied by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageHistoryItem {
    /// Persona id (or any host-chosen id for humans/moderators)
    pub speaker: String,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl MessageHistoryItem {
    pub fn new(speaker: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Rolling snapshot derived from the message history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Salient terms, most recent first
    pub recent_topics: Vec<String>,
    pub overall_tone: OverallTone,
    pub momentum: Momentum,
    pub topic_shift_detected: bool,
    /// Speaker of the newest message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_speaker: Option<String>,
}

// ─────────────────────────────────────────────────────────────────
// Conversation State
// ─────────────────────────────────────────────────────────────────

/// Running turn-taking state of one discussion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub active_persona_id: Option<String>,
    pub last_speaker_continuity_count: u32,
    /// Oldest first; bounded by `recent_capacity`
    pub recent_contributors: VecDeque<String>,
    pub recent_capacity: usize,
    pub conversation_energy: f64,
    pub needs_clarification: bool,
    pub topic_stability: TopicStability,
}

impl ConversationState {
    pub fn new(settings: &StateSettings) -> Self {
        Self {
            active_persona_id: None,
            last_speaker_continuity_count: 0,
            recent_contributors: VecDeque::with_capacity(settings.recent_contributors),
            recent_capacity: settings.recent_contributors,
            conversation_energy: settings.initial_energy.clamp(0.0, 1.0),
            needs_clarification: false,
            topic_stability: TopicStability::Stable,
        }
    }

    pub fn is_active(&self, persona_id: &str) -> bool {
        self.active_persona_id.as_deref() == Some(persona_id)
    }

    pub fn spoke_recently(&self, persona_id: &str) -> bool {
        self.recent_contributors.iter().any(|id| id == persona_id)
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new(&StateSettings::default())
    }
}

// ─────────────────────────────────────────────────────────────────
// Per-turn Records
// ─────────────────────────────────────────────────────────────────

/// A persona's desire to speak this turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionScore {
    pub persona_id: String,
    pub score: f64,
}

impl ContributionScore {
    pub fn new(persona_id: impl Into<String>, score: f64) -> Self {
        Self {
            persona_id: persona_id.into(),
            score,
        }
    }
}

/// Decoration decisions for one utterance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnhancement {
    pub act: DiscourseAct,
    pub use_transition: bool,
    pub use_filler: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filler_type: Option<FillerType>,
    pub reference_memory: bool,
    pub add_emotional_reflection: bool,
}

impl ResponseEnhancement {
    /// Record with every decoration switched off
    pub fn plain(act: DiscourseAct) -> Self {
        Self {
            act,
            ..Default::default()
        }
    }

    pub fn is_plain(&self) -> bool {
        !self.use_transition && !self.use_filler && !self.reference_memory && !self.add_emotional_reflection
    }
}
