//! Flow analyzer and session insights
//!
//! Read-only diagnostics over history and state. Nothing here feeds back
//! into speaker selection.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::lexicon;
use super::types::{ContributionScore, ConversationState, MessageHistoryItem, TopicStability};

/// Trailing messages the flow and tone metrics look at
pub const FLOW_WINDOW: usize = 5;

const LOW_DIVERSITY: f64 = 0.6;
const HIGH_DOMINATION: f64 = 0.6;
const BACK_TO_BACK_LIMIT: usize = 2;
const LOW_ENGAGEMENT: f64 = 1.5;
const TRENDING_MARGIN: f64 = 0.2;
const TRENDING_MIN_MESSAGES: usize = 2;

// ─────────────────────────────────────────────────────────────────
// Flow Analysis
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowAnalysis {
    pub flow_quality: f64,
    pub diversity_score: f64,
    pub back_to_back_count: usize,
    pub domination_score: f64,
    pub suggestions: Vec<String>,
}

impl Default for FlowAnalysis {
    fn default() -> Self {
        Self {
            flow_quality: 1.0,
            diversity_score: 1.0,
            back_to_back_count: 0,
            domination_score: 0.0,
            suggestions: Vec::new(),
        }
    }
}

/// Score the turn-taking health of the last few speakers
pub fn analyze_flow(history: &[MessageHistoryItem], scores: &[ContributionScore]) -> FlowAnalysis {
    let window = &history[history.len().saturating_sub(FLOW_WINDOW)..];
    if window.is_empty() {
        return FlowAnalysis::default();
    }

    let speakers: Vec<&str> = window.iter().map(|m| m.speaker.as_str()).collect();
    let unique: HashSet<&str> = speakers.iter().copied().collect();
    let diversity_score = unique.len() as f64 / speakers.len() as f64;

    let back_to_back_count = speakers.windows(2).filter(|w| w[0] == w[1]).count();

    let max_count = unique
        .iter()
        .map(|s| speakers.iter().filter(|x| *x == s).count())
        .max()
        .unwrap_or(0);
    let domination_score = max_count as f64 / speakers.len() as f64;

    let domination_penalty = if domination_score > HIGH_DOMINATION { 0.3 } else { 0.0 };
    let flow_quality = (1.0 - back_to_back_count as f64 * 0.2 - domination_penalty).max(0.0);

    let mut suggestions = Vec::new();
    if diversity_score < LOW_DIVERSITY {
        suggestions.push("Invite quieter personas in; only a few voices are being heard.".to_string());
    }
    if back_to_back_count >= BACK_TO_BACK_LIMIT {
        suggestions.push("Break up back-to-back turns by the same speaker.".to_string());
    }
    if domination_score > HIGH_DOMINATION {
        suggestions.push("One persona is dominating; give others room to respond.".to_string());
    }
    if !scores.is_empty() && scores.iter().all(|s| s.score < LOW_ENGAGEMENT) {
        suggestions.push("Engagement is low across the board; consider a fresh prompt or topic.".to_string());
    }

    FlowAnalysis {
        flow_quality,
        diversity_score,
        back_to_back_count,
        domination_score,
        suggestions,
    }
}

// ─────────────────────────────────────────────────────────────────
// Insights
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalTone {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl fmt::Display for EmotionalTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EmotionalTone::Positive => "positive",
            EmotionalTone::Neutral => "neutral",
            EmotionalTone::Negative => "negative",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorShare {
    pub persona_id: String,
    pub messages: usize,
    /// Share of all messages, 0-100
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationInsights {
    pub total_messages: usize,
    pub unique_participants: usize,
    /// Mean content length in characters
    pub average_message_length: f64,
    /// Most active first
    pub top_contributors: Vec<ContributorShare>,
    pub emotional_tone: EmotionalTone,
    pub trending_persona: Option<String>,
    pub conversation_energy: f64,
    pub topic_stability: TopicStability,
    pub active_persona_id: Option<String>,
    pub continuity_count: u32,
}

/// Aggregate statistics over the whole history plus the live state
pub fn get_insights(history: &[MessageHistoryItem], state: &ConversationState) -> ConversationInsights {
    let total = history.len();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for message in history {
        *counts.entry(message.speaker.as_str()).or_default() += 1;
    }

    let average_message_length = if total == 0 {
        0.0
    } else {
        history.iter().map(|m| m.content.chars().count()).sum::<usize>() as f64 / total as f64
    };

    let mut top_contributors: Vec<ContributorShare> = counts
        .iter()
        .map(|(id, n)| ContributorShare {
            persona_id: id.to_string(),
            messages: *n,
            percentage: *n as f64 * 100.0 / total as f64,
        })
        .collect();
    // BTreeMap order makes ties alphabetical
    top_contributors.sort_by(|a, b| b.messages.cmp(&a.messages));

    let window = &history[total.saturating_sub(FLOW_WINDOW)..];

    ConversationInsights {
        total_messages: total,
        unique_participants: counts.len(),
        average_message_length,
        top_contributors,
        emotional_tone: emotional_tone(window),
        trending_persona: trending_persona(window, &counts, total),
        conversation_energy: state.conversation_energy,
        topic_stability: state.topic_stability,
        active_persona_id: state.active_persona_id.clone(),
        continuity_count: state.last_speaker_continuity_count,
    }
}

fn emotional_tone(window: &[MessageHistoryItem]) -> EmotionalTone {
    let (positive, negative) = window.iter().fold((0, 0), |(pos, neg), m| {
        let text = m.content.to_lowercase();
        (
            pos + lexicon::count_markers(&text, lexicon::POSITIVE_WORDS),
            neg + lexicon::count_markers(&text, lexicon::NEGATIVE_WORDS),
        )
    });

    if positive > negative {
        EmotionalTone::Positive
    } else if negative > positive {
        EmotionalTone::Negative
    } else {
        EmotionalTone::Neutral
    }
}

/// Speaker whose recent share clearly outpaces their overall share
fn trending_persona(window: &[MessageHistoryItem], counts: &BTreeMap<&str, usize>, total: usize) -> Option<String> {
    if window.is_empty() || total == 0 {
        return None;
    }

    let mut recent: BTreeMap<&str, usize> = BTreeMap::new();
    for message in window {
        *recent.entry(message.speaker.as_str()).or_default() += 1;
    }

    let mut best: Option<(&str, f64)> = None;
    for (id, n) in recent {
        if n < TRENDING_MIN_MESSAGES {
            continue;
        }
        let recent_share = n as f64 / window.len() as f64;
        let overall_share = counts.get(id).copied().unwrap_or(0) as f64 / total as f64;
        let lift = recent_share - overall_share;
        if lift >= TRENDING_MARGIN && best.map_or(true, |(_, b)| lift > b) {
            best = Some((id, lift));
        }
    }

    best.map(|(id, _)| id.to_string())
}
