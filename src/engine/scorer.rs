//! Contribution scorer
//!
//! ```text
//! score = topical relevance   (0 ..= max_topical_relevance)
//!       + moment match       (0 ..= max_moment_match)
//!       + tone alignment     (-0.5 ..= 1.0)
//!       + continuity term    (+continuity_bonus | -monopoly_penalty | 0)
//!       + jitter             (uniform 0 .. max_jitter)
//! ```

use rand::Rng;
use tracing::debug;

use super::types::{ContributionScore, ConversationContext, ConversationState, Momentum, OverallTone};
use crate::config::ScoringSettings;
use crate::persona::{Persona, Tone};
use crate::triggers::TriggerTable;

/// Per-term breakdown of one persona's score
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub topical: f64,
    pub moment: f64,
    pub tone: f64,
    pub continuity: f64,
    pub jitter: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.topical + self.moment + self.tone + self.continuity + self.jitter
    }
}

/// Score every candidate persona for the next turn.
///
/// Returns exactly one score per input persona, in input order.
pub fn score_candidates<R: Rng + ?Sized>(
    personas: &[Persona],
    context: &ConversationContext,
    topic: &str,
    triggers: &TriggerTable,
    state: &ConversationState,
    settings: &ScoringSettings,
    rng: &mut R,
) -> Vec<ContributionScore> {
    personas
        .iter()
        .map(|persona| {
            let breakdown = score_breakdown(persona, context, topic, triggers, state, settings, rng);
            debug!(
                persona = %persona.id,
                topical = breakdown.topical,
                moment = breakdown.moment,
                tone = breakdown.tone,
                continuity = breakdown.continuity,
                jitter = breakdown.jitter,
                score = breakdown.total(),
                "Scored candidate"
            );
            ContributionScore::new(persona.id.clone(), breakdown.total())
        })
        .collect()
}

/// Compute every term of a single persona's score
pub fn score_breakdown<R: Rng + ?Sized>(
    persona: &Persona,
    context: &ConversationContext,
    topic: &str,
    triggers: &TriggerTable,
    state: &ConversationState,
    settings: &ScoringSettings,
    rng: &mut R,
) -> ScoreBreakdown {
    let moments = &triggers.for_role(persona.role).conversation_moments;

    ScoreBreakdown {
        topical: topical_relevance(&persona.expertise, topic, settings),
        moment: moment_match(moments, context, settings),
        tone: tone_alignment(persona.tone, persona.empathy_level, context.overall_tone),
        continuity: continuity_term(&persona.id, context, state, settings),
        jitter: jitter(settings.max_jitter, rng),
    }
}

/// Matched expertise keywords times the keyword weight, capped
pub fn topical_relevance(expertise: &[String], topic: &str, settings: &ScoringSettings) -> f64 {
    let topic = topic.to_lowercase();
    let matched = expertise
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty() && topic.contains(k.as_str()))
        .count();

    (matched as f64 * settings.keyword_weight).min(settings.max_topical_relevance)
}

/// Moments sharing a word with the live context descriptors, weighted and capped
pub fn moment_match(moments: &[String], context: &ConversationContext, settings: &ScoringSettings) -> f64 {
    if moments.is_empty() {
        return 0.0;
    }

    let mut descriptors: Vec<&str> = vec![context.momentum.as_str(), context.overall_tone.as_str()];
    if context.topic_shift_detected {
        descriptors.push("shift");
    }
    descriptors.extend(context.recent_topics.iter().map(String::as_str));

    let matched = moments
        .iter()
        .filter(|moment| {
            moment
                .to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| !word.is_empty() && descriptors.contains(&word))
        })
        .count();

    (matched as f64 * settings.moment_weight).min(settings.max_moment_match)
}

/// How well the persona's voice fits the room
pub fn tone_alignment(tone: Tone, empathy: f64, overall: OverallTone) -> f64 {
    let value = match overall {
        OverallTone::Collaborative => {
            let voice = match tone {
                Tone::Casual | Tone::Enthusiastic => 0.5,
                Tone::Formal | Tone::Analytical => 0.25,
                Tone::Cautious => 0.0,
            };
            voice + 0.5 * empathy
        }
        OverallTone::Tense => {
            let voice = match tone {
                Tone::Cautious => 0.75,
                Tone::Formal | Tone::Analytical => 0.25,
                Tone::Casual | Tone::Enthusiastic => -0.25,
            };
            voice + 0.25 * empathy
        }
        OverallTone::Neutral => {
            let voice = match tone {
                Tone::Formal | Tone::Analytical => 0.25,
                _ => 0.0,
            };
            voice + 0.25 * empathy
        }
    };

    value.clamp(-0.5, 1.0)
}

/// Encourage short follow-up runs, discourage monopolizing
pub fn continuity_term(
    persona_id: &str,
    context: &ConversationContext,
    state: &ConversationState,
    settings: &ScoringSettings,
) -> f64 {
    if state.is_active(persona_id)
        && state.last_speaker_continuity_count < settings.max_continuity
        && context.momentum == Momentum::Building
    {
        settings.continuity_bonus
    } else if state.spoke_recently(persona_id) {
        -settings.monopoly_penalty
    } else {
        0.0
    }
}

fn jitter<R: Rng + ?Sized>(max: f64, rng: &mut R) -> f64 {
    if max > 0.0 {
        rng.random_range(0.0..max)
    } else {
        0.0
    }
}
