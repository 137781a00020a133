//! Conversation state updater
//!
//! The only producer of new `ConversationState` values. Called once per
//! completed turn, after content generation succeeded.

use tracing::trace;

use super::types::{ConversationState, DiscourseAct, TopicStability};
use crate::config::StateSettings;
use crate::persona::{EnergyLevel, Persona};

/// Advance the state past a completed turn by `speaker`
pub fn advance_state(
    state: &ConversationState,
    speaker: &Persona,
    act: DiscourseAct,
    topic_shifted: bool,
    settings: &StateSettings,
) -> ConversationState {
    let mut next = state.clone();

    if state.is_active(&speaker.id) {
        next.last_speaker_continuity_count = state.last_speaker_continuity_count.saturating_add(1);
    } else {
        next.last_speaker_continuity_count = 0;
        next.active_persona_id = Some(speaker.id.clone());
    }

    let capacity = next.recent_capacity.max(1);
    next.recent_contributors.push_back(speaker.id.clone());
    while next.recent_contributors.len() > capacity {
        next.recent_contributors.pop_front();
    }

    let step = if speaker.energy_level == EnergyLevel::High {
        settings.energy_step
    } else {
        -settings.energy_step
    };
    next.conversation_energy = (state.conversation_energy + step).clamp(0.0, 1.0);

    next.needs_clarification = act == DiscourseAct::Clarification;
    next.topic_stability = if topic_shifted {
        TopicStability::Shifting
    } else {
        TopicStability::Stable
    };

    trace!(
        active = ?next.active_persona_id,
        continuity = next.last_speaker_continuity_count,
        energy = next.conversation_energy,
        stability = %next.topic_stability,
        "State advanced"
    );
    next
}
