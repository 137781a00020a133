//! Discourse-act classifier
//!
//! Priority-ordered rules, first matching condition wins. Probabilistic rules
//! fall back to `Primary` when their roll fails.

use rand::Rng;
use tracing::debug;

use super::types::{ConversationContext, ConversationState, DiscourseAct, Momentum, OverallTone};
use crate::config::{ClassifierSettings, ScoringSettings};
use crate::persona::{Persona, Tone};

/// Decide the rhetorical role of the selected persona's next turn
pub fn classify_act<R: Rng + ?Sized>(
    persona: &Persona,
    context: &ConversationContext,
    state: &ConversationState,
    settings: &ClassifierSettings,
    scoring: &ScoringSettings,
    rng: &mut R,
) -> DiscourseAct {
    let (act, probability) = if state.is_active(&persona.id)
        && state.last_speaker_continuity_count < scoring.max_continuity
        && context.momentum == Momentum::Building
    {
        (DiscourseAct::FollowUp, 1.0)
    } else if context.overall_tone == OverallTone::Collaborative
        && persona.empathy_level > settings.empathy_threshold
    {
        (DiscourseAct::Agreement, settings.agreement_probability)
    } else if persona.tone == Tone::Cautious && context.momentum == Momentum::Deciding {
        (DiscourseAct::Concern, settings.concern_probability)
    } else if context.topic_shift_detected {
        (DiscourseAct::Transition, 1.0)
    } else if context.momentum == Momentum::Clarifying || persona.role.is_learner() {
        (DiscourseAct::Clarification, settings.clarification_probability)
    } else {
        (DiscourseAct::Primary, 1.0)
    };

    let chosen = if roll(probability, rng) { act } else { DiscourseAct::Primary };
    debug!(persona = %persona.id, candidate = %act, act = %chosen, "Classified discourse act");
    chosen
}

/// True with the given probability; certain outcomes consume no randomness
pub(crate) fn roll<R: Rng + ?Sized>(probability: f64, rng: &mut R) -> bool {
    if probability >= 1.0 {
        true
    } else if probability <= 0.0 {
        false
    } else {
        rng.random_bool(probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rng::seeded_rng;
    use crate::persona::{EnergyLevel, PersonaRole};

    fn persona(tone: Tone, empathy: f64, role: PersonaRole) -> Persona {
        Persona::new("p", role, tone, EnergyLevel::Medium, empathy)
    }

    fn always() -> ClassifierSettings {
        ClassifierSettings {
            agreement_probability: 1.0,
            concern_probability: 1.0,
            clarification_probability: 1.0,
            ..Default::default()
        }
    }

    fn never() -> ClassifierSettings {
        ClassifierSettings {
            agreement_probability: 0.0,
            concern_probability: 0.0,
            clarification_probability: 0.0,
            ..Default::default()
        }
    }

    fn classify(p: &Persona, ctx: &ConversationContext, state: &ConversationState, s: &ClassifierSettings) -> DiscourseAct {
        classify_act(p, ctx, state, s, &ScoringSettings::default(), &mut seeded_rng(Some(0)))
    }

    #[test]
    fn test_follow_up_for_active_speaker_while_building() {
        let p = persona(Tone::Formal, 0.2, PersonaRole::Engineer);
        let mut state = ConversationState::default();
        state.active_persona_id = Some("p".to_string());
        state.last_speaker_continuity_count = 1;
        let ctx = ConversationContext {
            momentum: Momentum::Building,
            ..Default::default()
        };
        assert_eq!(classify(&p, &ctx, &state, &never()), DiscourseAct::FollowUp);

        state.last_speaker_continuity_count = 3;
        assert_eq!(classify(&p, &ctx, &state, &never()), DiscourseAct::Primary);
    }

    #[test]
    fn test_agreement_needs_collaboration_and_empathy() {
        let ctx = ConversationContext {
            overall_tone: OverallTone::Collaborative,
            ..Default::default()
        };
        let state = ConversationState::default();
        let warm = persona(Tone::Casual, 0.9, PersonaRole::Designer);
        let cool = persona(Tone::Casual, 0.5, PersonaRole::Designer);

        assert_eq!(classify(&warm, &ctx, &state, &always()), DiscourseAct::Agreement);
        assert_eq!(classify(&warm, &ctx, &state, &never()), DiscourseAct::Primary);
        assert_eq!(classify(&cool, &ctx, &state, &always()), DiscourseAct::Primary);
    }

    #[test]
    fn test_concern_for_cautious_when_deciding() {
        let ctx = ConversationContext {
            momentum: Momentum::Deciding,
            ..Default::default()
        };
        let p = persona(Tone::Cautious, 0.3, PersonaRole::Skeptic);
        assert_eq!(classify(&p, &ctx, &ConversationState::default(), &always()), DiscourseAct::Concern);
    }

    #[test]
    fn test_transition_on_topic_shift() {
        let ctx = ConversationContext {
            topic_shift_detected: true,
            ..Default::default()
        };
        let p = persona(Tone::Formal, 0.3, PersonaRole::Strategist);
        assert_eq!(classify(&p, &ctx, &ConversationState::default(), &never()), DiscourseAct::Transition);
    }

    #[test]
    fn test_clarification_for_learner_or_clarifying() {
        let state = ConversationState::default();
        let learner = persona(Tone::Casual, 0.5, PersonaRole::Newcomer);
        assert_eq!(
            classify(&learner, &ConversationContext::default(), &state, &always()),
            DiscourseAct::Clarification
        );

        let ctx = ConversationContext {
            momentum: Momentum::Clarifying,
            ..Default::default()
        };
        let expert = persona(Tone::Formal, 0.5, PersonaRole::Engineer);
        assert_eq!(classify(&expert, &ctx, &state, &always()), DiscourseAct::Clarification);
        assert_eq!(classify(&expert, &ctx, &state, &never()), DiscourseAct::Primary);
    }

    #[test]
    fn test_primary_otherwise() {
        let p = persona(Tone::Analytical, 0.5, PersonaRole::Researcher);
        assert_eq!(
            classify(&p, &ConversationContext::default(), &ConversationState::default(), &always()),
            DiscourseAct::Primary
        );
    }

    #[test]
    fn test_roll_extremes() {
        let mut rng = seeded_rng(Some(2));
        assert!(roll(1.0, &mut rng));
        assert!(!roll(0.0, &mut rng));
    }
}
