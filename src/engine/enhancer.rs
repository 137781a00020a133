//! Response enhancer
//!
//! Wraps generated base content with stylistic decorations:
//!
//! ```text
//! [filler] [transition] base. [memory reference] [emotional reflection]
//! ```
//!
//! `decide_enhancement` rolls the flags, `apply_enhancement` composes text
//! from the trigger banks. A record with every flag off returns the base
//! content byte-for-byte.

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{debug, trace};

use super::classifier::roll;
use super::template::{render, TemplateVars};
use super::types::{ConversationContext, ConversationState, DiscourseAct, ResponseEnhancement};
use crate::config::EnhancerSettings;
use crate::persona::{EnergyLevel, Persona, Tone};
use crate::triggers::{ContextualTrigger, FillerType, TriggerTable};

const NO_SPEAKER: &str = "everyone";
const NO_TOPIC: &str = "this";

// ─────────────────────────────────────────────────────────────────
// Decisions
// ─────────────────────────────────────────────────────────────────

/// Roll the decoration flags for one utterance
pub fn decide_enhancement<R: Rng + ?Sized>(
    persona: &Persona,
    act: DiscourseAct,
    context: &ConversationContext,
    settings: &EnhancerSettings,
    rng: &mut R,
) -> ResponseEnhancement {
    let use_transition = act != DiscourseAct::Primary || context.topic_shift_detected;
    let use_filler = persona.tone == Tone::Casual || persona.energy_level == EnergyLevel::Low;
    let filler_type = use_filler.then(|| filler_type(persona, act));

    let reference_memory = context.recent_topics.len() >= settings.min_topics_for_memory
        && roll(settings.memory_probability, rng);
    let add_emotional_reflection = persona.empathy_level > settings.empathy_threshold
        && roll(settings.emotional_probability, rng);

    ResponseEnhancement {
        act,
        use_transition,
        use_filler,
        filler_type,
        reference_memory,
        add_emotional_reflection,
    }
}

fn filler_type(persona: &Persona, act: DiscourseAct) -> FillerType {
    match act {
        DiscourseAct::Agreement => FillerType::Agreement,
        DiscourseAct::Transition => FillerType::Transition,
        _ if persona.tone == Tone::Cautious => FillerType::Hesitation,
        _ if persona.energy_level == EnergyLevel::Low => FillerType::Thinking,
        _ => FillerType::Casual,
    }
}

// ─────────────────────────────────────────────────────────────────
// Composition
// ─────────────────────────────────────────────────────────────────

/// Compose the decorated utterance for a decided enhancement.
///
/// Empty phrase banks silently drop their decoration.
pub fn apply_enhancement<R: Rng + ?Sized>(
    persona: &Persona,
    base: &str,
    enhancement: &ResponseEnhancement,
    context: &ConversationContext,
    state: &ConversationState,
    triggers: &TriggerTable,
    rng: &mut R,
) -> String {
    if enhancement.is_plain() {
        return base.to_string();
    }

    let trigger = triggers.for_role(persona.role);
    let speaker = previous_speaker(persona, context, state);
    let topic = context.recent_topics.first().map(String::as_str).unwrap_or(NO_TOPIC);
    let vars = TemplateVars::new(speaker, topic);

    let mut prefix: Vec<String> = Vec::new();
    if let Some(filler) = enhancement.filler_type.filter(|_| enhancement.use_filler) {
        if let Some(phrase) = triggers.fillers().bank(filler).choose(rng) {
            prefix.push(render(phrase, &vars));
        }
    }
    if enhancement.use_transition {
        if let Some(phrase) = transition_bank(trigger, enhancement.act).choose(rng) {
            prefix.push(render(phrase, &vars));
        }
    }

    let mut suffix: Vec<String> = Vec::new();
    if enhancement.reference_memory {
        // Memory callbacks point at an older topic than the current one
        let older = context.recent_topics.last().map(String::as_str).unwrap_or(NO_TOPIC);
        if let Some(phrase) = trigger.memory_reference.choose(rng) {
            suffix.push(close_sentence(&render(phrase, &TemplateVars::new(speaker, older))));
        }
    }
    if enhancement.add_emotional_reflection {
        if let Some(phrase) = trigger.emotional_reflection.choose(rng) {
            suffix.push(close_sentence(&render(phrase, &vars)));
        }
    }

    if prefix.is_empty() && suffix.is_empty() {
        trace!(persona = %persona.id, "No phrases available, content left plain");
        return base.to_string();
    }

    let body = base.trim();
    let mut parts = prefix;
    parts.push(if suffix.is_empty() { body.to_string() } else { close_sentence(body) });
    parts.extend(suffix);

    parts.retain(|p| !p.is_empty());
    join_phrases(&parts)
}

/// Decide and apply in one step
#[allow(clippy::too_many_arguments)]
pub fn enhance<R: Rng + ?Sized>(
    persona: &Persona,
    base: &str,
    act: DiscourseAct,
    context: &ConversationContext,
    state: &ConversationState,
    triggers: &TriggerTable,
    settings: &EnhancerSettings,
    rng: &mut R,
) -> (String, ResponseEnhancement) {
    let enhancement = decide_enhancement(persona, act, context, settings, rng);
    let text = apply_enhancement(persona, base, &enhancement, context, state, triggers, rng);
    debug!(
        persona = %persona.id,
        act = %act,
        transition = enhancement.use_transition,
        filler = ?enhancement.filler_type,
        memory = enhancement.reference_memory,
        emotional = enhancement.add_emotional_reflection,
        "Enhanced response"
    );
    (text, enhancement)
}

/// Phrase bank used for the transition prefix of an act
fn transition_bank(trigger: &ContextualTrigger, act: DiscourseAct) -> &[String] {
    match act {
        DiscourseAct::FollowUp => &trigger.build_on,
        DiscourseAct::Agreement if trigger.agreement.is_empty() => &trigger.support,
        DiscourseAct::Agreement => &trigger.agreement,
        DiscourseAct::Concern | DiscourseAct::Clarification => &trigger.question,
        DiscourseAct::Transition | DiscourseAct::Primary => &trigger.transition,
    }
}

/// Most recent speaker other than the persona itself
fn previous_speaker<'a>(
    persona: &Persona,
    context: &'a ConversationContext,
    state: &'a ConversationState,
) -> &'a str {
    context
        .last_speaker
        .as_deref()
        .filter(|id| *id != persona.id)
        .or_else(|| state.active_persona_id.as_deref().filter(|id| *id != persona.id))
        .unwrap_or(NO_SPEAKER)
}

/// Join phrases with spaces, continuing a sentence in lowercase after a
/// phrase that ends in a comma
fn join_phrases(parts: &[String]) -> String {
    let mut joined = String::new();
    for part in parts {
        if joined.is_empty() {
            joined.push_str(part);
            continue;
        }
        let continues = joined.ends_with(',');
        joined.push(' ');
        if continues {
            joined.push_str(&lowercase_first(part));
        } else {
            joined.push_str(part);
        }
    }
    joined
}

/// Lowercase the leading letter unless the first word is "I" or an acronym
fn lowercase_first(text: &str) -> String {
    let first_word = text.split_whitespace().next().unwrap_or_default();
    let keep = first_word == "I"
        || first_word.starts_with("I'")
        || first_word.chars().nth(1).is_some_and(char::is_uppercase);

    let mut chars = text.chars();
    match chars.next() {
        Some(first) if !keep => first.to_lowercase().chain(chars).collect(),
        _ => text.to_string(),
    }
}

fn close_sentence(text: &str) -> String {
    let text = text.trim();
    match text.chars().last() {
        None => String::new(),
        Some('.' | '!' | '?') => text.to_string(),
        Some(_) => format!("{}.", text.trim_end_matches(',')),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StateSettings;
    use crate::engine::rng::seeded_rng;
    use crate::persona::PersonaRole;
    use crate::triggers::FillerBanks;

    fn table() -> TriggerTable {
        let fillers = FillerBanks {
            agreement: vec!["Oh, absolutely.".to_string()],
            thinking: vec!["Hmm, okay.".to_string()],
            hesitation: vec!["Well...".to_string()],
            casual: vec!["So,".to_string()],
            transition: vec!["Alright.".to_string()],
        };
        let trigger = ContextualTrigger {
            build_on: vec!["Building on {speaker}'s point,".to_string()],
            question: vec!["Are we sure about {topic}?".to_string()],
            transition: vec!["Zooming out,".to_string()],
            agreement: vec!["I'm with {speaker}.".to_string()],
            memory_reference: vec!["Earlier we covered {topic}".to_string()],
            emotional_reflection: vec!["I appreciate this group".to_string()],
            ..Default::default()
        };
        TriggerTable::new(fillers, ContextualTrigger::default()).with_role(PersonaRole::Strategist, trigger)
    }

    fn strategist(tone: Tone, energy: EnergyLevel, empathy: f64) -> Persona {
        Persona::new("victor", PersonaRole::Strategist, tone, energy, empathy)
    }

    fn context() -> ConversationContext {
        ConversationContext {
            recent_topics: vec!["rollout".into(), "budget".into(), "hiring".into()],
            last_speaker: Some("ada".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_all_flags_off_returns_base_unchanged() {
        let p = strategist(Tone::Formal, EnergyLevel::Medium, 0.4);
        let base = "  We should stage the rollout ";
        let text = apply_enhancement(
            &p,
            base,
            &ResponseEnhancement::plain(DiscourseAct::Concern),
            &context(),
            &ConversationState::default(),
            &table(),
            &mut seeded_rng(Some(1)),
        );
        assert_eq!(text, base);
    }

    #[test]
    fn test_decide_flags() {
        let settings = EnhancerSettings {
            memory_probability: 1.0,
            emotional_probability: 1.0,
            ..Default::default()
        };
        let mut rng = seeded_rng(Some(4));

        let casual = strategist(Tone::Casual, EnergyLevel::High, 0.9);
        let e = decide_enhancement(&casual, DiscourseAct::Agreement, &context(), &settings, &mut rng);
        assert!(e.use_transition && e.use_filler);
        assert_eq!(e.filler_type, Some(FillerType::Agreement));
        assert!(e.reference_memory && e.add_emotional_reflection);

        let formal = strategist(Tone::Formal, EnergyLevel::Medium, 0.2);
        let e = decide_enhancement(&formal, DiscourseAct::Primary, &ConversationContext::default(), &settings, &mut rng);
        assert!(e.is_plain());
        assert_eq!(e.filler_type, None);
    }

    #[test]
    fn test_filler_type_priority() {
        let cautious_low = strategist(Tone::Cautious, EnergyLevel::Low, 0.2);
        assert_eq!(filler_type(&cautious_low, DiscourseAct::Primary), FillerType::Hesitation);
        assert_eq!(filler_type(&cautious_low, DiscourseAct::Transition), FillerType::Transition);

        let low = strategist(Tone::Formal, EnergyLevel::Low, 0.2);
        assert_eq!(filler_type(&low, DiscourseAct::Concern), FillerType::Thinking);

        let casual = strategist(Tone::Casual, EnergyLevel::High, 0.2);
        assert_eq!(filler_type(&casual, DiscourseAct::FollowUp), FillerType::Casual);
    }

    #[test]
    fn test_full_decoration_order() {
        let p = strategist(Tone::Casual, EnergyLevel::High, 0.9);
        let enhancement = ResponseEnhancement {
            act: DiscourseAct::FollowUp,
            use_transition: true,
            use_filler: true,
            filler_type: Some(FillerType::Casual),
            reference_memory: true,
            add_emotional_reflection: true,
        };
        let text = apply_enhancement(
            &p,
            "we stage it by region",
            &enhancement,
            &context(),
            &ConversationState::new(&StateSettings::default()),
            &table(),
            &mut seeded_rng(Some(7)),
        );
        assert_eq!(
            text,
            "So, building on ada's point, we stage it by region. Earlier we covered hiring. I appreciate this group."
        );
    }

    #[test]
    fn test_speaker_falls_back_to_everyone() {
        let p = strategist(Tone::Formal, EnergyLevel::Medium, 0.2);
        let ctx = ConversationContext {
            last_speaker: Some("victor".to_string()),
            ..Default::default()
        };
        let enhancement = ResponseEnhancement {
            use_transition: true,
            ..ResponseEnhancement::plain(DiscourseAct::Agreement)
        };
        let text = apply_enhancement(
            &p,
            "Ship it.",
            &enhancement,
            &ctx,
            &ConversationState::default(),
            &table(),
            &mut seeded_rng(Some(1)),
        );
        assert_eq!(text, "I'm with everyone. Ship it.");
    }

    #[test]
    fn test_missing_role_uses_default_entry() {
        let p = Persona::new("sam", PersonaRole::Newcomer, Tone::Formal, EnergyLevel::Medium, 0.2);
        let enhancement = ResponseEnhancement {
            use_transition: true,
            ..ResponseEnhancement::plain(DiscourseAct::Clarification)
        };
        let text = apply_enhancement(
            &p,
            "What is a canary?",
            &enhancement,
            &context(),
            &ConversationState::default(),
            &table(),
            &mut seeded_rng(Some(1)),
        );
        assert_eq!(text, "What is a canary?");
    }

    #[test]
    fn test_filler_comma_continues_sentence() {
        let p = strategist(Tone::Casual, EnergyLevel::High, 0.9);
        let enhancement = ResponseEnhancement {
            use_transition: true,
            use_filler: true,
            filler_type: Some(FillerType::Casual),
            ..ResponseEnhancement::plain(DiscourseAct::Transition)
        };
        let text = apply_enhancement(
            &p,
            "Let's look at cost.",
            &enhancement,
            &context(),
            &ConversationState::default(),
            &table(),
            &mut seeded_rng(Some(2)),
        );
        assert_eq!(text, "So, zooming out, let's look at cost.");

        let agreeing = ResponseEnhancement {
            act: DiscourseAct::Agreement,
            ..enhancement
        };
        let text = apply_enhancement(
            &p,
            "Ship it.",
            &agreeing,
            &context(),
            &ConversationState::default(),
            &table(),
            &mut seeded_rng(Some(2)),
        );
        assert_eq!(text, "So, I'm with ada. Ship it.");
    }

    #[test]
    fn test_lowercase_first() {
        assert_eq!(lowercase_first("From a facilitator angle"), "from a facilitator angle");
        assert_eq!(lowercase_first("I think so"), "I think so");
        assert_eq!(lowercase_first("API limits first"), "API limits first");
        assert_eq!(lowercase_first(""), "");
    }

    #[test]
    fn test_close_sentence() {
        assert_eq!(close_sentence("done"), "done.");
        assert_eq!(close_sentence("done?"), "done?");
        assert_eq!(close_sentence("Building on that,"), "Building on that.");
        assert_eq!(close_sentence("  "), "");
    }
}
