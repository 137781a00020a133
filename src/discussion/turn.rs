//! Turn engine
//!
//! Runs one full turn over a discussion, in order:
//! context, scores, selection, act, generation, enhancement, state update.
//! Nothing in the discussion's state or history changes unless generation
//! succeeded.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::session::Discussion;
use crate::config::RoundtableConfig;
use crate::engine::{
    advance_state, build_context, classify_act, enhance, score_candidates, select_next_speaker,
    ContributionScore, ConversationContext, ConversationState, DiscourseAct, MessageHistoryItem,
    ResponseEnhancement,
};
use crate::error::{Error, Result};
use crate::generator::ContentGenerator;
use crate::persona::{Persona, PersonaCatalog};
use crate::triggers::TriggerTable;

/// Speaker id used for host-inserted prompts
pub const MODERATOR: &str = "moderator";

// ─────────────────────────────────────────────────────────────────
// Turn Outcome
// ─────────────────────────────────────────────────────────────────

/// Everything decided during one spoken turn
#[derive(Debug, Clone, Serialize)]
pub struct TurnRecord {
    /// 1-based index of this spoken turn
    pub turn: u64,
    pub persona_id: String,
    pub persona_name: String,
    pub act: DiscourseAct,
    /// Decorated utterance appended to the history
    pub content: String,
    /// Generator output before decoration
    pub base_content: String,
    pub enhancement: ResponseEnhancement,
    pub context: ConversationContext,
    pub scores: Vec<ContributionScore>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum TurnOutcome {
    Spoke(TurnRecord),
    /// Nobody cleared the eligibility threshold
    Silent { scores: Vec<ContributionScore> },
}

impl TurnOutcome {
    pub fn is_silent(&self) -> bool {
        matches!(self, TurnOutcome::Silent { .. })
    }

    pub fn record(&self) -> Option<&TurnRecord> {
        match self {
            TurnOutcome::Spoke(record) => Some(record),
            TurnOutcome::Silent { .. } => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Turn Engine
// ─────────────────────────────────────────────────────────────────

/// Stateless driver shared by every discussion using the same catalog
pub struct TurnEngine {
    catalog: PersonaCatalog,
    triggers: TriggerTable,
    config: RoundtableConfig,
}

impl TurnEngine {
    /// Build an engine. Roles without trigger entries are logged, not rejected.
    pub fn new(catalog: PersonaCatalog, triggers: TriggerTable, config: RoundtableConfig) -> Self {
        let missing = catalog.missing_trigger_roles(&triggers);
        if !missing.is_empty() {
            warn!(roles = ?missing, "Personas will use the default trigger entry");
        }

        Self {
            catalog,
            triggers,
            config,
        }
    }

    pub fn catalog(&self) -> &PersonaCatalog {
        &self.catalog
    }

    pub fn triggers(&self) -> &TriggerTable {
        &self.triggers
    }

    pub fn config(&self) -> &RoundtableConfig {
        &self.config
    }

    /// Start a discussion using the configured state settings and seed
    pub fn start(&self, topic: impl Into<String>) -> Discussion {
        Discussion::new(topic, &self.config.state, self.config.engine.seed)
    }

    /// Run one turn.
    ///
    /// Generation errors and timeouts abandon the turn before any state
    /// mutation and are returned to the caller.
    #[instrument(skip_all, fields(discussion = %discussion.id))]
    pub async fn run_turn(
        &self,
        discussion: &mut Discussion,
        generator: &dyn ContentGenerator,
    ) -> Result<TurnOutcome> {
        let config = &self.config;
        let context = build_context(&discussion.history, &config.engine);
        let live_topic = live_topic(&discussion.topic, &context);

        let scores = score_candidates(
            self.catalog.personas(),
            &context,
            &live_topic,
            &self.triggers,
            &discussion.state,
            &config.scoring,
            &mut discussion.rng,
        );
        discussion.last_scores = scores.clone();

        let Some(speaker_id) = select_next_speaker(&scores, &config.selection, &mut discussion.rng) else {
            info!(candidates = scores.len(), "Nobody has anything to add this turn");
            return Ok(TurnOutcome::Silent { scores });
        };

        let persona = self
            .catalog
            .get(&speaker_id)
            .ok_or_else(|| Error::UnknownPersona {
                persona_id: speaker_id.clone(),
            })?;

        let act = classify_act(
            persona,
            &context,
            &discussion.state,
            &config.classifier,
            &config.scoring,
            &mut discussion.rng,
        );

        let base = self.generate(generator, persona, &discussion.topic, act).await?;

        let (content, enhancement) = enhance(
            persona,
            &base,
            act,
            &context,
            &discussion.state,
            &self.triggers,
            &config.enhancer,
            &mut discussion.rng,
        );

        let next_state = advance_state(
            &discussion.state,
            persona,
            act,
            context.topic_shift_detected,
            &config.state,
        );
        discussion.commit_turn(MessageHistoryItem::new(persona.id.clone(), content.clone()), next_state);

        info!(
            turn = discussion.turns,
            persona = %persona.id,
            act = %act,
            "Turn completed"
        );

        Ok(TurnOutcome::Spoke(TurnRecord {
            turn: discussion.turns,
            persona_id: persona.id.clone(),
            persona_name: persona.display_name().to_string(),
            act,
            content,
            base_content: base,
            enhancement,
            context,
            scores,
        }))
    }

    /// Call the generator under the configured timeout
    async fn generate(
        &self,
        generator: &dyn ContentGenerator,
        persona: &Persona,
        topic: &str,
        act: DiscourseAct,
    ) -> Result<String> {
        let timeout_secs = self.config.generation.timeout_secs;
        debug!(generator = generator.name(), persona = %persona.id, act = %act, "Requesting content");

        let text = match tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            generator.generate(persona, topic, act),
        )
        .await
        {
            Err(_) => {
                warn!(persona = %persona.id, timeout_secs, "Content generation timed out");
                return Err(Error::GenerationTimeout {
                    persona_id: persona.id.clone(),
                    timeout_secs,
                });
            }
            Ok(Err(e)) => {
                warn!(persona = %persona.id, error = %e, "Content generation failed");
                return Err(Error::generation_failed(&persona.id, e));
            }
            Ok(Ok(text)) => text,
        };

        if text.trim().is_empty() {
            warn!(persona = %persona.id, "Generator returned empty content");
            return Err(Error::EmptyContent {
                persona_id: persona.id.clone(),
            });
        }

        Ok(text)
    }

    /// Neutral prompt a host can insert after a silent turn.
    ///
    /// Invites the persona heard least so far, using one of its expertise
    /// keywords so the next context picks it up.
    pub fn moderator_prompt(&self, discussion: &Discussion) -> String {
        let mut heard: HashMap<&str, usize> = HashMap::new();
        for item in &discussion.history {
            *heard.entry(item.speaker.as_str()).or_default() += 1;
        }

        let quiet = self
            .catalog
            .personas()
            .iter()
            .min_by_key(|p| heard.get(p.id.as_str()).copied().unwrap_or(0));

        match quiet.and_then(|p| p.expertise.first().map(|k| (p, k))) {
            Some((persona, keyword)) => format!(
                "{}, how does {} play into {}?",
                persona.display_name(),
                keyword,
                discussion.topic
            ),
            None => format!("Does anyone see {} differently?", discussion.topic),
        }
    }

    /// Rebuild the state a recorded history would have produced.
    ///
    /// Acts are not recorded, so every replayed turn counts as primary.
    /// Messages from speakers outside the catalog leave the state alone.
    pub fn replay_state(&self, history: &[MessageHistoryItem]) -> ConversationState {
        let mut state = ConversationState::new(&self.config.state);
        for end in 1..=history.len() {
            let Some(persona) = self.catalog.get(&history[end - 1].speaker) else {
                continue;
            };
            let shifted = build_context(&history[..end], &self.config.engine).topic_shift_detected;
            state = advance_state(&state, persona, DiscourseAct::Primary, shifted, &self.config.state);
        }
        state
    }
}

/// Discussion topic plus the terms currently in play
fn live_topic(topic: &str, context: &ConversationContext) -> String {
    if context.recent_topics.is_empty() {
        topic.to_string()
    } else {
        format!("{} {}", topic, context.recent_topics.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{ScriptedConfig, ScriptedGenerator};
    use crate::persona::{EnergyLevel, PersonaRole, Tone};
    use crate::triggers::{ContextualTrigger, FillerBanks};

    fn engine(seed: u64) -> TurnEngine {
        let catalog = PersonaCatalog::new(vec![
            Persona::new("ada", PersonaRole::Engineer, Tone::Analytical, EnergyLevel::Medium, 0.4)
                .with_expertise(["deployment", "canary"]),
            Persona::new("victor", PersonaRole::Strategist, Tone::Formal, EnergyLevel::High, 0.5)
                .with_expertise(["strategy", "deployment"]),
        ])
        .unwrap();
        let triggers = TriggerTable::new(FillerBanks::default(), ContextualTrigger::default());
        let mut config = RoundtableConfig::default();
        config.engine.seed = Some(seed);
        TurnEngine::new(catalog, triggers, config)
    }

    #[tokio::test]
    async fn test_turn_appends_history_and_advances_state() {
        let engine = engine(7);
        let mut discussion = engine.start("deployment strategy");
        let generator = ScriptedGenerator::new();

        let outcome = engine.run_turn(&mut discussion, &generator).await.unwrap();
        let record = outcome.record().expect("a persona should speak");

        assert_eq!(discussion.history().len(), 1);
        assert_eq!(discussion.history()[0].speaker, record.persona_id);
        assert_eq!(discussion.history()[0].content, record.content);
        assert_eq!(discussion.state().active_persona_id.as_deref(), Some(record.persona_id.as_str()));
        assert_eq!(discussion.state().recent_contributors.len(), 1);
        assert_eq!(record.turn, 1);
        assert_eq!(record.scores.len(), 2);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_leaves_discussion_untouched() {
        let engine = engine(7);
        let mut discussion = engine.start("deployment strategy");
        discussion.record_message("human", "Where do we start with deployment?");
        let state_before = discussion.state().clone();

        let err = engine
            .run_turn(&mut discussion, &ScriptedGenerator::failing())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::GenerationFailed { .. }));
        assert!(err.is_retryable());
        assert_eq!(discussion.state(), &state_before);
        assert_eq!(discussion.history().len(), 1);
        assert_eq!(discussion.turns(), 0);
    }

    #[tokio::test]
    async fn test_empty_content_is_an_error() {
        let engine = engine(3);
        let mut discussion = engine.start("deployment strategy");
        let generator = ScriptedGenerator::with_config(ScriptedConfig {
            empty_output: true,
            ..Default::default()
        });

        let err = engine.run_turn(&mut discussion, &generator).await.unwrap_err();
        assert!(matches!(err, Error::EmptyContent { .. }));
        assert!(discussion.history().is_empty());
    }

    #[tokio::test]
    async fn test_generation_timeout() {
        let mut engine = engine(3);
        engine.config.generation.timeout_secs = 1;
        let mut discussion = engine.start("deployment strategy");
        let generator = ScriptedGenerator::with_config(ScriptedConfig {
            latency_ms: 5_000,
            ..Default::default()
        });

        let err = engine.run_turn(&mut discussion, &generator).await.unwrap_err();
        assert!(matches!(err, Error::GenerationTimeout { timeout_secs: 1, .. }));
        assert_eq!(discussion.turns(), 0);
    }

    #[tokio::test]
    async fn test_silent_when_topic_is_irrelevant() {
        let engine = engine(1);
        let mut discussion = engine.start("office plants");
        let generator = ScriptedGenerator::new();

        let outcome = engine.run_turn(&mut discussion, &generator).await.unwrap();
        assert!(outcome.is_silent());
        assert_eq!(generator.call_count(), 0);
        assert!(discussion.history().is_empty());
        assert_eq!(discussion.last_scores().len(), 2);
    }

    #[test]
    fn test_moderator_prompt_invites_quiet_persona() {
        let engine = engine(1);
        let mut discussion = engine.start("office plants");
        discussion.record_message("ada", "I like ferns.");

        let prompt = engine.moderator_prompt(&discussion);
        assert_eq!(prompt, "victor, how does strategy play into office plants?");
    }

    #[test]
    fn test_replay_state_skips_unknown_speakers() {
        let engine = engine(1);
        let history = vec![
            MessageHistoryItem::new("ada", "Canary deployment first."),
            MessageHistoryItem::new("human", "Sounds fine."),
            MessageHistoryItem::new("ada", "Then a staged deployment."),
            MessageHistoryItem::new("victor", "Strategy wise that works."),
        ];

        let state = engine.replay_state(&history);
        assert_eq!(state.active_persona_id.as_deref(), Some("victor"));
        assert_eq!(state.last_speaker_continuity_count, 0);
        let ids: Vec<&str> = state.recent_contributors.iter().map(String::as_str).collect();
        assert_eq!(ids, vec!["ada", "ada", "victor"]);
    }

    #[test]
    fn test_live_topic_includes_recent_terms() {
        let ctx = ConversationContext {
            recent_topics: vec!["canary".to_string()],
            ..Default::default()
        };
        assert_eq!(live_topic("rollout", &ctx), "rollout canary");
        assert_eq!(live_topic("rollout", &ConversationContext::default()), "rollout");
    }
}
