//! A single discussion
//!
//! Owns the history, the one authoritative `ConversationState` and the
//! discussion's own RNG. Only the turn engine replaces the state.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use uuid::Uuid;

use crate::config::StateSettings;
use crate::engine::{seeded_rng, ContributionScore, ConversationState, MessageHistoryItem};

pub struct Discussion {
    pub(crate) id: Uuid,
    pub(crate) topic: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) history: Vec<MessageHistoryItem>,
    pub(crate) state: ConversationState,
    pub(crate) rng: StdRng,
    pub(crate) turns: u64,
    pub(crate) last_scores: Vec<ContributionScore>,
}

impl Discussion {
    /// Start an empty discussion. `seed` fixes every random decision.
    pub fn new(topic: impl Into<String>, settings: &StateSettings, seed: Option<u64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
            created_at: Utc::now(),
            history: Vec::new(),
            state: ConversationState::new(settings),
            rng: seeded_rng(seed),
            turns: 0,
            last_scores: Vec::new(),
        }
    }

    /// Rebuild a discussion around an existing history.
    ///
    /// The state starts fresh; callers replay it if they need one.
    pub fn with_history(
        topic: impl Into<String>,
        history: Vec<MessageHistoryItem>,
        settings: &StateSettings,
        seed: Option<u64>,
    ) -> Self {
        let mut discussion = Self::new(topic, settings, seed);
        discussion.history = history;
        discussion
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Steer the discussion to a new topic
    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = topic.into();
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn history(&self) -> &[MessageHistoryItem] {
        &self.history
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Completed persona turns
    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Scores computed by the most recent turn attempt that reached selection
    pub fn last_scores(&self) -> &[ContributionScore] {
        &self.last_scores
    }

    /// Append a host-supplied message (human, moderator) without touching the state
    pub fn record_message(&mut self, speaker: impl Into<String>, content: impl Into<String>) -> &MessageHistoryItem {
        self.history.push(MessageHistoryItem::new(speaker, content));
        &self.history[self.history.len() - 1]
    }

    /// Apply a completed turn: new state first, then the utterance
    pub(crate) fn commit_turn(&mut self, item: MessageHistoryItem, state: ConversationState) {
        self.state = state;
        self.history.push(item);
        self.turns += 1;
    }
}

impl std::fmt::Debug for Discussion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Discussion")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("messages", &self.history.len())
            .field("turns", &self.turns)
            .field("active", &self.state.active_persona_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_discussion_is_empty() {
        let d = Discussion::new("release planning", &StateSettings::default(), Some(1));
        assert_eq!(d.topic(), "release planning");
        assert!(d.history().is_empty());
        assert_eq!(d.turns(), 0);
        assert!(d.state().active_persona_id.is_none());
    }

    #[test]
    fn test_record_message_leaves_state_alone() {
        let mut d = Discussion::new("t", &StateSettings::default(), None);
        let before = d.state().clone();
        d.record_message("human", "What about the budget?");

        assert_eq!(d.history().len(), 1);
        assert_eq!(d.history()[0].speaker, "human");
        assert_eq!(d.state(), &before);
        assert_eq!(d.turns(), 0);
    }

    #[test]
    fn test_with_history_keeps_messages_and_fresh_state() {
        let history = vec![
            MessageHistoryItem::new("ada", "Canary first."),
            MessageHistoryItem::new("victor", "Then the full rollout."),
        ];
        let before = Utc::now();
        let d = Discussion::with_history("rollout", history.clone(), &StateSettings::default(), Some(3));

        assert_eq!(d.history(), history.as_slice());
        assert_eq!(d.turns(), 0);
        assert!(d.state().active_persona_id.is_none());
        assert!(d.created_at() >= before && d.created_at() <= Utc::now());
    }

    #[test]
    fn test_set_topic() {
        let mut d = Discussion::new("budget", &StateSettings::default(), None);
        d.record_message("human", "Let's talk hiring instead.");
        d.set_topic("hiring plan");

        assert_eq!(d.topic(), "hiring plan");
        assert_eq!(d.history().len(), 1);
    }

    #[test]
    fn test_ids_are_unique() {
        let settings = StateSettings::default();
        let a = Discussion::new("t", &settings, Some(1));
        let b = Discussion::new("t", &settings, Some(1));
        assert_ne!(a.id(), b.id());
    }
}
