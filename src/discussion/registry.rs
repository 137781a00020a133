//! Discussion registry
//!
//! Hosts serving many discussions keep them here. Each discussion sits behind
//! its own async mutex held for a whole turn, so turns on one discussion are
//! serialized while different discussions run in parallel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::session::Discussion;
use super::turn::{TurnEngine, TurnOutcome};
use crate::error::{Error, Result};
use crate::generator::ContentGenerator;

pub type DiscussionHandle = Arc<Mutex<Discussion>>;

pub struct DiscussionRegistry {
    engine: Arc<TurnEngine>,
    discussions: RwLock<HashMap<Uuid, DiscussionHandle>>,
    created: AtomicU64,
}

impl DiscussionRegistry {
    pub fn new(engine: Arc<TurnEngine>) -> Self {
        Self {
            engine,
            discussions: RwLock::new(HashMap::new()),
            created: AtomicU64::new(0),
        }
    }

    pub fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    /// Open a discussion and return its id.
    ///
    /// With a configured seed, each discussion gets `seed + n` so runs stay
    /// reproducible without sharing a random stream.
    pub fn create(&self, topic: impl Into<String>) -> Uuid {
        let n = self.created.fetch_add(1, Ordering::Relaxed);
        let config = self.engine.config();
        let seed = config.engine.seed.map(|s| s.wrapping_add(n));
        let discussion = Discussion::new(topic, &config.state, seed);
        let id = discussion.id();

        self.discussions.write().insert(id, Arc::new(Mutex::new(discussion)));
        info!(discussion = %id, "Discussion opened");
        id
    }

    pub fn get(&self, id: Uuid) -> Result<DiscussionHandle> {
        self.discussions
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::discussion_not_found(id))
    }

    /// Close a discussion. In-flight turns keep their handle until they finish.
    pub fn remove(&self, id: Uuid) -> Result<()> {
        self.discussions
            .write()
            .remove(&id)
            .map(|_| debug!(discussion = %id, "Discussion closed"))
            .ok_or_else(|| Error::discussion_not_found(id))
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.discussions.read().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.discussions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.discussions.read().is_empty()
    }

    /// Run one turn, holding the discussion's lock for the whole turn
    pub async fn run_turn(&self, id: Uuid, generator: &dyn ContentGenerator) -> Result<TurnOutcome> {
        let handle = self.get(id)?;
        let mut discussion = handle.lock().await;
        self.engine.run_turn(&mut discussion, generator).await
    }

    /// Append a host message under the discussion's lock
    pub async fn record_message(
        &self,
        id: Uuid,
        speaker: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<()> {
        let handle = self.get(id)?;
        let mut discussion = handle.lock().await;
        discussion.record_message(speaker, content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoundtableConfig;
    use crate::generator::{ScriptedConfig, ScriptedGenerator, SharedGenerator};
    use crate::persona::{EnergyLevel, Persona, PersonaCatalog, PersonaRole, Tone};
    use crate::triggers::TriggerTable;

    fn registry() -> DiscussionRegistry {
        let catalog = PersonaCatalog::new(vec![
            Persona::new("ada", PersonaRole::Engineer, Tone::Analytical, EnergyLevel::Medium, 0.4)
                .with_expertise(["deployment", "rollout"]),
            Persona::new("victor", PersonaRole::Strategist, Tone::Formal, EnergyLevel::High, 0.5)
                .with_expertise(["deployment", "strategy"]),
            Persona::new("iris", PersonaRole::Designer, Tone::Enthusiastic, EnergyLevel::High, 0.9)
                .with_expertise(["deployment", "users"]),
        ])
        .unwrap();
        let mut config = RoundtableConfig::default();
        config.engine.seed = Some(21);
        let engine = TurnEngine::new(catalog, TriggerTable::bundled().unwrap(), config);
        DiscussionRegistry::new(Arc::new(engine))
    }

    #[tokio::test]
    async fn test_create_get_remove() {
        let registry = registry();
        let id = registry.create("deployment strategy");

        assert_eq!(registry.len(), 1);
        assert!(registry.get(id).is_ok());
        registry.remove(id).unwrap();
        assert!(registry.is_empty());
        assert!(matches!(registry.get(id), Err(Error::DiscussionNotFound { .. })));
        assert!(registry.remove(id).is_err());
    }

    #[tokio::test]
    async fn test_ids_lists_open_discussions() {
        let registry = registry();
        assert!(registry.ids().is_empty());

        let first = registry.create("deployment strategy");
        let second = registry.create("rollout users");
        let mut ids = registry.ids();
        ids.sort();
        let mut expected = vec![first, second];
        expected.sort();
        assert_eq!(ids, expected);

        registry.remove(first).unwrap();
        assert_eq!(registry.ids(), vec![second]);
    }

    #[tokio::test]
    async fn test_unknown_discussion_turn() {
        let registry = registry();
        let err = registry
            .run_turn(Uuid::new_v4(), &ScriptedGenerator::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DiscussionNotFound { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_turns_are_serialized_per_discussion() {
        let registry = Arc::new(registry());
        let generator: SharedGenerator = Arc::new(ScriptedGenerator::with_config(ScriptedConfig {
            latency_ms: 5,
            ..Default::default()
        }));
        let first = registry.create("deployment strategy for users");
        let second = registry.create("deployment rollout strategy");

        let mut tasks = Vec::new();
        for i in 0..16 {
            let registry = Arc::clone(&registry);
            let generator = Arc::clone(&generator);
            let id = if i % 2 == 0 { first } else { second };
            tasks.push(tokio::spawn(async move {
                registry.run_turn(id, generator.as_ref()).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        for id in [first, second] {
            let handle = registry.get(id).unwrap();
            let discussion = handle.lock().await;
            // Each spoken turn added exactly one message and one contributor entry
            assert_eq!(discussion.history().len() as u64, discussion.turns());
            assert!(discussion.state().recent_contributors.len() <= 5);
            assert_eq!(
                discussion.state().recent_contributors.len(),
                discussion.turns().min(5) as usize
            );
        }
    }

    #[tokio::test]
    async fn test_record_message() {
        let registry = registry();
        let id = registry.create("deployment");
        registry.record_message(id, "human", "Hello").await.unwrap();

        let handle = registry.get(id).unwrap();
        assert_eq!(handle.lock().await.history().len(), 1);
    }
}
