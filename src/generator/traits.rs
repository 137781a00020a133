//! Content generator trait
//!
//! The host's text source (an LLM call, a human, a script). The engine hands
//! it a persona, topic and discourse act and treats the answer as opaque.

use std::sync::Arc;

use async_trait::async_trait;

use crate::engine::DiscourseAct;
use crate::persona::Persona;

/// External content generation collaborator
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Produce the literal base utterance for one turn
    async fn generate(&self, persona: &Persona, topic: &str, act: DiscourseAct) -> anyhow::Result<String>;
}

/// Shared handle to a generator
pub type SharedGenerator = Arc<dyn ContentGenerator>;

