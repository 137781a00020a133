//! Scripted generator
//!
//! Deterministic in-process `ContentGenerator` for the simulator and tests.
//! Builds utterances from the persona's expertise and the discourse act.

use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;
use parking_lot::RwLock;

use super::ContentGenerator;
use crate::engine::DiscourseAct;
use crate::persona::Persona;

// ─────────────────────────────────────────────────────────────────
// Scripted Generator Configuration
// ─────────────────────────────────────────────────────────────────

/// Behaviour knobs for the scripted generator
#[derive(Debug, Clone, Default)]
pub struct ScriptedConfig {
    /// Simulated latency per call (ms)
    pub latency_ms: u64,

    /// Fail every call
    pub fail_always: bool,

    /// Fail only the n-th call (1-based)
    pub fail_on_call: Option<u32>,

    /// Return whitespace instead of text
    pub empty_output: bool,

    /// Fixed response text
    pub fixed_response: Option<String>,
}

// ─────────────────────────────────────────────────────────────────
// Scripted Generator
// ─────────────────────────────────────────────────────────────────

pub struct ScriptedGenerator {
    config: ScriptedConfig,
    calls: RwLock<u32>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::with_config(ScriptedConfig::default())
    }

    pub fn with_config(config: ScriptedConfig) -> Self {
        Self {
            config,
            calls: RwLock::new(0),
        }
    }

    /// Generator that always fails
    pub fn failing() -> Self {
        Self::with_config(ScriptedConfig {
            fail_always: true,
            ..Default::default()
        })
    }

    /// Number of `generate` calls so far, failed ones included
    pub fn call_count(&self) -> u32 {
        *self.calls.read()
    }

    pub fn reset_count(&self) {
        *self.calls.write() = 0;
    }

    fn compose(&self, persona: &Persona, topic: &str, act: DiscourseAct) -> String {
        if let Some(ref fixed) = self.config.fixed_response {
            return fixed.clone();
        }

        let angle = persona
            .expertise
            .first()
            .map(String::as_str)
            .unwrap_or("the basics");

        match act {
            DiscourseAct::Primary => format!("From a {} angle, {} comes down to getting {} right.", persona.role, topic, angle),
            DiscourseAct::FollowUp => format!("And to go one step further, {} also shapes how we handle {}.", angle, topic),
            DiscourseAct::Agreement => format!("That approach to {} works for me.", topic),
            DiscourseAct::Concern => format!("I'm worried we are underestimating the {} risk in {}.", angle, topic),
            DiscourseAct::Transition => format!("It might be worth connecting {} with {}.", topic, angle),
            DiscourseAct::Clarification => format!("What exactly do we mean by {} here?", topic),
        }
    }
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(&self, persona: &Persona, topic: &str, act: DiscourseAct) -> anyhow::Result<String> {
        let call = {
            let mut calls = self.calls.write();
            *calls += 1;
            *calls
        };

        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        if self.config.fail_always || self.config.fail_on_call == Some(call) {
            bail!("scripted failure on call {} for {}", call, persona.id);
        }

        if self.config.empty_output {
            return Ok("   ".to_string());
        }

        Ok(self.compose(persona, topic, act))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::{EnergyLevel, PersonaRole, Tone};

    fn persona() -> Persona {
        Persona::new("ada", PersonaRole::Engineer, Tone::Analytical, EnergyLevel::Medium, 0.4)
            .with_expertise(["deployment"])
    }

    #[tokio::test]
    async fn test_generates_per_act() {
        let generator = ScriptedGenerator::new();
        let p = persona();

        let primary = generator.generate(&p, "release cadence", DiscourseAct::Primary).await.unwrap();
        assert!(primary.contains("release cadence"));
        assert!(primary.contains("deployment"));

        let question = generator
            .generate(&p, "release cadence", DiscourseAct::Clarification)
            .await
            .unwrap();
        assert!(question.ends_with('?'));
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_fail_on_nth_call() {
        let generator = ScriptedGenerator::with_config(ScriptedConfig {
            fail_on_call: Some(2),
            ..Default::default()
        });
        let p = persona();

        assert!(generator.generate(&p, "t", DiscourseAct::Primary).await.is_ok());
        assert!(generator.generate(&p, "t", DiscourseAct::Primary).await.is_err());
        assert!(generator.generate(&p, "t", DiscourseAct::Primary).await.is_ok());
        assert_eq!(generator.call_count(), 3);

        generator.reset_count();
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fixed_response_and_failing() {
        let fixed = ScriptedGenerator::with_config(ScriptedConfig {
            fixed_response: Some("Fixed.".to_string()),
            ..Default::default()
        });
        assert_eq!(fixed.generate(&persona(), "t", DiscourseAct::Concern).await.unwrap(), "Fixed.");

        let failing = ScriptedGenerator::failing();
        let err = failing.generate(&persona(), "t", DiscourseAct::Primary).await.unwrap_err();
        assert!(err.to_string().contains("ada"));
    }
}
