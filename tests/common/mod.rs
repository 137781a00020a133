//! Common test utilities and fixtures
//!
//! Shared paths and builders for the integration tests

#![allow(dead_code)]

use std::path::PathBuf;

use roundtable::engine::MessageHistoryItem;
use roundtable::persona::{EnergyLevel, Persona, PersonaRole, Tone};

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

pub fn history_fixture() -> PathBuf {
    fixture_path("history.json")
}

pub fn personas_fixture() -> PathBuf {
    fixture_path("personas.toml")
}

/// Build a history from (speaker, content) pairs
pub fn history(lines: &[(&str, &str)]) -> Vec<MessageHistoryItem> {
    lines
        .iter()
        .map(|(speaker, content)| MessageHistoryItem::new(*speaker, *content))
        .collect()
}

/// Formal, low-empathy persona with no expertise
pub fn bystander(id: &str) -> Persona {
    Persona::new(id, PersonaRole::Generalist, Tone::Formal, EnergyLevel::Low, 0.2)
}

/// Persona whose expertise covers deployment strategy
pub fn deployment_expert(id: &str) -> Persona {
    Persona::new(id, PersonaRole::Engineer, Tone::Formal, EnergyLevel::High, 0.2)
        .with_expertise(["deployment", "strategy"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
    }

    #[test]
    fn test_fixture_files_exist() {
        for path in [
            valid_config_fixture(),
            invalid_config_fixture(),
            history_fixture(),
            personas_fixture(),
        ] {
            assert!(path.exists(), "missing fixture {}", path.display());
        }
    }
}
