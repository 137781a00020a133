//! Roundtable - turn-taking and contribution scoring for multi-persona discussions
//!
//! Given a message history, a persona catalog and a trigger table, decides
//! which persona speaks next, what discourse act the turn is, and how the
//! externally generated utterance is decorated.

pub mod config;
pub mod discussion;
pub mod engine;
pub mod error;
pub mod generator;
pub mod logging;
pub mod persona;
pub mod triggers;

pub use config::RoundtableConfig;
pub use discussion::{Discussion, DiscussionRegistry, TurnEngine, TurnOutcome, TurnRecord};
pub use error::{Error, ErrorCode, Result};
pub use generator::{ContentGenerator, ScriptedGenerator};
pub use persona::{Persona, PersonaCatalog, PersonaRole};
pub use triggers::TriggerTable;
