//! Content generation
//!
//! The engine never writes prose itself. It asks a `ContentGenerator` for the
//! base utterance and only decorates what comes back.

pub mod scripted;
pub mod traits;

pub use scripted::{ScriptedConfig, ScriptedGenerator};
pub use traits::{ContentGenerator, SharedGenerator};
