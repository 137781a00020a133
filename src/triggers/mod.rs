//! Contextual trigger data. Pure data, no behaviour.
//!
//! Holds the conversation moments that make a role want to speak and the
//! phrase banks the response enhancer decorates utterances with.

pub mod table;

pub use table::{ContextualTrigger, FillerBanks, FillerType, TriggerTable};
