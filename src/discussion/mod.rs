//! Discussion runtime
//!
//! Owns per-discussion state and drives the engine one turn at a time.

pub mod registry;
pub mod session;
pub mod turn;

pub use registry::{DiscussionHandle, DiscussionRegistry};
pub use session::Discussion;
pub use turn::{TurnEngine, TurnOutcome, TurnRecord, MODERATOR};
