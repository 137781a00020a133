//! Turn-taking and contribution-scoring engine
//!
//! Per-turn pipeline, leaf first:
//!
//! ```text
//! history ─► build_context ─► score_candidates ─► select_next_speaker
//!                                                        │
//!            advance_state ◄─ enhance ◄─ (generator) ◄─ classify_act
//! ```
//!
//! Every step is a plain function over borrowed inputs. Randomness comes in
//! through an injected `rand::Rng`; the only state value is replaced, never
//! mutated, by `advance_state`. `analyze_flow` and `get_insights` are
//! diagnostics and never feed back into selection.

pub mod classifier;
pub mod context;
pub mod enhancer;
pub mod flow;
pub mod lexicon;
pub mod rng;
pub mod scorer;
pub mod selector;
pub mod state;
pub mod template;
pub mod types;

pub use classifier::classify_act;
pub use context::build_context;
pub use enhancer::{apply_enhancement, decide_enhancement, enhance};
pub use flow::{analyze_flow, get_insights, ContributorShare, ConversationInsights, EmotionalTone, FlowAnalysis};
pub use rng::seeded_rng;
pub use scorer::{score_breakdown, score_candidates, ScoreBreakdown};
pub use selector::select_next_speaker;
pub use state::advance_state;
pub use template::{render, TemplateVars};
pub use types::{
    ContributionScore, ConversationContext, ConversationState, DiscourseAct, MessageHistoryItem,
    Momentum, OverallTone, ResponseEnhancement, TopicStability,
};
