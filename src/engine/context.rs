//! Conversation context builder
//!
//! Derives the rolling snapshot (topics, tone, momentum, topic shift) from
//! a trailing window of the message history. Pure function of its input.

use std::collections::HashSet;

use tracing::trace;

use super::lexicon::{self, salient_terms};
use super::types::{ConversationContext, MessageHistoryItem, Momentum, OverallTone};
use crate::config::EngineSettings;

/// Messages the tone heuristic reads
const TONE_WINDOW: usize = 3;

/// Messages the question heuristic reads
const QUESTION_WINDOW: usize = 3;

/// Build the context for the next turn.
///
/// Empty history yields the neutral default context.
pub fn build_context(history: &[MessageHistoryItem], settings: &EngineSettings) -> ConversationContext {
    if history.is_empty() {
        return ConversationContext::default();
    }

    let start = history.len().saturating_sub(settings.history_window.max(1));
    let window = &history[start..];
    let lowered: Vec<String> = window.iter().map(|m| m.content.to_lowercase()).collect();

    let ctx = ConversationContext {
        recent_topics: recent_topics(window, settings.topic_window, settings.max_recent_topics),
        overall_tone: overall_tone(tail(&lowered, TONE_WINDOW)),
        momentum: momentum(tail(&lowered, settings.topic_window)),
        topic_shift_detected: topic_shift(window, settings.topic_window, settings.topic_shift_overlap),
        last_speaker: window.last().map(|m| m.speaker.clone()),
    };

    trace!(
        topics = ?ctx.recent_topics,
        tone = %ctx.overall_tone,
        momentum = %ctx.momentum,
        shift = ctx.topic_shift_detected,
        "Context built"
    );
    ctx
}

fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// Salient terms of the last `k` messages, newest first, deduplicated
fn recent_topics(window: &[MessageHistoryItem], k: usize, cap: usize) -> Vec<String> {
    let mut topics: Vec<String> = Vec::with_capacity(cap);
    for message in window.iter().rev().take(k) {
        for term in salient_terms(&message.content) {
            if topics.len() >= cap {
                return topics;
            }
            if !topics.contains(&term) {
                topics.push(term);
            }
        }
    }
    topics
}

fn overall_tone(messages: &[String]) -> OverallTone {
    let collaborative: usize = messages
        .iter()
        .map(|m| lexicon::count_markers(m, lexicon::COLLABORATIVE_MARKERS))
        .sum();
    let tense: usize = messages
        .iter()
        .map(|m| lexicon::count_markers(m, lexicon::TENSE_MARKERS))
        .sum();

    if collaborative > tense {
        OverallTone::Collaborative
    } else if tense > collaborative {
        OverallTone::Tense
    } else {
        OverallTone::Neutral
    }
}

/// Repeated questions, then proposal/counter-proposal, then building language
fn momentum(messages: &[String]) -> Momentum {
    let questions = tail(messages, QUESTION_WINDOW)
        .iter()
        .filter(|m| m.contains('?'))
        .count();
    if questions >= 2 {
        return Momentum::Clarifying;
    }

    let proposal = messages.iter().any(|m| lexicon::contains_any(m, lexicon::PROPOSAL_MARKERS));
    let counter = messages.iter().any(|m| lexicon::contains_any(m, lexicon::COUNTER_MARKERS));
    if proposal && counter {
        return Momentum::Deciding;
    }

    let building = messages
        .iter()
        .filter(|m| lexicon::contains_any(m, lexicon::BUILDING_MARKERS))
        .count();
    if messages.len() >= 3 && building >= 2 {
        return Momentum::Building;
    }

    Momentum::Steady
}

/// Newest message's terms against the terms of the `k` messages before it
fn topic_shift(window: &[MessageHistoryItem], k: usize, min_overlap: f64) -> bool {
    let Some((newest, earlier)) = window.split_last() else {
        return false;
    };

    let newest_terms: HashSet<String> = salient_terms(&newest.content).into_iter().collect();
    let earlier_terms: HashSet<String> = tail(earlier, k)
        .iter()
        .flat_map(|m| salient_terms(&m.content))
        .collect();

    if newest_terms.is_empty() || earlier_terms.is_empty() {
        return false;
    }

    let shared = newest_terms.intersection(&earlier_terms).count();
    (shared as f64 / newest_terms.len() as f64) < min_overlap
}
