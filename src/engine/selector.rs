//! Candidate selector

use rand::Rng;
use tracing::debug;

use super::types::ContributionScore;
use crate::config::SelectionSettings;

/// Pick the next speaker.
///
/// Scores at or below the eligibility threshold are discarded; the speaker is
/// drawn uniformly from the top `top_k` of what remains. `None` means nobody
/// has anything to add this turn.
pub fn select_next_speaker<R: Rng + ?Sized>(
    scores: &[ContributionScore],
    settings: &SelectionSettings,
    rng: &mut R,
) -> Option<String> {
    let mut eligible: Vec<&ContributionScore> = scores
        .iter()
        .filter(|s| s.score.is_finite() && s.score > settings.eligibility_threshold)
        .collect();

    if eligible.is_empty() {
        debug!(candidates = scores.len(), "No eligible speaker");
        return None;
    }

    eligible.sort_by(|a, b| b.score.total_cmp(&a.score));
    let top = &eligible[..eligible.len().min(settings.top_k.max(1))];
    let chosen = top[rng.random_range(0..top.len())];

    debug!(
        persona = %chosen.persona_id,
        score = chosen.score,
        pool = top.len(),
        "Selected next speaker"
    );
    Some(chosen.persona_id.clone())
}
