//! Seedable randomness
//!
//! Every random decision in the engine draws from an injected generator.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Deterministic generator for a seed, entropy-seeded otherwise
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
