//! Deterministic per-restart seeding.
//!
//! The driver owns one root seed; each restart derives its own sub-seed so
//! restarts are reproducible independently of how many of them run, and so
//! restart 3 of a 10-restart run uses the same RNG stream as restart 3 of a
//! 4-restart run.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// SplitMix64 step keyed by restart index. Plain addition or XOR of a small
/// index into the seed gives poor avalanche for nearby restart numbers;
/// this keeps sub-seeds well separated.
pub(crate) fn sub_seed(root: u64, restart: usize) -> u64 {
    let mut z = root.wrapping_add(0x9E37_79B9_7F4A_7C15u64.wrapping_mul(restart as u64 + 1));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

pub(crate) fn from_seed(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
