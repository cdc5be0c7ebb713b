//! Seed derivation for replication and per-cell random streams
//!
//! Every random draw of a run comes from a `ChaCha8Rng` whose seed is mixed
//! from the run seed with SplitMix64. Streams never depend on worker
//! scheduling, so parallel and sequential runs produce identical results.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// SplitMix64 finaliser
#[inline]
pub const fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed of stream `index` under `base`
#[inline]
pub const fn derive_seed(base: u64, index: u64) -> u64 {
    splitmix64(base ^ splitmix64(index))
}

/// Seed of a replication (1-based index) under the run seed
pub fn replication_seed(seed: u64, replication: usize) -> u64 {
    derive_seed(seed, replication as u64)
}

/// Main RNG of a replication: weather scenario and random ignitions
pub fn replication_rng(replication_seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(replication_seed)
}

/// RNG of one cell's fire behaviour evaluation in one global period
pub fn cell_rng(replication_seed: u64, period: u32, cell: usize) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_seed(
        derive_seed(replication_seed, u64::from(period)),
        cell as u64,
    ))
}
