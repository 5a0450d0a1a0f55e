//! Benchmark profiles for the Morpho coupling engine.
//!
//! - [`reference_tissue`]: 50x50 honeycomb (2500 cells) with jittered areas
//! - [`stress_tissue`]: 160x160 honeycomb (25 600 cells)
//! - [`reference_config`]: run configuration used with both

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use morpho_core::{AgentId, HEXAGONAL_PACKING_AREA};
use morpho_engine::SimulationConfig;
use morpho_test_utils::{hex_patch, StaticTissue};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Relative spread of the jittered areas around the packing area.
pub const AREA_JITTER: f64 = 0.2;

/// 2500-cell honeycomb whose areas are spread by [`AREA_JITTER`].
pub fn reference_tissue(seed: u64) -> StaticTissue {
    jittered_patch(50, 50, seed)
}

/// 25 600-cell honeycomb for stress runs.
pub fn stress_tissue(seed: u64) -> StaticTissue {
    jittered_patch(160, 160, seed)
}

/// A `rows x cols` honeycomb with areas drawn uniformly from
/// `HEXAGONAL_PACKING_AREA * [1 - AREA_JITTER, 1 + AREA_JITTER)`.
///
/// Deterministic in `seed`.
pub fn jittered_patch(rows: u32, cols: u32, seed: u64) -> StaticTissue {
    let mut tissue = hex_patch(rows, cols);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for id in 0..rows * cols {
        let scale = rng.random_range(1.0 - AREA_JITTER..1.0 + AREA_JITTER);
        tissue.set_area(AgentId(id), HEXAGONAL_PACKING_AREA * scale);
    }
    tissue
}

/// Configuration for benchmark runs: one simulated time unit, every
/// tenth tick exported.
pub fn reference_config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        seed,
        end_time: 1.0,
        sampling_interval: 10,
        ..Default::default()
    }
}
