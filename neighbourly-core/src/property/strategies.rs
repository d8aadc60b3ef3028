//! Strategy builders for neighbourhood property-based tests.
//!
//! Generates scalar datasets with shuffled, sparse identifiers and value
//! distributions chosen to stress tie-breaking and `k` clamping.

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::types::{KnnFixture, ValueDistribution};

/// Maximum item count for generated datasets.
const MAX_ITEMS: usize = 48;
/// Identifiers are drawn from `0..ID_SPACE`, leaving gaps between them.
const ID_SPACE: u32 = 10_000;

/// Generates fixtures covering every value distribution.
pub(super) fn knn_fixture_strategy() -> impl Strategy<Value = KnnFixture> {
    (any::<ValueDistribution>(), any::<u64>()).prop_map(|(distribution, seed)| {
        let mut rng = SmallRng::seed_from_u64(seed);
        generate_fixture(distribution, &mut rng)
    })
}

/// Generates a fixture for a specific distribution.
pub(super) fn generate_fixture(distribution: ValueDistribution, rng: &mut SmallRng) -> KnnFixture {
    let items = rng.gen_range(1..=MAX_ITEMS);
    let ids = distinct_ids(items, rng);
    let values: Vec<f32> = match distribution {
        ValueDistribution::Unique => (0..items).map(|_| rng.gen_range(-1_000.0_f32..1_000.0)).collect(),
        ValueDistribution::ManyTies => (0..items)
            .map(|_| f32::from(rng.gen_range(-4_i16..=4)))
            .collect(),
        ValueDistribution::Clustered => {
            let centres: Vec<f32> = (0..rng.gen_range(1_u8..=4))
                .map(|c| f32::from(c) * 100.0)
                .collect();
            (0..items)
                .map(|_| {
                    let centre = centres[rng.gen_range(0..centres.len())];
                    centre + f32::from(rng.gen_range(0_u8..4)) * 0.25
                })
                .collect()
        }
        ValueDistribution::Constant => vec![rng.gen_range(-10.0_f32..10.0); items],
    };

    // `k` ranges from zero to beyond the item count so clamping is covered.
    let k = rng.gen_range(0..=items + 2);
    KnnFixture {
        entries: ids.into_iter().zip(values).collect(),
        k,
        distribution,
    }
}

fn distinct_ids(count: usize, rng: &mut SmallRng) -> Vec<u32> {
    let mut ids = rand::seq::index::sample(rng, ID_SPACE as usize, count)
        .into_iter()
        .map(|index| index as u32)
        .collect::<Vec<_>>();
    ids.shuffle(rng);
    ids
}
