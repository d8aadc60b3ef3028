//! Determinism: results do not depend on how the work was scheduled.
//!
//! Builds the same fixture through every supported path (identifier-ordered
//! and shuffled enumeration, sequential and parallel execution, with and
//! without the distance cache) and requires identical neighbourhoods.

use proptest::test_runner::{TestCaseError, TestCaseResult};

#[cfg(feature = "cpu")]
use crate::DistanceCacheConfig;
use crate::{
    AbsoluteDifference, Dataset, ExecutionStrategy, KnnNeighbourhood, NeighbourList,
    NeighbourhoodFactoryBuilder,
};

use super::types::KnnFixture;

type Snapshot = Vec<(u32, NeighbourList<u32>)>;

/// Runs the determinism property for the given fixture.
pub(super) fn run_determinism_property(fixture: &KnnFixture) -> TestCaseResult {
    let baseline = build(fixture, &fixture.dataset(), ExecutionStrategy::Sequential, false)?;

    let mut variants = vec![(
        "shuffled sequential",
        build(fixture, &fixture.shuffled_dataset(), ExecutionStrategy::Sequential, false)?,
    )];
    #[cfg(feature = "cpu")]
    {
        variants.push((
            "shuffled parallel",
            build(fixture, &fixture.shuffled_dataset(), ExecutionStrategy::Parallel, false)?,
        ));
        variants.push((
            "cached parallel",
            build(fixture, &fixture.dataset(), ExecutionStrategy::Parallel, true)?,
        ));
    }

    for (label, variant) in variants {
        if variant != baseline {
            return Err(TestCaseError::fail(format!(
                "{label} build differs from the sequential baseline ({})",
                fixture.describe()
            )));
        }
    }
    Ok(())
}

fn build<D>(
    fixture: &KnnFixture,
    dataset: &D,
    strategy: ExecutionStrategy,
    cached: bool,
) -> Result<Snapshot, TestCaseError>
where
    D: Dataset<Id = u32, Item = f32> + Sync,
{
    let builder = NeighbourhoodFactoryBuilder::new(AbsoluteDifference)
        .with_k(fixture.k_as_i64())
        .with_execution_strategy(strategy);
    #[cfg(feature = "cpu")]
    let builder = builder.with_distance_cache(cached.then(DistanceCacheConfig::default));
    #[cfg(not(feature = "cpu"))]
    let _ = cached;

    builder
        .build()
        .and_then(|factory| factory.build(dataset))
        .map(|neighbourhood| snapshot(&neighbourhood))
        .map_err(|e| TestCaseError::fail(format!("build failed: {e} ({})", fixture.describe())))
}

fn snapshot(neighbourhood: &KnnNeighbourhood<u32>) -> Snapshot {
    neighbourhood
        .iter()
        .map(|(id, list)| (*id, list.clone()))
        .collect()
}
