//! Oracle equivalence: built neighbour lists match the brute-force oracle.

use proptest::test_runner::{TestCaseError, TestCaseResult};

use crate::{AbsoluteDifference, ExecutionStrategy, NeighbourhoodFactoryBuilder};

use super::oracle::brute_force_knn;
use super::types::KnnFixture;

/// Runs the oracle equivalence property for the given fixture.
///
/// Identifiers and distances must match exactly; both sides evaluate the
/// same `f32` expression, so no tolerance is needed.
pub(super) fn run_oracle_equivalence_property(fixture: &KnnFixture) -> TestCaseResult {
    let neighbourhood = NeighbourhoodFactoryBuilder::new(AbsoluteDifference)
        .with_k(fixture.k_as_i64())
        .with_execution_strategy(ExecutionStrategy::Sequential)
        .build()
        .and_then(|factory| factory.build(&fixture.dataset()))
        .map_err(|e| TestCaseError::fail(format!("build failed: {e} ({})", fixture.describe())))?;

    let oracle = brute_force_knn(&fixture.entries, fixture.k);
    if neighbourhood.len() != oracle.len() {
        return Err(TestCaseError::fail(format!(
            "item count mismatch: built={}, oracle={} ({})",
            neighbourhood.len(),
            oracle.len(),
            fixture.describe(),
        )));
    }

    for (id, expected) in &oracle {
        let actual: Vec<(u32, f32)> = neighbourhood
            .neighbours_of(id)
            .map_err(|e| TestCaseError::fail(format!("lookup of {id} failed: {e}")))?
            .iter()
            .map(|n| (n.id, n.distance))
            .collect();
        if &actual != expected {
            return Err(TestCaseError::fail(format!(
                "neighbours of {id} differ: built={actual:?}, oracle={expected:?} ({})",
                fixture.describe(),
            )));
        }
    }
    Ok(())
}
