//! Structural invariants of every built neighbourhood.
//!
//! Checked independently of the oracle: coverage of every identifier, list
//! length `min(k, n - 1)`, self exclusion, distinct members and strictly
//! ascending `(distance, id)` order.

use std::collections::BTreeSet;

use proptest::test_runner::{TestCaseError, TestCaseResult};

use crate::{AbsoluteDifference, NeighbourhoodFactoryBuilder};

use super::types::KnnFixture;

/// Runs the structural invariants property for the given fixture.
pub(super) fn run_structural_invariants_property(fixture: &KnnFixture) -> TestCaseResult {
    let neighbourhood = NeighbourhoodFactoryBuilder::new(AbsoluteDifference)
        .with_k(fixture.k_as_i64())
        .build()
        .and_then(|factory| factory.build(&fixture.shuffled_dataset()))
        .map_err(|e| TestCaseError::fail(format!("build failed: {e} ({})", fixture.describe())))?;

    let ids: BTreeSet<u32> = fixture.entries.iter().map(|(id, _)| *id).collect();
    let covered: BTreeSet<u32> = neighbourhood.iter().map(|(id, _)| *id).collect();
    if covered != ids {
        return Err(TestCaseError::fail(format!(
            "covered identifiers differ from the dataset ({})",
            fixture.describe()
        )));
    }

    let expected_len = fixture.k.min(ids.len() - 1);
    for (id, list) in neighbourhood.iter() {
        if list.len() != expected_len {
            return Err(TestCaseError::fail(format!(
                "list of {id} has {} entries, expected {expected_len} ({})",
                list.len(),
                fixture.describe(),
            )));
        }
        if list.ids().any(|member| member == *id) {
            return Err(TestCaseError::fail(format!(
                "{id} lists itself ({})",
                fixture.describe()
            )));
        }
        if let Some(member) = list.ids().find(|member| !ids.contains(member)) {
            return Err(TestCaseError::fail(format!(
                "{id} lists unknown identifier {member} ({})",
                fixture.describe()
            )));
        }
        let ordered = list.as_slice().windows(2).all(|pair| pair[0] < pair[1]);
        if !ordered {
            return Err(TestCaseError::fail(format!(
                "list of {id} is not strictly ascending: {:?} ({})",
                list.as_slice(),
                fixture.describe(),
            )));
        }
    }
    Ok(())
}
