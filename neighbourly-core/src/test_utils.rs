//! Shared test utilities for `neighbourly-core`.

use neighbourly_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::test_runner::Config as ProptestConfig;

use crate::distance::{DistanceError, Metric};
use crate::shape::InputRestriction;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Builds a standard proptest configuration from the shared CI profile.
///
/// This keeps property suites aligned on the same `NEIGHBOURLY_PROPTEST_CASES` and
/// `NEIGHBOURLY_PBT_FORK` interpretation.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Absolute-difference [`Metric`] over scalars that records every evaluation.
///
/// Clones share the same counter, so a metric handed to a factory can still
/// be inspected afterwards.
#[derive(Clone, Debug, Default)]
pub(crate) struct CountingMetric {
    calls: Arc<AtomicUsize>,
    symmetric: bool,
}

impl CountingMetric {
    /// Creates a counting metric that reports itself as asymmetric.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Creates a counting metric that reports itself as symmetric, allowing
    /// the distance cache to engage.
    #[must_use]
    pub(crate) fn symmetric() -> Self {
        Self {
            symmetric: true,
            ..Self::default()
        }
    }

    /// Returns how many distances have been evaluated so far.
    #[must_use]
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Metric for CountingMetric {
    type Item = f32;

    fn name(&self) -> &str {
        "counting"
    }

    fn input_restriction(&self) -> InputRestriction {
        InputRestriction::of_kind(crate::shape::ItemKind::Scalar)
    }

    fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    fn distance(&self, left: &f32, right: &f32) -> Result<f32, DistanceError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok((left - right).abs())
    }
}
