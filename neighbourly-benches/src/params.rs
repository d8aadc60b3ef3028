//! Benchmark parameter types.
//!
//! Groups related benchmark parameters so that Criterion identifiers stay
//! consistent across groups.

use std::fmt;

use neighbourly_core::ExecutionStrategy;

/// Parameters for one neighbourhood build benchmark.
#[derive(Clone, Copy, Debug)]
pub struct NeighbourhoodBenchParams {
    /// Number of points in the dataset.
    pub point_count: usize,
    /// Neighbours kept per point.
    pub k: usize,
    /// Execution strategy requested from the factory.
    pub strategy: ExecutionStrategy,
}

impl fmt::Display for NeighbourhoodBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = match self.strategy {
            ExecutionStrategy::Auto => "auto",
            ExecutionStrategy::Sequential => "seq",
            ExecutionStrategy::Parallel => "par",
        };
        write!(f, "n={},k={},{strategy}", self.point_count, self.k)
    }
}
