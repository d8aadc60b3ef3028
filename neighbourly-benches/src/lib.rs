//! Benchmark support crate for neighbourly.
//!
//! Provides synthetic datasets and parameter types used by the Criterion
//! benchmarks of k-nearest-neighbour neighbourhood construction.

pub mod error;
pub mod params;
pub mod source;
