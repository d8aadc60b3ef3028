//! Benchmark setup error type.
//!
//! Aggregates the errors that may arise while preparing benchmark data so
//! setup functions can propagate failures with `?` instead of `.expect()`.

use crate::source::SyntheticError;
use neighbourly_core::NeighbourhoodError;
use neighbourly_providers_text::TextProviderError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic data generation failed.
    #[error("synthetic source generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// Factory configuration or a warm-up build failed.
    #[error("neighbourhood construction failed: {0}")]
    Neighbourhood(#[from] NeighbourhoodError),
    /// The synthetic text corpus could not be wrapped in a provider.
    #[error("text provider construction failed: {0}")]
    Text(#[from] TextProviderError),
}
