//! Dense `f32` vector datasets backed by contiguous row-major storage.
//!
//! [`DenseMatrixProvider`] implements [`neighbourly_core::Dataset`] with row
//! indices as identifiers, so it pairs directly with the vector metrics
//! ([`neighbourly_core::Euclidean`], [`neighbourly_core::Cosine`]).

mod errors;
mod ingest;
mod provider;

pub use errors::DenseMatrixProviderError;
pub use provider::DenseMatrixProvider;
