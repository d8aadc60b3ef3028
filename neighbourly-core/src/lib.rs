//! Neighbourly core library.
//!
//! Precomputes, for every item of a [`Dataset`], its `k` nearest other items
//! under a pluggable [`Metric`], and exposes the frozen result through
//! [`KnnNeighbourhood`] and the [`NeighbourSetPredicate`] trait.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod assemble;
mod builder;
mod cancel;
mod dataset;
mod distance;
#[cfg(feature = "cpu")]
mod distance_cache;
mod error;
mod factory;
mod memory;
mod neighbourhood;
mod query;
mod select;
mod shape;
mod store;
mod types;

#[cfg(test)]
mod property;
#[cfg(test)]
pub(crate) mod test_utils;

#[cfg(feature = "cpu")]
#[cfg_attr(docsrs, doc(cfg(feature = "cpu")))]
pub use crate::distance_cache::DistanceCacheConfig;
pub use crate::{
    builder::{ExecutionStrategy, NeighbourhoodFactoryBuilder},
    cancel::CancellationToken,
    dataset::{Dataset, InMemoryDataset, ItemId},
    distance::{
        AbsoluteDifference, Cosine, DistanceError, Euclidean, FnMetric, Metric, Norm, Vector,
        VectorKind, cosine_distance, euclidean_distance,
    },
    error::{
        DataSourceError, DataSourceErrorCode, LookupError, LookupErrorCode, NeighbourhoodError,
        NeighbourhoodErrorCode, Result, SelectionError, SelectionErrorCode,
    },
    factory::{NeighbourSetPredicateFactory, NeighbourhoodFactory},
    memory::{estimate_cache_bytes, estimate_neighbourhood_bytes, format_bytes},
    neighbourhood::{KnnNeighbourhood, NeighbourSetPredicate},
    query::DistanceQuery,
    select::KnnSelector,
    shape::{DataShape, InputRestriction, ItemKind},
    store::{DuplicateKey, FrozenStore, StoreWriter},
    types::{Neighbour, NeighbourList},
};
