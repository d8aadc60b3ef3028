//! Neighbourhood factory: validates a dataset against the metric and drives
//! the assembler.

use std::{num::NonZeroUsize, sync::Arc};

use tracing::{info, instrument, warn};

#[cfg(feature = "cpu")]
use crate::distance_cache::{DistanceCache, DistanceCacheConfig};
use crate::{
    Result,
    assemble::{NeighbourMap, NeighbourhoodAssembler},
    builder::ExecutionStrategy,
    cancel::CancellationToken,
    dataset::{Dataset, ItemId},
    distance::Metric,
    error::NeighbourhoodError,
    memory::{estimate_neighbourhood_bytes, format_bytes},
    neighbourhood::{KnnNeighbourhood, NeighbourSetPredicate},
    query::DistanceQuery,
    shape::InputRestriction,
    store::FrozenStore,
};

/// Builds a neighbour-set predicate for a dataset.
///
/// Downstream orchestration depends on this trait so it can request a
/// neighbourhood without knowing the metric or the selection strategy.
pub trait NeighbourSetPredicateFactory<D: Dataset> {
    /// Predicate produced for `D`.
    type Predicate: NeighbourSetPredicate<D::Id>;

    /// Precomputes the relation over `dataset`.
    ///
    /// # Errors
    /// Returns a [`NeighbourhoodError`] when the dataset is incompatible or
    /// construction fails.
    fn instantiate(&self, dataset: &D) -> Result<Self::Predicate>;

    /// Declares which datasets [`NeighbourSetPredicateFactory::instantiate`]
    /// accepts.
    fn input_restriction(&self) -> InputRestriction;
}

#[derive(Debug, Clone)]
pub(crate) struct FactorySettings {
    pub(crate) k: usize,
    pub(crate) execution_strategy: ExecutionStrategy,
    pub(crate) max_threads: Option<NonZeroUsize>,
    #[cfg(feature = "cpu")]
    pub(crate) distance_cache: Option<DistanceCacheConfig>,
    pub(crate) max_bytes: Option<u64>,
    pub(crate) cancellation: CancellationToken,
}

/// Validated configuration that turns datasets into [`KnnNeighbourhood`]s.
///
/// The factory holds no per-dataset state: every call to
/// [`NeighbourhoodFactory::build`] yields an independent neighbourhood.
///
/// # Examples
/// ```
/// use neighbourly_core::{DataShape, Euclidean, InMemoryDataset, NeighbourhoodFactoryBuilder};
///
/// let rows = InMemoryDataset::<u32, [f32]>::new(
///     "rows",
///     [(0, vec![0.0_f32, 0.0]), (1, vec![0.0, 1.0]), (2, vec![5.0, 5.0])],
/// )
/// .with_shape(DataShape::vectors(2));
///
/// let factory = NeighbourhoodFactoryBuilder::new(Euclidean).with_k(1).build()?;
/// let neighbourhood = factory.build(&rows)?;
/// assert_eq!(neighbourhood.len(), 3);
/// assert_eq!(neighbourhood.neighbours_of(&2)?.ids().collect::<Vec<_>>(), [1]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct NeighbourhoodFactory<M> {
    metric: M,
    settings: FactorySettings,
}

impl<M: Metric> NeighbourhoodFactory<M> {
    pub(crate) fn new(metric: M, settings: FactorySettings) -> Self {
        Self { metric, settings }
    }

    /// Returns the number of neighbours kept per item.
    #[must_use]
    pub fn k(&self) -> usize {
        self.settings.k
    }

    /// Returns the resolved execution strategy; never `Auto`.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.settings.execution_strategy
    }

    /// Returns the bound metric.
    #[must_use]
    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Returns the distance cache configuration, if caching is enabled.
    #[cfg(feature = "cpu")]
    #[cfg_attr(docsrs, doc(cfg(feature = "cpu")))]
    #[must_use]
    pub fn distance_cache(&self) -> Option<DistanceCacheConfig> {
        self.settings.distance_cache
    }

    /// Returns the configured memory ceiling in bytes.
    #[must_use]
    pub fn max_bytes(&self) -> Option<u64> {
        self.settings.max_bytes
    }

    /// Returns the cancellation token observed by every build.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.settings.cancellation
    }

    /// Declares which datasets this factory accepts.
    #[must_use]
    pub fn input_restriction(&self) -> InputRestriction {
        self.metric.input_restriction()
    }

    /// Precomputes the k nearest other items of every item in `dataset`.
    ///
    /// # Errors
    /// Configuration errors ([`NeighbourhoodError::IncompatibleDataset`],
    /// [`NeighbourhoodError::MemoryLimitExceeded`],
    /// [`NeighbourhoodError::ThreadPool`]) are reported before any distance
    /// is computed. Computation errors
    /// ([`NeighbourhoodError::InvalidDistance`], [`NeighbourhoodError::Metric`],
    /// [`NeighbourhoodError::DataSource`],
    /// [`NeighbourhoodError::DuplicateIdentifier`],
    /// [`NeighbourhoodError::Cancelled`]) abort the build; no partial
    /// neighbourhood is ever returned.
    #[instrument(
        name = "neighbourhood.build",
        err,
        skip(self, dataset),
        fields(
            data_source = %dataset.name(),
            items = dataset.len(),
            k = self.settings.k,
            metric = %self.metric.name(),
            strategy = ?self.settings.execution_strategy,
        ),
    )]
    pub fn build<D>(&self, dataset: &D) -> Result<KnnNeighbourhood<D::Id>>
    where
        D: Dataset<Item = M::Item> + Sync,
        M: Sync,
    {
        let restriction = self.metric.input_restriction();
        let shape = dataset.shape();
        if !restriction.admits(&shape) {
            return Err(NeighbourhoodError::IncompatibleDataset {
                data_source: Arc::from(dataset.name()),
                expected: restriction,
                actual: shape,
            });
        }

        self.check_memory(dataset)?;

        if dataset.is_empty() {
            warn!(
                data_source = dataset.name(),
                "data source is empty, returning an empty neighbourhood"
            );
            return Ok(self.finish(dataset, FrozenStore::default()));
        }

        #[cfg(feature = "metrics")]
        let started = std::time::Instant::now();

        let lists = self.assemble(dataset)?;

        #[cfg(feature = "metrics")]
        metrics::histogram!("neighbourhood_build_seconds").record(started.elapsed().as_secs_f64());

        let neighbourhood = self.finish(dataset, lists);
        info!(items = neighbourhood.len(), "neighbourhood build completed");
        Ok(neighbourhood)
    }

    fn check_memory<D: Dataset>(&self, dataset: &D) -> Result<()> {
        let Some(limit) = self.settings.max_bytes else {
            return Ok(());
        };
        let estimated = estimate_neighbourhood_bytes::<D::Id>(dataset.len(), self.settings.k)
            .saturating_add(self.cache_bytes(dataset.len()));
        if estimated > limit {
            warn!(
                estimated = %format_bytes(estimated),
                limit = %format_bytes(limit),
                "neighbourhood exceeds the configured memory limit"
            );
            return Err(NeighbourhoodError::MemoryLimitExceeded {
                data_source: Arc::from(dataset.name()),
                estimated,
                limit,
            });
        }
        Ok(())
    }

    #[cfg(feature = "cpu")]
    fn cache_bytes(&self, items: usize) -> u64 {
        if !self.metric.is_symmetric() {
            return 0;
        }
        self.settings.distance_cache.map_or(0, |config| {
            let pairs = items.saturating_mul(items.saturating_sub(1)) / 2;
            crate::memory::estimate_cache_bytes(config.max_entries().get().min(pairs))
        })
    }

    #[cfg(not(feature = "cpu"))]
    fn cache_bytes(&self, _items: usize) -> u64 {
        0
    }

    fn assemble<D>(&self, dataset: &D) -> Result<NeighbourMap<D::Id>>
    where
        D: Dataset<Item = M::Item> + Sync,
        M: Sync,
    {
        #[cfg(feature = "cpu")]
        let cache = self.distance_cache_for::<D::Id>();
        let query = DistanceQuery::new(dataset, &self.metric);
        #[cfg(feature = "cpu")]
        let query = match cache.as_ref() {
            Some(cache) => query.with_cache(cache),
            None => query,
        };

        let assembler =
            NeighbourhoodAssembler::new(&query, self.settings.k, &self.settings.cancellation);
        let ids = assembler.snapshot_ids()?;

        match self.settings.execution_strategy {
            #[cfg(feature = "cpu")]
            ExecutionStrategy::Parallel | ExecutionStrategy::Auto => {
                let Some(threads) = self.settings.max_threads else {
                    return assembler.assemble_parallel(&ids);
                };
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads.get())
                    .build()
                    .map_err(|error| NeighbourhoodError::ThreadPool {
                        message: Arc::from(error.to_string()),
                    })?;
                pool.install(|| assembler.assemble_parallel(&ids))
            }
            #[cfg(not(feature = "cpu"))]
            ExecutionStrategy::Parallel | ExecutionStrategy::Auto => {
                Err(NeighbourhoodError::BackendUnavailable {
                    requested: ExecutionStrategy::Parallel,
                })
            }
            ExecutionStrategy::Sequential => assembler.assemble_sequential(&ids),
        }
    }

    #[cfg(feature = "cpu")]
    fn distance_cache_for<I: ItemId>(&self) -> Option<DistanceCache<I>> {
        let config = self.settings.distance_cache?;
        if self.metric.is_symmetric() {
            tracing::debug!(
                max_entries = config.max_entries().get(),
                "distance cache enabled"
            );
            Some(DistanceCache::new(config))
        } else {
            tracing::debug!(
                metric = self.metric.name(),
                "distance cache skipped for asymmetric metric"
            );
            None
        }
    }

    fn finish<D: Dataset>(
        &self,
        dataset: &D,
        lists: NeighbourMap<D::Id>,
    ) -> KnnNeighbourhood<D::Id> {
        KnnNeighbourhood::new(
            lists,
            self.settings.k,
            Arc::from(self.metric.name()),
            Arc::from(dataset.name()),
        )
    }
}

impl<D, M> NeighbourSetPredicateFactory<D> for NeighbourhoodFactory<M>
where
    D: Dataset<Item = M::Item> + Sync,
    M: Metric + Sync,
{
    type Predicate = KnnNeighbourhood<D::Id>;

    fn instantiate(&self, dataset: &D) -> Result<Self::Predicate> {
        self.build(dataset)
    }

    fn input_restriction(&self) -> InputRestriction {
        Self::input_restriction(self)
    }
}
