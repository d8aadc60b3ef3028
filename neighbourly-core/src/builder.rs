//! Builder utilities for configuring neighbourhood factories.
//!
//! Exposes the execution strategy selection surface and the validation that
//! runs before a [`NeighbourhoodFactory`] is handed out.

use std::{num::NonZeroUsize, sync::Arc};

#[cfg(feature = "cpu")]
use crate::distance_cache::DistanceCacheConfig;
use crate::{
    Result, cancel::CancellationToken, distance::Metric, error::NeighbourhoodError,
    factory::{FactorySettings, NeighbourhoodFactory},
};

/// Indicates how [`NeighbourhoodFactory::build`] spreads work across threads.
///
/// `Auto` resolves deterministically at [`NeighbourhoodFactoryBuilder::build`]
/// time: it selects `Parallel` when the `cpu` feature is enabled and
/// `Sequential` otherwise, so behaviour stays stable across builds.
///
/// # Examples
/// ```
/// use neighbourly_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::default();
/// assert!(matches!(strategy, ExecutionStrategy::Auto));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Allow the library to select an appropriate strategy automatically.
    #[default]
    Auto,
    /// Compute every neighbour list on the calling thread.
    Sequential,
    /// Compute neighbour lists on the Rayon worker pool.
    Parallel,
}

/// Configures and constructs [`NeighbourhoodFactory`] instances.
///
/// # Examples
/// ```
/// use neighbourly_core::{Euclidean, ExecutionStrategy, NeighbourhoodFactoryBuilder};
///
/// let factory = NeighbourhoodFactoryBuilder::new(Euclidean)
///     .with_k(8)
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(factory.k(), 8);
/// assert_eq!(factory.execution_strategy(), ExecutionStrategy::Sequential);
/// ```
#[derive(Debug, Clone)]
pub struct NeighbourhoodFactoryBuilder<M> {
    metric: M,
    k: i64,
    execution_strategy: ExecutionStrategy,
    max_threads: Option<NonZeroUsize>,
    #[cfg(feature = "cpu")]
    distance_cache: Option<DistanceCacheConfig>,
    max_bytes: Option<u64>,
    cancellation: CancellationToken,
}

impl<M: Metric> NeighbourhoodFactoryBuilder<M> {
    /// Neighbour count used when [`NeighbourhoodFactoryBuilder::with_k`] is
    /// not called.
    pub const DEFAULT_K: i64 = 10;

    /// Creates a builder for `metric` populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use neighbourly_core::{Cosine, ExecutionStrategy, NeighbourhoodFactoryBuilder};
    ///
    /// let builder = NeighbourhoodFactoryBuilder::new(Cosine);
    /// assert_eq!(builder.k(), 10);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Auto);
    /// ```
    #[must_use]
    pub fn new(metric: M) -> Self {
        Self {
            metric,
            k: Self::DEFAULT_K,
            execution_strategy: ExecutionStrategy::Auto,
            max_threads: None,
            #[cfg(feature = "cpu")]
            distance_cache: None,
            max_bytes: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Overrides the number of neighbours kept per item.
    ///
    /// Negative values are accepted here and rejected by
    /// [`NeighbourhoodFactoryBuilder::build`].
    #[must_use]
    pub fn with_k(mut self, k: i64) -> Self {
        self.k = k;
        self
    }

    /// Returns the configured neighbour count.
    #[must_use]
    pub fn k(&self) -> i64 {
        self.k
    }

    /// Sets the execution strategy used by [`NeighbourhoodFactory::build`].
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the currently configured execution strategy.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Runs parallel builds on a dedicated pool of `threads` workers instead
    /// of the global Rayon pool.
    #[must_use]
    pub fn with_max_threads(mut self, threads: NonZeroUsize) -> Self {
        self.max_threads = Some(threads);
        self
    }

    /// Enables or disables the per-build distance cache.
    ///
    /// The cache only engages for metrics that report
    /// [`Metric::is_symmetric`].
    ///
    /// # Examples
    /// ```
    /// use neighbourly_core::{DistanceCacheConfig, Euclidean, NeighbourhoodFactoryBuilder};
    ///
    /// let factory = NeighbourhoodFactoryBuilder::new(Euclidean)
    ///     .with_distance_cache(Some(DistanceCacheConfig::default()))
    ///     .build()
    ///     .expect("valid configuration");
    /// assert!(factory.distance_cache().is_some());
    /// ```
    #[cfg(feature = "cpu")]
    #[cfg_attr(docsrs, doc(cfg(feature = "cpu")))]
    #[must_use]
    pub fn with_distance_cache(mut self, config: Option<DistanceCacheConfig>) -> Self {
        self.distance_cache = config;
        self
    }

    /// Rejects builds whose estimated peak memory exceeds `limit` bytes.
    #[must_use]
    pub fn with_max_bytes(mut self, limit: Option<u64>) -> Self {
        self.max_bytes = limit;
        self
    }

    /// Shares `token` with every build started by the resulting factory.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Validates the configuration and constructs a [`NeighbourhoodFactory`].
    ///
    /// # Errors
    /// Returns [`NeighbourhoodError::InvalidK`] for a negative `k`,
    /// [`NeighbourhoodError::UnusableRestriction`] when the metric's input
    /// restriction can never be met, and
    /// [`NeighbourhoodError::BackendUnavailable`] when `Parallel` is requested
    /// without the `cpu` feature.
    ///
    /// # Examples
    /// ```
    /// use neighbourly_core::{Euclidean, NeighbourhoodErrorCode, NeighbourhoodFactoryBuilder};
    ///
    /// let err = NeighbourhoodFactoryBuilder::new(Euclidean)
    ///     .with_k(-1)
    ///     .build()
    ///     .expect_err("negative k is rejected");
    /// assert_eq!(err.code(), NeighbourhoodErrorCode::InvalidK);
    /// ```
    pub fn build(self) -> Result<NeighbourhoodFactory<M>> {
        if self.k < 0 {
            return Err(NeighbourhoodError::InvalidK { got: self.k });
        }
        // `k` beyond `usize::MAX` behaves exactly like `n - 1`.
        let k = usize::try_from(self.k).unwrap_or(usize::MAX);

        if let Some(reason) = self.metric.input_restriction().unusable_reason() {
            return Err(NeighbourhoodError::UnusableRestriction {
                metric: Arc::from(self.metric.name()),
                reason: Arc::from(reason),
            });
        }

        let execution_strategy = resolve_strategy(self.execution_strategy)?;

        Ok(NeighbourhoodFactory::new(
            self.metric,
            FactorySettings {
                k,
                execution_strategy,
                max_threads: self.max_threads,
                #[cfg(feature = "cpu")]
                distance_cache: self.distance_cache,
                max_bytes: self.max_bytes,
                cancellation: self.cancellation,
            },
        ))
    }
}

fn resolve_strategy(requested: ExecutionStrategy) -> Result<ExecutionStrategy> {
    match requested {
        ExecutionStrategy::Sequential => Ok(ExecutionStrategy::Sequential),
        #[cfg(feature = "cpu")]
        ExecutionStrategy::Auto | ExecutionStrategy::Parallel => Ok(ExecutionStrategy::Parallel),
        #[cfg(not(feature = "cpu"))]
        ExecutionStrategy::Auto => Ok(ExecutionStrategy::Sequential),
        #[cfg(not(feature = "cpu"))]
        ExecutionStrategy::Parallel => Err(NeighbourhoodError::BackendUnavailable {
            requested: ExecutionStrategy::Parallel,
        }),
    }
}
