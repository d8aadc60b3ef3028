//! Binds a [`Metric`] to a [`Dataset`] and validates every distance it
//! produces.

#[cfg(feature = "cpu")]
use crate::distance_cache::{DistanceCache, LookupOutcome};
use crate::{
    dataset::Dataset,
    distance::Metric,
    error::{SelectionError, render_id},
    types::unsigned_zero,
};

/// Evaluates distances between identifiers of one dataset.
///
/// Every value leaving [`DistanceQuery::distance`] is finite. NaN or infinite
/// metric output is reported as [`SelectionError::InvalidDistance`].
///
/// # Examples
/// ```
/// use neighbourly_core::{AbsoluteDifference, DataShape, DistanceQuery, InMemoryDataset};
///
/// let points = InMemoryDataset::<char, f32>::new("points", [('a', 1.0_f32), ('b', 4.0)])
///     .with_shape(DataShape::scalars());
/// let query = DistanceQuery::new(&points, &AbsoluteDifference);
/// assert_eq!(query.distance('a', 'b')?, 3.0);
/// assert!(query.distance('a', 'z').is_err());
/// # Ok::<(), neighbourly_core::SelectionError>(())
/// ```
#[derive(Debug)]
pub struct DistanceQuery<'a, D: Dataset, M> {
    dataset: &'a D,
    metric: &'a M,
    #[cfg(feature = "cpu")]
    cache: Option<&'a DistanceCache<D::Id>>,
}

impl<'a, D, M> DistanceQuery<'a, D, M>
where
    D: Dataset,
    M: Metric<Item = D::Item>,
{
    /// Binds `metric` to `dataset` without caching.
    #[must_use]
    pub fn new(dataset: &'a D, metric: &'a M) -> Self {
        Self {
            dataset,
            metric,
            #[cfg(feature = "cpu")]
            cache: None,
        }
    }

    /// Serves repeated pairs from `cache`. Ignored for asymmetric metrics.
    #[cfg(feature = "cpu")]
    pub(crate) fn with_cache(mut self, cache: &'a DistanceCache<D::Id>) -> Self {
        if self.metric.is_symmetric() {
            self.cache = Some(cache);
        }
        self
    }

    /// Returns the bound dataset.
    #[must_use]
    pub fn dataset(&self) -> &'a D {
        self.dataset
    }

    /// Returns the bound metric.
    #[must_use]
    pub fn metric(&self) -> &'a M {
        self.metric
    }

    /// Computes the distance between `left` and `right`.
    ///
    /// # Errors
    /// Returns [`SelectionError::DataSource`] when an identifier cannot be
    /// resolved, [`SelectionError::Metric`] when the metric rejects the pair
    /// and [`SelectionError::InvalidDistance`] when it returns NaN or an
    /// infinity.
    pub fn distance(&self, left: D::Id, right: D::Id) -> Result<f32, SelectionError> {
        #[cfg(feature = "cpu")]
        if let Some(cache) = self.cache {
            return match cache.begin_lookup(left, right) {
                LookupOutcome::Hit(value) => Ok(value),
                LookupOutcome::Miss(pending) => {
                    let value = self.compute(left, right)?;
                    cache.complete_miss(pending, value);
                    Ok(value)
                }
            };
        }
        self.compute(left, right)
    }

    fn compute(&self, left: D::Id, right: D::Id) -> Result<f32, SelectionError> {
        let left_item = self.dataset.item(&left)?;
        let right_item = self.dataset.item(&right)?;
        let value = self
            .metric
            .distance(left_item, right_item)
            .map_err(|error| SelectionError::Metric {
                left: render_id(&left),
                right: render_id(&right),
                error,
            })?;
        if value.is_finite() {
            Ok(unsigned_zero(value))
        } else {
            Err(SelectionError::InvalidDistance {
                left: render_id(&left),
                right: render_id(&right),
                value,
            })
        }
    }
}
