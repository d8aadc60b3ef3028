//! The frozen k-nearest-neighbour neighbourhood and its consumer-facing trait.

use std::{collections::BTreeSet, sync::Arc};

use crate::{
    assemble::NeighbourMap,
    dataset::ItemId,
    error::{LookupError, render_id},
    types::NeighbourList,
};

/// Read-only view of a precomputed neighbourhood relation.
///
/// Consumers such as outlier scorers depend on this trait rather than on how
/// the neighbour sets were derived.
pub trait NeighbourSetPredicate<I: ItemId> {
    /// Returns the ordered neighbours of `id`, nearest first.
    ///
    /// # Errors
    /// Returns [`LookupError::UnknownIdentifier`] when `id` was not part of
    /// the dataset the predicate was built from.
    fn neighbours_of(&self, id: &I) -> Result<&NeighbourList<I>, LookupError>;

    /// Returns the neighbour identifiers of `id`, nearest first.
    ///
    /// # Errors
    /// See [`NeighbourSetPredicate::neighbours_of`].
    fn neighbour_ids(&self, id: &I) -> Result<Vec<I>, LookupError> {
        Ok(self.neighbours_of(id)?.ids().collect())
    }

    /// Returns the neighbour identifiers of `id` as an unordered set.
    ///
    /// # Errors
    /// See [`NeighbourSetPredicate::neighbours_of`].
    fn neighbour_set(&self, id: &I) -> Result<BTreeSet<I>, LookupError> {
        Ok(self.neighbours_of(id)?.ids().collect())
    }

    /// Returns a human-readable name of the relation.
    fn long_name(&self) -> &str;

    /// Returns a short, machine-friendly name of the relation.
    fn short_name(&self) -> &str;
}

/// Precomputed k-nearest-neighbour sets for every item of one dataset.
///
/// Built by [`crate::NeighbourhoodFactory::build`]. The value is immutable,
/// needs no locking and is `Send + Sync` whenever the identifier type is.
///
/// # Examples
/// ```
/// use neighbourly_core::{
///     AbsoluteDifference, DataShape, InMemoryDataset, NeighbourSetPredicate,
///     NeighbourhoodFactoryBuilder,
/// };
///
/// let points = InMemoryDataset::<char, f32>::new(
///     "points",
///     [('A', 0.0_f32), ('B', 1.0), ('C', 2.0), ('D', 10.0)],
/// )
/// .with_shape(DataShape::scalars());
/// let neighbourhood = NeighbourhoodFactoryBuilder::new(AbsoluteDifference)
///     .with_k(2)
///     .build()?
///     .build(&points)?;
///
/// assert_eq!(neighbourhood.neighbour_ids(&'A')?, ['B', 'C']);
/// assert_eq!(neighbourhood.neighbour_ids(&'D')?, ['C', 'B']);
/// assert!(neighbourhood.neighbours_of(&'Z').is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct KnnNeighbourhood<I> {
    lists: NeighbourMap<I>,
    k: usize,
    metric: Arc<str>,
    data_source: Arc<str>,
}

impl<I: ItemId> KnnNeighbourhood<I> {
    /// Human-readable name of the relation.
    pub const LONG_NAME: &'static str = "K Nearest Neighbors Neighborhood";
    /// Short name of the relation.
    pub const SHORT_NAME: &'static str = "k-neighbors-neighborhood";

    pub(crate) fn new(
        lists: NeighbourMap<I>,
        k: usize,
        metric: Arc<str>,
        data_source: Arc<str>,
    ) -> Self {
        Self {
            lists,
            k,
            metric,
            data_source,
        }
    }

    /// Returns the ordered neighbours of `id`, nearest first.
    ///
    /// # Errors
    /// Returns [`LookupError::UnknownIdentifier`] when `id` was not part of
    /// the dataset.
    pub fn neighbours_of(&self, id: &I) -> Result<&NeighbourList<I>, LookupError> {
        self.lists
            .get(id)
            .ok_or_else(|| LookupError::UnknownIdentifier { id: render_id(id) })
    }

    /// Reports whether `id` was part of the dataset.
    #[must_use]
    pub fn contains(&self, id: &I) -> bool {
        self.lists.contains_key(id)
    }

    /// Returns the number of items covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Returns whether the neighbourhood was built from an empty dataset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Returns the requested neighbour count.
    ///
    /// Lists hold `min(k, len() - 1)` entries.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the name of the metric used to build the relation.
    #[must_use]
    pub fn metric_name(&self) -> &str {
        &self.metric
    }

    /// Returns the name of the dataset the relation was built from.
    #[must_use]
    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    /// Iterates every item with its neighbours in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&I, &NeighbourList<I>)> + '_ {
        self.lists.iter()
    }

    /// Summarises the relation for logs and reports.
    ///
    /// # Examples
    /// ```
    /// use neighbourly_core::{AbsoluteDifference, DataShape, InMemoryDataset, NeighbourhoodFactoryBuilder};
    ///
    /// let points = InMemoryDataset::<u8, f32>::new("pts", [(1, 0.0_f32), (2, 1.0)])
    ///     .with_shape(DataShape::scalars());
    /// let neighbourhood = NeighbourhoodFactoryBuilder::new(AbsoluteDifference)
    ///     .with_k(3)
    ///     .build()?
    ///     .build(&points)?;
    /// assert_eq!(
    ///     neighbourhood.describe(),
    ///     "K Nearest Neighbors Neighborhood (k=3, metric=absolute-difference, data source=pts)",
    /// );
    /// # Ok::<(), neighbourly_core::NeighbourhoodError>(())
    /// ```
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "{} (k={}, metric={}, data source={})",
            Self::LONG_NAME,
            self.k,
            self.metric,
            self.data_source
        )
    }
}

impl<I: ItemId> NeighbourSetPredicate<I> for KnnNeighbourhood<I> {
    fn neighbours_of(&self, id: &I) -> Result<&NeighbourList<I>, LookupError> {
        Self::neighbours_of(self, id)
    }

    fn long_name(&self) -> &str {
        Self::LONG_NAME
    }

    fn short_name(&self) -> &str {
        Self::SHORT_NAME
    }
}
