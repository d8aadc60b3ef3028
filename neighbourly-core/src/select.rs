//! Exact bounded k-nearest selection for a single query item.

use std::collections::BinaryHeap;

use crate::{
    dataset::Dataset,
    distance::Metric,
    error::{SelectionError, render_id},
    query::DistanceQuery,
    types::{Neighbour, NeighbourList},
};

/// Selects the `k` nearest other items of a query.
///
/// Candidates are kept in a max-heap of capacity `k` keyed by
/// `(distance, id)`, so selection costs `O(n log k)` and ties resolve towards
/// the smaller identifier.
///
/// # Examples
/// ```
/// use neighbourly_core::{AbsoluteDifference, DataShape, DistanceQuery, InMemoryDataset, KnnSelector};
///
/// let points = InMemoryDataset::<char, f32>::new(
///     "points",
///     [('a', 0.0_f32), ('b', 1.0), ('c', 2.0), ('d', 10.0)],
/// )
/// .with_shape(DataShape::scalars());
/// let query = DistanceQuery::new(&points, &AbsoluteDifference);
/// let selector = KnnSelector::new(&query, 2);
///
/// let nearest = selector.select_all('d')?;
/// assert_eq!(nearest.ids().collect::<Vec<_>>(), ['c', 'b']);
/// # Ok::<(), neighbourly_core::SelectionError>(())
/// ```
#[derive(Debug)]
pub struct KnnSelector<'q, 'a, D: Dataset, M> {
    query: &'q DistanceQuery<'a, D, M>,
    k: usize,
}

impl<'q, 'a, D, M> KnnSelector<'q, 'a, D, M>
where
    D: Dataset,
    M: Metric<Item = D::Item>,
{
    /// Creates a selector returning at most `k` neighbours per query.
    #[must_use]
    pub fn new(query: &'q DistanceQuery<'a, D, M>, k: usize) -> Self {
        Self { query, k }
    }

    /// Returns the configured neighbour count.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Selects neighbours of `query_id` among every identifier of the dataset.
    ///
    /// # Errors
    /// See [`KnnSelector::select`].
    pub fn select_all(&self, query_id: D::Id) -> Result<NeighbourList<D::Id>, SelectionError> {
        let dataset = self.query.dataset();
        self.select(query_id, dataset.ids())
    }

    /// Selects neighbours of `query_id` among `candidates`.
    ///
    /// `candidates` must not repeat an identifier. The query itself is
    /// skipped wherever it appears.
    ///
    /// # Errors
    /// Returns [`SelectionError::UnknownQuery`] when `query_id` is not part of
    /// the dataset, and any error raised by [`DistanceQuery::distance`].
    pub fn select<C>(
        &self,
        query_id: D::Id,
        candidates: C,
    ) -> Result<NeighbourList<D::Id>, SelectionError>
    where
        C: IntoIterator<Item = D::Id>,
    {
        if !self.query.dataset().contains(&query_id) {
            return Err(SelectionError::UnknownQuery {
                id: render_id(&query_id),
            });
        }
        if self.k == 0 {
            return Ok(NeighbourList::default());
        }

        let capacity = self.k.min(self.query.dataset().len());
        let mut heap: BinaryHeap<Neighbour<D::Id>> = BinaryHeap::with_capacity(capacity);
        for candidate in candidates {
            if candidate == query_id {
                continue;
            }
            let entry = Neighbour {
                id: candidate,
                distance: self.query.distance(query_id, candidate)?,
            };
            if heap.len() < self.k {
                heap.push(entry);
            } else if let Some(mut worst) = heap.peek_mut() {
                if entry < *worst {
                    *worst = entry;
                }
            }
        }
        Ok(NeighbourList::from_sorted(heap.into_sorted_vec()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::{fixture, rstest};

    use super::*;
    use crate::{
        AbsoluteDifference, DataShape, FnMetric, InMemoryDataset, test_utils::CountingMetric,
    };

    #[fixture]
    fn line() -> InMemoryDataset<char, f32> {
        InMemoryDataset::new("line", [('A', 0.0_f32), ('B', 1.0), ('C', 2.0), ('D', 10.0)])
            .with_shape(DataShape::scalars())
    }

    #[rstest]
    #[case::first('A', 2, vec!['B', 'C'])]
    #[case::last('D', 2, vec!['C', 'B'])]
    #[case::all_others('B', 5, vec!['A', 'C', 'D'])]
    #[case::exactly_rest('C', 3, vec!['B', 'A', 'D'])]
    #[case::zero('A', 0, vec![])]
    fn selects_nearest_other_items(
        line: InMemoryDataset<char, f32>,
        #[case] query_id: char,
        #[case] k: usize,
        #[case] expected: Vec<char>,
    ) {
        let query = DistanceQuery::new(&line, &AbsoluteDifference);
        let list = KnnSelector::new(&query, k)
            .select_all(query_id)
            .expect("selection succeeds");
        assert_eq!(list.ids().collect::<Vec<_>>(), expected);
    }

    #[rstest]
    fn ties_resolve_by_identifier() {
        let dataset =
            InMemoryDataset::<u8, f32>::new("ties", [(9, 0.0_f32), (4, 1.0), (2, -1.0), (7, 1.0)]);
        let query = DistanceQuery::new(&dataset, &AbsoluteDifference);
        let list = KnnSelector::new(&query, 2)
            .select_all(9)
            .expect("selection succeeds");
        assert_eq!(list.ids().collect::<Vec<_>>(), [2, 4]);
    }

    #[rstest]
    fn zero_k_evaluates_no_distances(line: InMemoryDataset<char, f32>) {
        let metric = CountingMetric::new();
        let query = DistanceQuery::new(&line, &metric);
        let list = KnnSelector::new(&query, 0)
            .select_all('A')
            .expect("selection succeeds");
        assert!(list.is_empty());
        assert_eq!(metric.calls(), 0);
    }

    #[rstest]
    fn query_is_never_evaluated_against_itself(line: InMemoryDataset<char, f32>) {
        let metric = FnMetric::new("no-self", |a: &f32, b: &f32| {
            if a == b { f32::NAN } else { (a - b).abs() }
        });
        let query = DistanceQuery::new(&line, &metric);
        let list = KnnSelector::new(&query, 3)
            .select_all('B')
            .expect("self pair is skipped");
        assert_eq!(list.len(), 3);
    }

    #[rstest]
    fn unknown_query_is_rejected(line: InMemoryDataset<char, f32>) {
        let query = DistanceQuery::new(&line, &AbsoluteDifference);
        let err = KnnSelector::new(&query, 2)
            .select_all('Z')
            .expect_err("unknown query must fail");
        assert_eq!(err, SelectionError::UnknownQuery { id: Arc::from("'Z'") });
    }

    #[rstest]
    fn singleton_dataset_has_no_neighbours() {
        let dataset = InMemoryDataset::<char, f32>::new("one", [('A', 3.0_f32)]);
        let query = DistanceQuery::new(&dataset, &AbsoluteDifference);
        let list = KnnSelector::new(&query, 5)
            .select_all('A')
            .expect("selection succeeds");
        assert!(list.is_empty());
    }

    #[rstest]
    fn undefined_distance_aborts_selection(line: InMemoryDataset<char, f32>) {
        let metric = FnMetric::new("poisoned", |a: &f32, b: &f32| {
            if (a - b).abs() > 5.0 { f32::NAN } else { (a - b).abs() }
        });
        let query = DistanceQuery::new(&line, &metric);
        let err = KnnSelector::new(&query, 1)
            .select_all('A')
            .expect_err("NaN must abort");
        assert!(matches!(err, SelectionError::InvalidDistance { .. }));
    }
}
