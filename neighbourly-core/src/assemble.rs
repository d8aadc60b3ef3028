//! Applies the selector to every identifier and freezes the results.
//!
//! Each worker owns only the list of its own query. Lists are joined after
//! every selection has finished (Rayon's `collect` acts as the barrier) and
//! only then written into the store, so a failed or cancelled build never
//! exposes a partial map.

#[cfg(feature = "cpu")]
use rayon::prelude::*;
use tracing::instrument;

use crate::{
    Result,
    cancel::CancellationToken,
    dataset::Dataset,
    distance::Metric,
    error::{NeighbourhoodError, SelectionError, render_id},
    query::DistanceQuery,
    select::KnnSelector,
    store::{FrozenStore, StoreWriter},
    types::NeighbourList,
};

pub(crate) type NeighbourMap<I> = FrozenStore<I, NeighbourList<I>>;

type Selected<I> = core::result::Result<(I, NeighbourList<I>), SelectionError>;

pub(crate) struct NeighbourhoodAssembler<'q, 'a, D: Dataset, M> {
    query: &'q DistanceQuery<'a, D, M>,
    k: usize,
    cancellation: &'q CancellationToken,
}

impl<'q, 'a, D, M> NeighbourhoodAssembler<'q, 'a, D, M>
where
    D: Dataset,
    M: Metric<Item = D::Item>,
{
    pub(crate) fn new(
        query: &'q DistanceQuery<'a, D, M>,
        k: usize,
        cancellation: &'q CancellationToken,
    ) -> Self {
        Self {
            query,
            k,
            cancellation,
        }
    }

    /// Snapshots the identifiers in ascending order, rejecting repeats.
    pub(crate) fn snapshot_ids(&self) -> Result<Vec<D::Id>> {
        let dataset = self.query.dataset();
        let mut ids: Vec<D::Id> = dataset.ids().collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(NeighbourhoodError::DuplicateIdentifier {
                data_source: dataset.name().into(),
                id: render_id(&pair[0]),
            });
        }
        Ok(ids)
    }

    #[instrument(
        name = "neighbourhood.assemble",
        err,
        skip(self, ids),
        fields(items = ids.len(), k = self.k, parallel = false),
    )]
    pub(crate) fn assemble_sequential(&self, ids: &[D::Id]) -> Result<NeighbourMap<D::Id>> {
        let lists = ids
            .iter()
            .map(|&id| self.select_one(id, ids))
            .collect::<core::result::Result<Vec<_>, _>>();
        self.freeze(lists)
    }

    #[cfg(feature = "cpu")]
    #[instrument(
        name = "neighbourhood.assemble",
        err,
        skip(self, ids),
        fields(items = ids.len(), k = self.k, parallel = true),
    )]
    pub(crate) fn assemble_parallel(&self, ids: &[D::Id]) -> Result<NeighbourMap<D::Id>>
    where
        D: Sync,
        M: Sync,
    {
        let lists = ids
            .par_iter()
            .map(|&id| self.select_one(id, ids))
            .collect::<core::result::Result<Vec<_>, _>>();
        self.freeze(lists)
    }

    fn select_one(&self, id: D::Id, ids: &[D::Id]) -> Selected<D::Id> {
        if self.cancellation.is_cancelled() {
            return Err(SelectionError::Cancelled);
        }
        KnnSelector::new(self.query, self.k)
            .select(id, ids.iter().copied())
            .map(|list| (id, list))
    }

    fn freeze(
        &self,
        lists: core::result::Result<Vec<(D::Id, NeighbourList<D::Id>)>, SelectionError>,
    ) -> Result<NeighbourMap<D::Id>> {
        let data_source = self.query.dataset().name();
        let lists = lists.map_err(|error| NeighbourhoodError::from_selection(data_source, error))?;
        if self.cancellation.is_cancelled() {
            return Err(NeighbourhoodError::Cancelled {
                data_source: data_source.into(),
            });
        }

        let mut writer = StoreWriter::new();
        for (id, list) in lists {
            writer
                .insert(id, list)
                .map_err(|duplicate| NeighbourhoodError::DuplicateIdentifier {
                    data_source: data_source.into(),
                    id: render_id(&duplicate.key),
                })?;
        }
        Ok(writer.freeze())
    }
}
