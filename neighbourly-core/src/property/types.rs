//! Type definitions for neighbourhood property-based tests.

use test_strategy::Arbitrary;

use crate::{DataShape, DataSourceError, Dataset, InMemoryDataset};

/// Value distribution used when generating scalar datasets.
///
/// Weighted towards `ManyTies`, the case most likely to expose unstable
/// ordering.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Arbitrary)]
pub(super) enum ValueDistribution {
    /// Values drawn from a continuous range; ties are rare.
    #[weight(1)]
    Unique,
    /// Small integers, so many pairs share the same distance.
    #[weight(3)]
    ManyTies,
    /// A few tight clusters separated by wide gaps.
    #[weight(2)]
    Clustered,
    /// Every item carries the same value.
    #[weight(1)]
    Constant,
}

/// Fixture for neighbourhood property tests.
///
/// Entries are kept in generation order, which is deliberately not the
/// identifier order.
#[derive(Clone, Debug)]
pub(super) struct KnnFixture {
    /// `(identifier, value)` pairs with distinct identifiers.
    pub entries: Vec<(u32, f32)>,
    /// Requested neighbour count.
    pub k: usize,
    /// Distribution used during generation.
    pub distribution: ValueDistribution,
}

impl KnnFixture {
    /// Builds the identifier-ordered dataset for this fixture.
    pub(super) fn dataset(&self) -> InMemoryDataset<u32, f32> {
        InMemoryDataset::new("fixture", self.entries.iter().copied())
            .with_shape(DataShape::scalars())
    }

    /// Builds a dataset that enumerates identifiers in generation order.
    pub(super) fn shuffled_dataset(&self) -> ShuffledDataset {
        ShuffledDataset {
            entries: self.entries.clone(),
        }
    }

    pub(super) fn k_as_i64(&self) -> i64 {
        i64::try_from(self.k).unwrap_or(i64::MAX)
    }

    pub(super) fn describe(&self) -> String {
        format!(
            "distribution={:?}, items={}, k={}",
            self.distribution,
            self.entries.len(),
            self.k
        )
    }
}

/// Dataset enumerating its identifiers in insertion order.
#[derive(Clone, Debug)]
pub(super) struct ShuffledDataset {
    entries: Vec<(u32, f32)>,
}

impl Dataset for ShuffledDataset {
    type Id = u32;
    type Item = f32;

    fn name(&self) -> &str {
        "fixture"
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    fn contains(&self, id: &u32) -> bool {
        self.entries.iter().any(|(candidate, _)| candidate == id)
    }

    fn item(&self, id: &u32) -> Result<&f32, DataSourceError> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, value)| value)
            .ok_or_else(|| DataSourceError::MissingItem {
                id: crate::error::render_id(id),
            })
    }

    fn shape(&self) -> DataShape {
        DataShape::scalars()
    }
}
