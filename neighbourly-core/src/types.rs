//! Neighbour entries and ordered neighbour lists.

use core::{cmp::Ordering, slice};

use crate::dataset::ItemId;

/// Neighbour candidate paired with its distance from the query item.
///
/// Entries order by distance first and identifier second, so ties resolve
/// towards the smaller identifier.
///
/// # Examples
/// ```
/// use neighbourly_core::Neighbour;
///
/// let near = Neighbour { id: 'b', distance: 1.0 };
/// let tied = Neighbour { id: 'a', distance: 1.0 };
/// assert!(tied < near);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbour<I> {
    /// Identifier of the neighbour.
    pub id: I,
    /// Distance between the query item and [`Neighbour::id`].
    pub distance: f32,
}

impl<I: Ord> Eq for Neighbour<I> {}

impl<I: Ord> Ord for Neighbour<I> {
    fn cmp(&self, other: &Self) -> Ordering {
        unsigned_zero(self.distance)
            .total_cmp(&unsigned_zero(other.distance))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Maps `-0.0` to `0.0` so equal distances tie on the identifier.
pub(crate) fn unsigned_zero(distance: f32) -> f32 {
    if distance == 0.0 { 0.0 } else { distance }
}

impl<I: Ord> PartialOrd for Neighbour<I> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Neighbours of one query item in ascending `(distance, id)` order.
///
/// Never contains the query item itself.
#[derive(Clone, Debug, PartialEq)]
pub struct NeighbourList<I>(Vec<Neighbour<I>>);

impl<I> Default for NeighbourList<I> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<I: ItemId> NeighbourList<I> {
    /// Wraps entries that are already sorted.
    pub(crate) fn from_sorted(entries: Vec<Neighbour<I>>) -> Self {
        debug_assert!(
            entries.windows(2).all(|pair| pair[0] < pair[1]),
            "neighbour lists must be strictly ascending"
        );
        Self(entries)
    }

    /// Iterates neighbour identifiers, nearest first.
    pub fn ids(&self) -> impl ExactSizeIterator<Item = I> + '_ {
        self.0.iter().map(|neighbour| neighbour.id)
    }
}

impl<I> NeighbourList<I> {
    /// Returns the number of neighbours.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the list holds no neighbours.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries, nearest first.
    pub fn iter(&self) -> slice::Iter<'_, Neighbour<I>> {
        self.0.iter()
    }

    /// Borrows the entries as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Neighbour<I>] {
        &self.0
    }

    /// Returns the nearest neighbour, if any.
    #[must_use]
    pub fn nearest(&self) -> Option<&Neighbour<I>> {
        self.0.first()
    }
}

impl<'a, I> IntoIterator for &'a NeighbourList<I> {
    type Item = &'a Neighbour<I>;
    type IntoIter = slice::Iter<'a, Neighbour<I>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<I> IntoIterator for NeighbourList<I> {
    type Item = Neighbour<I>;
    type IntoIter = std::vec::IntoIter<Neighbour<I>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
