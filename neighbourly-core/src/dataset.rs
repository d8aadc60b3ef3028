//! Dataset abstractions for the neighbourly core runtime.

use core::{fmt, hash::Hash};
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    error::{DataSourceError, render_id},
    shape::DataShape,
};

/// Identifier of an item within a [`Dataset`].
///
/// Identifiers are opaque: the library only compares them for equality and
/// uses their total order to break distance ties deterministically.
pub trait ItemId: Copy + Ord + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> ItemId for T where T: Copy + Ord + Hash + fmt::Debug + Send + Sync + 'static {}

/// A finite, read-only collection of identified items.
///
/// The collection must not change while a neighbourhood is being built from
/// it.
///
/// # Examples
/// ```
/// use neighbourly_core::{DataShape, DataSourceError, Dataset};
///
/// struct Temperatures(Vec<f32>);
///
/// impl Dataset for Temperatures {
///     type Id = usize;
///     type Item = f32;
///
///     fn name(&self) -> &str { "temperatures" }
///     fn len(&self) -> usize { self.0.len() }
///     fn ids(&self) -> impl Iterator<Item = usize> + '_ { 0..self.0.len() }
///     fn contains(&self, id: &usize) -> bool { *id < self.0.len() }
///     fn item(&self, id: &usize) -> Result<&f32, DataSourceError> {
///         self.0.get(*id).ok_or(DataSourceError::OutOfBounds { index: *id })
///     }
///     fn shape(&self) -> DataShape { DataShape::scalars() }
/// }
///
/// let temps = Temperatures(vec![12.5, 14.0]);
/// assert_eq!(temps.len(), 2);
/// assert!(!temps.is_empty());
/// assert_eq!(temps.ids().collect::<Vec<_>>(), [0, 1]);
/// assert_eq!(*temps.item(&1)?, 14.0);
/// # Ok::<(), DataSourceError>(())
/// ```
pub trait Dataset {
    /// Identifier type.
    type Id: ItemId;
    /// Item type handed to the metric.
    type Item: ?Sized;

    /// Returns a human-readable name.
    fn name(&self) -> &str;

    /// Returns number of items in the dataset.
    fn len(&self) -> usize;

    /// Returns whether the dataset contains no items.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerates every identifier exactly once, in any order.
    fn ids(&self) -> impl Iterator<Item = Self::Id> + '_;

    /// Reports whether `id` belongs to the dataset.
    fn contains(&self, id: &Self::Id) -> bool;

    /// Borrows the item stored under `id`.
    ///
    /// # Errors
    /// Returns [`DataSourceError::MissingItem`] (or
    /// [`DataSourceError::OutOfBounds`] for positional sources) when `id` is
    /// not part of the dataset.
    fn item(&self, id: &Self::Id) -> Result<&Self::Item, DataSourceError>;

    /// Describes the items so the factory can check metric compatibility.
    fn shape(&self) -> DataShape {
        DataShape::opaque()
    }
}

/// An owned dataset keyed by arbitrary identifiers.
///
/// Items are boxed so unsized item types such as `[f32]` and `str` can be
/// stored directly.
///
/// # Examples
/// ```
/// use neighbourly_core::{DataShape, Dataset, InMemoryDataset};
///
/// let points = InMemoryDataset::<char, f32>::new("points", [('a', 0.0_f32), ('b', 1.0)])
///     .with_shape(DataShape::scalars());
/// assert_eq!(points.len(), 2);
/// assert!(points.contains(&'a'));
/// assert_eq!(points.shape(), DataShape::scalars());
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryDataset<I, T: ?Sized> {
    name: Arc<str>,
    items: BTreeMap<I, Box<T>>,
    shape: DataShape,
}

impl<I: ItemId, T: ?Sized> InMemoryDataset<I, T> {
    /// Collects `entries` under `name`. A repeated identifier keeps its last
    /// item.
    pub fn new<B>(name: impl Into<Arc<str>>, entries: impl IntoIterator<Item = (I, B)>) -> Self
    where
        B: Into<Box<T>>,
    {
        Self {
            name: name.into(),
            items: entries
                .into_iter()
                .map(|(id, item)| (id, item.into()))
                .collect(),
            shape: DataShape::opaque(),
        }
    }

    /// Declares the shape reported to the factory.
    #[must_use]
    pub fn with_shape(mut self, shape: DataShape) -> Self {
        self.shape = shape;
        self
    }
}

impl<I: ItemId, T: ?Sized> Dataset for InMemoryDataset<I, T> {
    type Id = I;
    type Item = T;

    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn ids(&self) -> impl Iterator<Item = I> + '_ {
        self.items.keys().copied()
    }

    fn contains(&self, id: &I) -> bool {
        self.items.contains_key(id)
    }

    fn item(&self, id: &I) -> Result<&T, DataSourceError> {
        self.items
            .get(id)
            .map(Box::as_ref)
            .ok_or_else(|| DataSourceError::MissingItem { id: render_id(id) })
    }

    fn shape(&self) -> DataShape {
        self.shape
    }
}
