//! The [`Metric`] seam and a closure adapter for ad-hoc metrics.

use core::{fmt, marker::PhantomData};
use std::sync::Arc;

use super::types::Result;
use crate::shape::InputRestriction;

/// A distance function over items of type [`Metric::Item`].
///
/// Metrics are opaque to the rest of the library: the selector only relies on
/// the returned values being finite and comparable. A NaN or infinite result
/// aborts the build.
///
/// # Examples
/// ```
/// use neighbourly_core::{DistanceError, InputRestriction, Metric};
///
/// struct Hamming;
///
/// impl Metric for Hamming {
///     type Item = str;
///
///     fn name(&self) -> &str { "hamming" }
///
///     fn input_restriction(&self) -> InputRestriction {
///         InputRestriction::of_kind(neighbourly_core::ItemKind::Text)
///     }
///
///     fn distance(&self, left: &str, right: &str) -> Result<f32, DistanceError> {
///         if left.len() != right.len() {
///             return Err(DistanceError::domain("hamming needs equal lengths"));
///         }
///         let diff = left.bytes().zip(right.bytes()).filter(|(l, r)| l != r).count();
///         Ok(diff as f32)
///     }
/// }
///
/// assert_eq!(Hamming.distance("abc", "abd")?, 1.0);
/// assert!(Hamming.distance("abc", "ab").is_err());
/// # Ok::<(), DistanceError>(())
/// ```
pub trait Metric {
    /// Item type the metric compares.
    type Item: ?Sized;

    /// Returns a human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Declares which datasets this metric can be applied to.
    fn input_restriction(&self) -> InputRestriction {
        InputRestriction::any()
    }

    /// Reports whether `distance(a, b) == distance(b, a)` for every pair.
    ///
    /// Only symmetric metrics may be served from the distance cache.
    fn is_symmetric(&self) -> bool {
        false
    }

    /// Computes the distance between two items.
    ///
    /// # Errors
    /// Returns a [`crate::DistanceError`] when the pair is outside the
    /// metric's domain.
    fn distance(&self, left: &Self::Item, right: &Self::Item) -> Result<f32>;
}

impl<M: Metric + ?Sized> Metric for &M {
    type Item = M::Item;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn input_restriction(&self) -> InputRestriction {
        (**self).input_restriction()
    }

    fn is_symmetric(&self) -> bool {
        (**self).is_symmetric()
    }

    fn distance(&self, left: &Self::Item, right: &Self::Item) -> Result<f32> {
        (**self).distance(left, right)
    }
}

/// Wraps a closure as a [`Metric`].
///
/// # Examples
/// ```
/// use neighbourly_core::{FnMetric, Metric};
///
/// let metric = FnMetric::new("gap", |a: &u32, b: &u32| a.abs_diff(*b) as f32).symmetric();
/// assert_eq!(metric.name(), "gap");
/// assert!(metric.is_symmetric());
/// assert_eq!(metric.distance(&3, &7).ok(), Some(4.0));
/// ```
pub struct FnMetric<T: ?Sized, F> {
    name: Arc<str>,
    restriction: InputRestriction,
    symmetric: bool,
    function: F,
    _item: PhantomData<fn(&T)>,
}

impl<T, F> FnMetric<T, F>
where
    T: ?Sized,
    F: Fn(&T, &T) -> f32,
{
    /// Wraps `function` under `name`. The metric accepts any dataset and is
    /// treated as asymmetric until [`FnMetric::symmetric`] is called.
    pub fn new(name: impl Into<Arc<str>>, function: F) -> Self {
        Self {
            name: name.into(),
            restriction: InputRestriction::any(),
            symmetric: false,
            function,
            _item: PhantomData,
        }
    }

    /// Declares the datasets the closure understands.
    #[must_use]
    pub fn with_input_restriction(mut self, restriction: InputRestriction) -> Self {
        self.restriction = restriction;
        self
    }

    /// Marks the closure as symmetric.
    #[must_use]
    pub fn symmetric(mut self) -> Self {
        self.symmetric = true;
        self
    }
}

impl<T, F> Metric for FnMetric<T, F>
where
    T: ?Sized,
    F: Fn(&T, &T) -> f32,
{
    type Item = T;

    fn name(&self) -> &str {
        &self.name
    }

    fn input_restriction(&self) -> InputRestriction {
        self.restriction
    }

    fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    fn distance(&self, left: &T, right: &T) -> Result<f32> {
        Ok((self.function)(left, right))
    }
}

impl<T: ?Sized, F> fmt::Debug for FnMetric<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMetric")
            .field("name", &self.name)
            .field("restriction", &self.restriction)
            .field("symmetric", &self.symmetric)
            .finish_non_exhaustive()
    }
}
