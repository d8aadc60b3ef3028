use super::{
    helpers::validate_pair,
    metric::Metric,
    types::Result,
};
use crate::shape::InputRestriction;

/// Computes the Euclidean distance between two vectors.
///
/// # Examples
///
/// ```
/// use neighbourly_core::{DistanceError, euclidean_distance};
///
/// fn main() -> Result<(), DistanceError> {
///     let distance = euclidean_distance(&[1.0, 2.0, 3.0], &[4.0, 6.0, 8.0])?;
///     assert!((distance - 7.071_068).abs() < 1e-6);
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// - [`crate::DistanceError::ZeroLength`] when any input is empty.
/// - [`crate::DistanceError::DimensionMismatch`] when input lengths differ.
/// - [`crate::DistanceError::NonFinite`] when a value is NaN or infinite.
pub fn euclidean_distance(left: &[f32], right: &[f32]) -> Result<f32> {
    let (left, right) = validate_pair(left, right)?;
    let sum: f64 = left
        .iter()
        .zip(right.iter())
        .map(|(&l, &r)| {
            let diff = f64::from(l) - f64::from(r);
            diff * diff
        })
        .sum();
    Ok(sum.sqrt() as f32)
}

/// Euclidean (L2) metric over dense `f32` vectors.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Euclidean;

impl Metric for Euclidean {
    type Item = [f32];

    fn name(&self) -> &str {
        "euclidean"
    }

    fn input_restriction(&self) -> InputRestriction {
        InputRestriction::vectors()
    }

    fn is_symmetric(&self) -> bool {
        true
    }

    fn distance(&self, left: &[f32], right: &[f32]) -> Result<f32> {
        euclidean_distance(left, right)
    }
}
