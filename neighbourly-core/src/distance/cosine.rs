use super::{
    helpers::{accumulate_components, validate_pair},
    metric::Metric,
    types::{Norm, Result, VectorKind},
};
use crate::shape::InputRestriction;

/// Computes the cosine distance `1 - cos(θ)` between two vectors.
///
/// # Examples
///
/// ```
/// use neighbourly_core::{DistanceError, cosine_distance};
///
/// fn main() -> Result<(), DistanceError> {
///     let orthogonal = cosine_distance(&[1.0, 0.0], &[0.0, 1.0])?;
///     assert!((orthogonal - 1.0).abs() < 1e-6);
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// - [`crate::DistanceError::ZeroLength`] when any input is empty.
/// - [`crate::DistanceError::DimensionMismatch`] when input lengths differ.
/// - [`crate::DistanceError::NonFinite`] when a value is NaN or infinite.
/// - [`crate::DistanceError::ZeroMagnitude`] when either vector has zero L2 norm.
pub fn cosine_distance(left: &[f32], right: &[f32]) -> Result<f32> {
    let (left, right) = validate_pair(left, right)?;
    let (dot, left_squares, right_squares) = accumulate_components(&left, &right);
    let left_norm = Norm::from_squared_sum(left_squares, VectorKind::Left)?;
    let right_norm = Norm::from_squared_sum(right_squares, VectorKind::Right)?;

    let similarity = (dot / (left_norm.value() * right_norm.value())) as f32;
    // Rounding can push the ratio just outside [-1, 1].
    Ok(1.0 - similarity.clamp(-1.0, 1.0))
}

/// Cosine metric over dense `f32` vectors.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Cosine;

impl Metric for Cosine {
    type Item = [f32];

    fn name(&self) -> &str {
        "cosine"
    }

    fn input_restriction(&self) -> InputRestriction {
        InputRestriction::vectors()
    }

    fn is_symmetric(&self) -> bool {
        true
    }

    fn distance(&self, left: &[f32], right: &[f32]) -> Result<f32> {
        cosine_distance(left, right)
    }
}
