//! Shared helpers for the vector metrics.

use super::types::{DistanceError, Result, Vector, VectorKind};

/// Validates both arguments and ensures they share a dimensionality.
pub(crate) fn validate_pair<'a>(left: &'a [f32], right: &'a [f32]) -> Result<(Vector<'a>, Vector<'a>)> {
    let left = Vector::new(left, VectorKind::Left)?;
    let right = Vector::new(right, VectorKind::Right)?;
    if left.dimension() != right.dimension() {
        return Err(DistanceError::DimensionMismatch {
            left: left.dimension(),
            right: right.dimension(),
        });
    }
    Ok((left, right))
}

/// Accumulates the dot product and squared magnitudes across both vectors.
pub(crate) fn accumulate_components(left: &Vector<'_>, right: &Vector<'_>) -> (f64, f64, f64) {
    left.iter()
        .zip(right.iter())
        .fold((0.0, 0.0, 0.0), |(dot, ls, rs), (&l, &r)| {
            let (l, r) = (f64::from(l), f64::from(r));
            (dot + l * r, ls + l * l, rs + r * r)
        })
}
