use super::{
    metric::Metric,
    types::{DistanceError, Result, VectorKind},
};
use crate::shape::{InputRestriction, ItemKind};

/// `|left - right|` over finite scalars.
///
/// # Examples
/// ```
/// use neighbourly_core::{AbsoluteDifference, Metric};
///
/// assert_eq!(AbsoluteDifference.distance(&2.0, &10.0).ok(), Some(8.0));
/// assert!(AbsoluteDifference.distance(&f32::NAN, &1.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AbsoluteDifference;

fn finite(value: f32, which: VectorKind) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DistanceError::NonFinite {
            which,
            index: 0,
            value,
        })
    }
}

impl Metric for AbsoluteDifference {
    type Item = f32;

    fn name(&self) -> &str {
        "absolute-difference"
    }

    fn input_restriction(&self) -> InputRestriction {
        InputRestriction::of_kind(ItemKind::Scalar)
    }

    fn is_symmetric(&self) -> bool {
        true
    }

    fn distance(&self, left: &f32, right: &f32) -> Result<f32> {
        let left = finite(*left, VectorKind::Left)?;
        let right = finite(*right, VectorKind::Right)?;
        Ok((left - right).abs())
    }
}
