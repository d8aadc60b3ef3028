//! Distance metrics.
//!
//! [`Metric`] is the seam through which the selector evaluates pairs. The
//! built-in vector metrics validate their inputs and surface detailed errors
//! so a malformed row fails the build instead of producing a misleading
//! neighbourhood.

mod cosine;
mod euclidean;
mod helpers;
mod metric;
mod scalar;
mod types;

pub use self::cosine::{Cosine, cosine_distance};
pub use self::euclidean::{Euclidean, euclidean_distance};
pub use self::metric::{FnMetric, Metric};
pub use self::scalar::AbsoluteDifference;
pub use self::types::{DistanceError, Norm, Vector, VectorKind};
