//! Error types for the neighbourly core library.
//!
//! Errors are layered: [`DataSourceError`] is raised by [`crate::Dataset`]
//! implementations, [`SelectionError`] by the per-item selector,
//! [`NeighbourhoodError`] by the factory that drives a full build, and
//! [`LookupError`] by queries against a finished neighbourhood.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::{
    builder::ExecutionStrategy,
    distance::DistanceError,
    shape::{DataShape, InputRestriction},
};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Renders an opaque identifier for inclusion in error payloads.
pub(crate) fn render_id<I: fmt::Debug>(id: &I) -> Arc<str> {
    Arc::from(format!("{id:?}"))
}

/// An error produced by [`crate::Dataset`] operations.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DataSourceError {
    /// Requested index was outside the source's bounds.
    #[error("index {index} is out of bounds")]
    OutOfBounds {
        /// The requested row that exceeded the source bounds.
        index: usize,
    },
    /// Requested identifier is not part of the source.
    #[error("item `{id}` is not part of the data source")]
    MissingItem {
        /// Debug rendering of the missing identifier.
        id: Arc<str>,
    },
    /// Rows within the source had different dimensions.
    #[error("dimension mismatch: left={left}, right={right}")]
    DimensionMismatch {
        /// Dimensionality of the first row.
        left: usize,
        /// Dimensionality of the offending row.
        right: usize,
    },
    /// Data source contained no rows.
    #[error("data source contains no rows")]
    EmptyData,
    /// Data source rows must have positive dimension.
    #[error("data source vectors must have positive dimension")]
    ZeroDimension,
}

define_error_codes! {
    /// Stable codes describing [`DataSourceError`] variants.
    enum DataSourceErrorCode for DataSourceError {
        /// Requested index was outside the source's bounds.
        OutOfBounds => OutOfBounds { .. } => "DATA_SOURCE_OUT_OF_BOUNDS",
        /// Requested identifier is not part of the source.
        MissingItem => MissingItem { .. } => "DATA_SOURCE_MISSING_ITEM",
        /// Rows within the source had different dimensions.
        DimensionMismatch => DimensionMismatch { .. } => "DATA_SOURCE_DIMENSION_MISMATCH",
        /// Data source contained no rows.
        EmptyData => EmptyData => "DATA_SOURCE_EMPTY",
        /// Data source rows must have positive dimension.
        ZeroDimension => ZeroDimension => "DATA_SOURCE_ZERO_DIMENSION",
    }
}

/// Errors raised while selecting the nearest neighbours of a single item.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SelectionError {
    /// The query identifier is not part of the dataset.
    #[error("query `{id}` is not part of the dataset")]
    UnknownQuery {
        /// Debug rendering of the query identifier.
        id: Arc<str>,
    },
    /// The metric produced a NaN or infinite distance.
    #[error("metric returned an invalid distance {value} for (`{left}`, `{right}`)")]
    InvalidDistance {
        /// Query side of the offending pair.
        left: Arc<str>,
        /// Candidate side of the offending pair.
        right: Arc<str>,
        /// The rejected value.
        value: f32,
    },
    /// The metric rejected the pair.
    #[error("metric failed for (`{left}`, `{right}`): {error}")]
    Metric {
        /// Query side of the failing pair.
        left: Arc<str>,
        /// Candidate side of the failing pair.
        right: Arc<str>,
        #[source]
        /// Underlying metric error.
        error: DistanceError,
    },
    /// Wrapped [`crate::Dataset`] error.
    #[error("data source failure: {error}")]
    DataSource {
        #[from]
        /// Underlying data source error.
        error: DataSourceError,
    },
    /// Construction was cancelled through a [`crate::CancellationToken`].
    #[error("neighbourhood construction was cancelled")]
    Cancelled,
}

define_error_codes! {
    /// Stable codes describing [`SelectionError`] variants.
    enum SelectionErrorCode for SelectionError {
        /// The query identifier is not part of the dataset.
        UnknownQuery => UnknownQuery { .. } => "SELECTION_UNKNOWN_QUERY",
        /// The metric produced a NaN or infinite distance.
        InvalidDistance => InvalidDistance { .. } => "SELECTION_INVALID_DISTANCE",
        /// The metric rejected the pair.
        Metric => Metric { .. } => "SELECTION_METRIC_FAILURE",
        /// Wrapped data source error.
        DataSource => DataSource { .. } => "SELECTION_DATA_SOURCE_FAILURE",
        /// Construction was cancelled.
        Cancelled => Cancelled => "SELECTION_CANCELLED",
    }
}

/// Error type produced when configuring a factory or building a
/// [`crate::KnnNeighbourhood`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum NeighbourhoodError {
    /// `k` must not be negative.
    #[error("k must be at least 0 (got {got})")]
    InvalidK {
        /// The rejected neighbour count.
        got: i64,
    },
    /// The metric declared an input restriction no dataset can satisfy.
    #[error("metric `{metric}` declares an unusable input restriction: {reason}")]
    UnusableRestriction {
        /// Name of the metric.
        metric: Arc<str>,
        /// Why the restriction is unusable.
        reason: Arc<str>,
    },
    /// The dataset shape does not satisfy the metric's input restriction.
    #[error("data source `{data_source}` has shape {actual} but the metric accepts {expected}")]
    IncompatibleDataset {
        /// Name of the rejected data source.
        data_source: Arc<str>,
        /// Restriction declared by the metric.
        expected: InputRestriction,
        /// Shape reported by the data source.
        actual: DataShape,
    },
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
    /// The neighbourhood would exceed the configured memory ceiling.
    #[error("data source `{data_source}` needs an estimated {estimated} bytes but the limit is {limit}")]
    MemoryLimitExceeded {
        /// Name of the data source.
        data_source: Arc<str>,
        /// Estimated peak bytes.
        estimated: u64,
        /// Configured ceiling.
        limit: u64,
    },
    /// The dedicated worker pool could not be created.
    #[error("failed to build worker pool: {message}")]
    ThreadPool {
        /// Message reported by Rayon.
        message: Arc<str>,
    },
    /// The data source enumerated the same identifier twice.
    #[error("data source `{data_source}` enumerated `{id}` more than once")]
    DuplicateIdentifier {
        /// Name of the data source.
        data_source: Arc<str>,
        /// Debug rendering of the duplicated identifier.
        id: Arc<str>,
    },
    /// The metric produced a NaN or infinite distance.
    #[error("data source `{data_source}` produced an invalid distance {value} for (`{left}`, `{right}`)")]
    InvalidDistance {
        /// Name of the data source.
        data_source: Arc<str>,
        /// Query side of the offending pair.
        left: Arc<str>,
        /// Candidate side of the offending pair.
        right: Arc<str>,
        /// The rejected value.
        value: f32,
    },
    /// The metric rejected a pair of items.
    #[error("metric failed on data source `{data_source}` for (`{left}`, `{right}`): {error}")]
    Metric {
        /// Name of the data source.
        data_source: Arc<str>,
        /// Query side of the failing pair.
        left: Arc<str>,
        /// Candidate side of the failing pair.
        right: Arc<str>,
        #[source]
        /// Underlying metric error.
        error: DistanceError,
    },
    /// A [`crate::Dataset`] operation failed while building.
    #[error("data source `{data_source}` failed: {error}")]
    DataSource {
        /// Identifier for the data source that produced the error.
        data_source: Arc<str>,
        #[source]
        /// Underlying data source error.
        error: DataSourceError,
    },
    /// Construction was cancelled through a [`crate::CancellationToken`].
    #[error("neighbourhood construction for `{data_source}` was cancelled")]
    Cancelled {
        /// Name of the data source.
        data_source: Arc<str>,
    },
}

define_error_codes! {
    /// Stable codes describing [`NeighbourhoodError`] variants.
    enum NeighbourhoodErrorCode for NeighbourhoodError {
        /// `k` must not be negative.
        InvalidK => InvalidK { .. } => "NEIGHBOURHOOD_INVALID_K",
        /// The metric declared an unusable input restriction.
        UnusableRestriction => UnusableRestriction { .. } => "NEIGHBOURHOOD_UNUSABLE_RESTRICTION",
        /// The dataset shape does not satisfy the metric's input restriction.
        IncompatibleDataset => IncompatibleDataset { .. } => "NEIGHBOURHOOD_INCOMPATIBLE_DATASET",
        /// The requested execution strategy is unavailable in the current build.
        BackendUnavailable => BackendUnavailable { .. } => "NEIGHBOURHOOD_BACKEND_UNAVAILABLE",
        /// The neighbourhood would exceed the configured memory ceiling.
        MemoryLimitExceeded => MemoryLimitExceeded { .. } => "NEIGHBOURHOOD_MEMORY_LIMIT_EXCEEDED",
        /// The dedicated worker pool could not be created.
        ThreadPool => ThreadPool { .. } => "NEIGHBOURHOOD_THREAD_POOL",
        /// The data source enumerated the same identifier twice.
        DuplicateIdentifier => DuplicateIdentifier { .. } => "NEIGHBOURHOOD_DUPLICATE_IDENTIFIER",
        /// The metric produced a NaN or infinite distance.
        InvalidDistance => InvalidDistance { .. } => "NEIGHBOURHOOD_INVALID_DISTANCE",
        /// The metric rejected a pair of items.
        MetricFailure => Metric { .. } => "NEIGHBOURHOOD_METRIC_FAILURE",
        /// A data source operation failed while building.
        DataSourceFailure => DataSource { .. } => "NEIGHBOURHOOD_DATA_SOURCE_FAILURE",
        /// Construction was cancelled.
        Cancelled => Cancelled { .. } => "NEIGHBOURHOOD_CANCELLED",
    }
}

impl NeighbourhoodError {
    /// Retrieve the inner [`DataSourceErrorCode`] when the error originated in a [`crate::Dataset`].
    #[must_use]
    pub const fn data_source_code(&self) -> Option<DataSourceErrorCode> {
        match self {
            Self::DataSource { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    /// Reports whether the error was raised before any distance was computed.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidK { .. }
                | Self::UnusableRestriction { .. }
                | Self::IncompatibleDataset { .. }
                | Self::BackendUnavailable { .. }
                | Self::MemoryLimitExceeded { .. }
                | Self::ThreadPool { .. }
        )
    }

    pub(crate) fn from_selection(data_source: &str, error: SelectionError) -> Self {
        let data_source = Arc::from(data_source);
        match error {
            SelectionError::InvalidDistance { left, right, value } => Self::InvalidDistance {
                data_source,
                left,
                right,
                value,
            },
            SelectionError::Metric { left, right, error } => Self::Metric {
                data_source,
                left,
                right,
                error,
            },
            SelectionError::DataSource { error } => Self::DataSource { data_source, error },
            SelectionError::UnknownQuery { id } => Self::DataSource {
                data_source,
                error: DataSourceError::MissingItem { id },
            },
            SelectionError::Cancelled => Self::Cancelled { data_source },
        }
    }
}

/// Error returned when querying a finished neighbourhood.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum LookupError {
    /// The identifier was not part of the dataset at build time.
    #[error("`{id}` was not part of the dataset this neighbourhood was built from")]
    UnknownIdentifier {
        /// Debug rendering of the unknown identifier.
        id: Arc<str>,
    },
}

define_error_codes! {
    /// Stable codes describing [`LookupError`] variants.
    enum LookupErrorCode for LookupError {
        /// The identifier was not part of the dataset at build time.
        UnknownIdentifier => UnknownIdentifier { .. } => "LOOKUP_UNKNOWN_IDENTIFIER",
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, NeighbourhoodError>;
