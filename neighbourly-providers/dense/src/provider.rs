//! Dense matrix provider implementation and ingestion utilities.
use std::{fs::File, path::Path, sync::Arc};

use arrow_array::{Array, FixedSizeListArray, RecordBatch, RecordBatchReader};
use neighbourly_core::{DataShape, DataSourceError, Dataset};
use parquet::arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder};
use parquet::file::reader::ChunkReader;
use tracing::{debug, instrument};

use crate::errors::DenseMatrixProviderError;
use crate::ingest::{append_fixed_size_list_values, push_finite_row, validate_fixed_size_list_field};

/// Dense matrix provider backed by a contiguous row-major buffer.
///
/// Rows are identified by their zero-based index and exposed as `[f32]`
/// slices with a `vector[d]` shape.
///
/// # Examples
/// ```
/// use neighbourly_core::{Dataset, Euclidean, NeighbourSetPredicate, NeighbourhoodFactoryBuilder};
/// use neighbourly_providers_dense::DenseMatrixProvider;
///
/// let rows = DenseMatrixProvider::try_from_rows(
///     "demo",
///     vec![vec![0.0, 0.0], vec![3.0, 4.0], vec![30.0, 40.0]],
/// )?;
/// assert_eq!(rows.len(), 3);
///
/// let neighbourhood = NeighbourhoodFactoryBuilder::new(Euclidean)
///     .with_k(1)
///     .build()?
///     .build(&rows)?;
/// assert_eq!(neighbourhood.neighbour_ids(&0)?, [1]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct DenseMatrixProvider {
    name: Arc<str>,
    rows: usize,
    dimension: usize,
    values: Vec<f32>,
}

impl DenseMatrixProvider {
    fn from_parts(name: impl Into<Arc<str>>, rows: usize, dimension: usize, values: Vec<f32>) -> Self {
        debug_assert_eq!(values.len(), rows.saturating_mul(dimension));
        Self {
            name: name.into(),
            rows,
            dimension,
            values,
        }
    }

    /// Builds a provider from in-memory rows of equal, positive length.
    ///
    /// # Errors
    /// Returns [`DenseMatrixProviderError::ZeroDimension`] for empty rows,
    /// [`DenseMatrixProviderError::InvalidRowLength`] when lengths differ and
    /// [`DenseMatrixProviderError::NonFiniteValue`] for NaN or infinite
    /// components. An empty `rows` yields an empty provider.
    pub fn try_from_rows(
        name: impl Into<Arc<str>>,
        rows: Vec<Vec<f32>>,
    ) -> Result<Self, DenseMatrixProviderError> {
        let Some(first) = rows.first() else {
            return Ok(Self::from_parts(name, 0, 0, Vec::new()));
        };
        let dimension = first.len();
        if dimension == 0 {
            return Err(DenseMatrixProviderError::ZeroDimension);
        }
        let capacity = rows.len().checked_mul(dimension).ok_or(
            DenseMatrixProviderError::CapacityOverflow {
                rows: rows.len(),
                dimension,
            },
        )?;
        let mut values = Vec::with_capacity(capacity);
        for (row, entries) in rows.iter().enumerate() {
            if entries.len() != dimension {
                return Err(DenseMatrixProviderError::InvalidRowLength {
                    row,
                    expected: dimension,
                    actual: entries.len(),
                });
            }
            push_finite_row(entries, row, &mut values)?;
        }
        Ok(Self::from_parts(name, rows.len(), dimension, values))
    }

    /// Returns the dimensionality of each row.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the underlying row-major matrix.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.values
    }

    /// Loads data from an Arrow [`FixedSizeListArray`].
    ///
    /// # Errors
    /// Returns a [`DenseMatrixProviderError`] when the array is not a
    /// non-null `FixedSizeList<Float32, D>` of finite values.
    pub fn try_from_fixed_size_list(
        name: impl Into<Arc<str>>,
        array: &FixedSizeListArray,
    ) -> Result<Self, DenseMatrixProviderError> {
        let mut values = Vec::new();
        let dimension = append_fixed_size_list_values(array, None, 0, &mut values)?;
        Ok(Self::from_parts(name, array.len(), dimension, values))
    }

    /// Loads data from a Parquet column containing `FixedSizeList<Float32, D>` rows.
    ///
    /// # Errors
    /// Returns [`DenseMatrixProviderError::Io`] when the file cannot be
    /// opened, and the errors of
    /// [`DenseMatrixProvider::try_from_parquet_reader`] otherwise.
    pub fn try_from_parquet_path(
        name: impl Into<Arc<str>>,
        path: impl AsRef<Path>,
        column: &str,
    ) -> Result<Self, DenseMatrixProviderError> {
        let file = File::open(path)?;
        Self::try_from_parquet_reader(name, file, column)
    }

    /// Loads data from a Parquet reader.
    ///
    /// # Errors
    /// Returns [`DenseMatrixProviderError::ColumnNotFound`] for an unknown
    /// column, schema errors for nullable or mistyped columns, and wrapped
    /// Arrow or Parquet errors for unreadable input.
    #[instrument(name = "dense.load_parquet", err, skip(name, reader))]
    pub fn try_from_parquet_reader<R>(
        name: impl Into<Arc<str>>,
        reader: R,
        column: &str,
    ) -> Result<Self, DenseMatrixProviderError>
    where
        R: ChunkReader + Send + 'static,
    {
        let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
        let mask = ProjectionMask::columns(builder.parquet_schema(), [column]);
        let reader = builder.with_projection(mask).build()?;
        let schema = reader.schema();
        let column_index =
            schema
                .index_of(column)
                .map_err(|_| DenseMatrixProviderError::ColumnNotFound {
                    column: column.to_owned(),
                })?;
        let dimension = validate_fixed_size_list_field(schema.field(column_index), column)?;
        let batches = reader.map(|batch| batch.map_err(DenseMatrixProviderError::from));
        let provider =
            collect_batches(name, column, column_index, Some(dimension), batches)?;
        debug!(
            rows = provider.rows,
            dimension = provider.dimension,
            "loaded dense matrix"
        );
        Ok(provider)
    }

    /// Loads `column` from in-memory record batches.
    ///
    /// Every batch must carry a `FixedSizeList<Float32>` column of one
    /// width. An empty batch list yields an empty provider.
    ///
    /// # Errors
    /// Returns [`DenseMatrixProviderError::ColumnNotFound`] when the first
    /// batch lacks `column`, and
    /// [`DenseMatrixProviderError::InconsistentBatchDimension`] when widths
    /// differ between batches.
    pub fn try_from_record_batches(
        name: impl Into<Arc<str>>,
        column: &str,
        batches: Vec<RecordBatch>,
    ) -> Result<Self, DenseMatrixProviderError> {
        let Some(first) = batches.first() else {
            return Ok(Self::from_parts(name, 0, 0, Vec::new()));
        };
        let column_index = first.schema().index_of(column).map_err(|_| {
            DenseMatrixProviderError::ColumnNotFound {
                column: column.to_owned(),
            }
        })?;
        collect_batches(name, column, column_index, None, batches.into_iter().map(Ok))
    }

    fn row_slice(&self, index: usize) -> Result<&[f32], DataSourceError> {
        let start = index
            .checked_mul(self.dimension)
            .ok_or(DataSourceError::OutOfBounds { index })?;
        let end = start
            .checked_add(self.dimension)
            .ok_or(DataSourceError::OutOfBounds { index })?;
        if index >= self.rows {
            return Err(DataSourceError::OutOfBounds { index });
        }
        self.values
            .get(start..end)
            .ok_or(DataSourceError::OutOfBounds { index })
    }
}

fn collect_batches(
    name: impl Into<Arc<str>>,
    column: &str,
    column_index: usize,
    mut dimension: Option<usize>,
    batches: impl Iterator<Item = Result<RecordBatch, DenseMatrixProviderError>>,
) -> Result<DenseMatrixProvider, DenseMatrixProviderError> {
    let mut values = Vec::new();
    let mut rows = 0_usize;
    for batch in batches {
        let batch = batch?;
        let column_array = batch.column(column_index);
        let list = column_array
            .as_any()
            .downcast_ref::<FixedSizeListArray>()
            .ok_or_else(|| DenseMatrixProviderError::InvalidColumnType {
                column: column.to_owned(),
                actual: column_array.data_type().clone(),
            })?;
        dimension = Some(append_fixed_size_list_values(
            list,
            dimension,
            rows,
            &mut values,
        )?);
        rows = rows.saturating_add(list.len());
    }
    Ok(DenseMatrixProvider::from_parts(
        name,
        rows,
        dimension.unwrap_or(0),
        values,
    ))
}

impl Dataset for DenseMatrixProvider {
    type Id = usize;
    type Item = [f32];

    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.rows
    }

    fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        0..self.rows
    }

    fn contains(&self, id: &usize) -> bool {
        *id < self.rows
    }

    fn item(&self, id: &usize) -> Result<&[f32], DataSourceError> {
        self.row_slice(*id)
    }

    fn shape(&self) -> DataShape {
        DataShape::vectors(self.dimension)
    }
}
