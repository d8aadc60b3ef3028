//! Command implementations and argument parsing for the neighbourly CLI.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use neighbourly_core::{
    Cosine, Dataset, DistanceCacheConfig, Euclidean, ExecutionStrategy, KnnNeighbourhood, Metric,
    NeighbourhoodError, NeighbourhoodFactoryBuilder,
};
use neighbourly_providers_dense::{DenseMatrixProvider, DenseMatrixProviderError};
use neighbourly_providers_text::{
    CharLengthDifference, Levenshtein, TextProvider, TextProviderError,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "neighbourly",
    about = "Precompute the k nearest neighbours of every item in a data source."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Build the neighbourhood and print every neighbour list.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Number of neighbours to keep per item.
    #[arg(long, allow_negative_numbers = true)]
    pub k: i64,

    /// Compute every list on the calling thread.
    #[arg(long, conflicts_with = "threads")]
    pub sequential: bool,

    /// Size of a dedicated worker pool for parallel builds.
    #[arg(long)]
    pub threads: Option<NonZeroUsize>,

    /// Reject builds whose estimated memory exceeds this size (e.g. `512M`).
    #[arg(long = "max-bytes", value_parser = parse_byte_size)]
    pub max_bytes: Option<u64>,

    /// Reuse each symmetric distance instead of evaluating it twice.
    #[arg(long)]
    pub cache: bool,

    /// Data source configuration.
    #[command(subcommand)]
    pub source: RunSource,
}

/// Input data sources supported by the CLI.
#[derive(Debug, Subcommand, Clone)]
pub enum RunSource {
    /// Read a Parquet file containing a `FixedSizeList<Float32, D>` column.
    Parquet(ParquetArgs),
    /// Read a UTF-8 text corpus, one item per line.
    Text(TextArgs),
}

/// Parquet ingestion arguments.
#[derive(Debug, Args, Clone)]
pub struct ParquetArgs {
    /// Path to the Parquet file containing feature vectors.
    pub path: PathBuf,

    /// Column containing `FixedSizeList<Float32, D>` rows.
    #[arg(long)]
    pub column: String,

    /// Distance metric to use when comparing rows.
    #[arg(long, value_enum, default_value_t = VectorMetric::Euclidean)]
    pub metric: VectorMetric,

    /// Override name for the data source (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Text ingestion arguments.
#[derive(Debug, Args, Clone)]
pub struct TextArgs {
    /// Path to a UTF-8 text file with one string per line.
    pub path: PathBuf,

    /// Distance metric to use when comparing lines.
    #[arg(long, value_enum)]
    pub metric: TextMetric,

    /// Override name for the data source (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Supported vector metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VectorMetric {
    /// Straight-line distance.
    Euclidean,
    /// One minus cosine similarity.
    Cosine,
}

/// Supported text metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TextMetric {
    /// Levenshtein edit distance between lines.
    Levenshtein,
    /// Difference in character counts between lines.
    Length,
}

impl VectorMetric {
    const fn label(self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::Cosine => "cosine",
        }
    }
}

impl TextMetric {
    const fn label(self) -> &'static str {
        match self {
            Self::Levenshtein => "levenshtein",
            Self::Length => "length",
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CliError {
    /// File I/O failed while loading an input source.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Dense matrix ingestion failed.
    #[error(transparent)]
    Dense(#[from] DenseMatrixProviderError),
    /// Text ingestion failed.
    #[error(transparent)]
    Text(#[from] TextProviderError),
    /// Neighbourhood construction failed.
    #[error(transparent)]
    Core(#[from] NeighbourhoodError),
}

impl CliError {
    /// Names the pipeline stage that failed, for structured logs.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Io { .. } => "open",
            Self::Dense(_) | Self::Text(_) => "load",
            Self::Core(_) => "build",
        }
    }

    /// Returns the neighbourhood error when construction itself failed.
    #[must_use]
    pub const fn neighbourhood_error(&self) -> Option<&NeighbourhoodError> {
        match self {
            Self::Core(error) => Some(error),
            _ => None,
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name reported by the data source implementation.
    pub data_source: String,
    /// Neighbour lists keyed by row or line number.
    pub neighbourhood: KnnNeighbourhood<usize>,
}

/// Factory settings shared by every data source.
#[derive(Debug, Clone, Copy)]
struct RunSettings {
    k: i64,
    sequential: bool,
    threads: Option<NonZeroUsize>,
    max_bytes: Option<u64>,
    cache: bool,
}

impl RunSettings {
    const fn strategy(&self) -> ExecutionStrategy {
        if self.sequential {
            ExecutionStrategy::Sequential
        } else {
            ExecutionStrategy::Auto
        }
    }

    fn build<D, M>(&self, metric: M, dataset: &D) -> Result<KnnNeighbourhood<usize>, CliError>
    where
        D: Dataset<Id = usize, Item = M::Item> + Sync,
        M: Metric + Sync,
    {
        let mut builder = NeighbourhoodFactoryBuilder::new(metric)
            .with_k(self.k)
            .with_execution_strategy(self.strategy())
            .with_max_bytes(self.max_bytes)
            .with_distance_cache(self.cache.then(DistanceCacheConfig::default));
        if let Some(threads) = self.threads {
            builder = builder.with_max_threads(threads);
        }
        Ok(builder.build()?.build(dataset)?)
    }
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading the data source or building the
/// neighbourhood fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use neighbourly_cli::cli::{Cli, Command, RunCommand, RunSource, TextArgs, TextMetric, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "alpha\nbeta\n")?;
/// let cli = Cli {
///     command: Command::Run(RunCommand {
///         k: 1,
///         sequential: false,
///         threads: None,
///         max_bytes: None,
///         cache: false,
///         source: RunSource::Text(TextArgs {
///             path: file.path().to_path_buf(),
///             metric: TextMetric::Levenshtein,
///             name: None,
///         }),
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.neighbourhood.len(), 2);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(k = field::Empty, strategy = field::Empty, source = field::Empty),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let RunCommand {
        k,
        sequential,
        threads,
        max_bytes,
        cache,
        source,
    } = command;
    let settings = RunSettings {
        k,
        sequential,
        threads,
        max_bytes,
        cache,
    };

    let span = Span::current();
    span.record("k", k);
    span.record("strategy", field::debug(settings.strategy()));

    let summary = match source {
        RunSource::Parquet(args) => {
            span.record("source", field::display("parquet"));
            run_parquet(&settings, args)?
        }
        RunSource::Text(args) => {
            span.record("source", field::display("text"));
            run_text(&settings, args)?
        }
    };

    info!(
        data_source = summary.data_source.as_str(),
        items = summary.neighbourhood.len(),
        "command completed"
    );
    Ok(summary)
}

#[instrument(
    name = "cli.run_parquet",
    err,
    skip(settings, args),
    fields(
        path = field::Empty,
        column = field::Empty,
        metric = field::Empty,
        override_name = field::Empty,
    ),
)]
fn run_parquet(settings: &RunSettings, args: ParquetArgs) -> Result<ExecutionSummary, CliError> {
    let ParquetArgs {
        path,
        column,
        metric,
        name,
    } = args;
    let span = Span::current();
    span.record("path", field::display(path.display()));
    span.record("column", field::display(&column));
    span.record("metric", field::display(metric.label()));
    span.record(
        "override_name",
        field::display(name.as_deref().unwrap_or("<derived>")),
    );
    let chosen_name = derive_data_source_name(&path, name.as_deref());
    let provider = DenseMatrixProvider::try_from_parquet_path(chosen_name, &path, &column)?;
    let neighbourhood = match metric {
        VectorMetric::Euclidean => settings.build(Euclidean, &provider)?,
        VectorMetric::Cosine => settings.build(Cosine, &provider)?,
    };
    info!(
        data_source = provider.name(),
        dimension = provider.dimension(),
        "parquet execution completed"
    );
    Ok(ExecutionSummary {
        data_source: provider.name().to_owned(),
        neighbourhood,
    })
}

#[instrument(
    name = "cli.run_text",
    err,
    skip(settings, args),
    fields(path = field::Empty, metric = field::Empty, override_name = field::Empty),
)]
fn run_text(settings: &RunSettings, args: TextArgs) -> Result<ExecutionSummary, CliError> {
    let TextArgs { path, metric, name } = args;
    let span = Span::current();
    span.record("path", field::display(path.display()));
    span.record("metric", field::display(metric.label()));
    span.record(
        "override_name",
        field::display(name.as_deref().unwrap_or("<derived>")),
    );
    let chosen_name = derive_data_source_name(&path, name.as_deref());
    let reader = open_text_reader(&path)?;
    let provider = TextProvider::try_from_reader(chosen_name, reader)?;
    let neighbourhood = match metric {
        TextMetric::Levenshtein => settings.build(Levenshtein, &provider)?,
        TextMetric::Length => settings.build(CharLengthDifference, &provider)?,
    };
    info!(
        data_source = provider.name(),
        lines = provider.len(),
        "text execution completed"
    );
    Ok(ExecutionSummary {
        data_source: provider.name().to_owned(),
        neighbourhood,
    })
}

#[instrument(name = "cli.open_text_reader", err, fields(path = field::Empty))]
pub(super) fn open_text_reader(path: &Path) -> Result<BufReader<File>, CliError> {
    Span::current().record("path", field::display(path.display()));
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

pub(super) fn derive_data_source_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "data_source".to_owned(), ToOwned::to_owned)
}

/// Parses a byte count with an optional binary suffix (`K`, `M`, `G`, `T`,
/// optionally followed by `B` or `iB`, case-insensitive).
pub(super) fn parse_byte_size(raw: &str) -> Result<u64, String> {
    let trimmed = raw.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, suffix) = trimmed.split_at(split);
    if digits.is_empty() {
        return Err(format!("`{raw}` does not start with a byte count"));
    }
    let value = digits
        .parse::<u64>()
        .map_err(|err| format!("invalid byte count `{digits}`: {err}"))?;
    let multiplier: u64 = match suffix.to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" | "KIB" => 1 << 10,
        "M" | "MB" | "MIB" => 1 << 20,
        "G" | "GB" | "GIB" => 1 << 30,
        "T" | "TB" | "TIB" => 1 << 40,
        other => return Err(format!("unknown size suffix `{other}`")),
    };
    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("`{raw}` does not fit in 64 bits"))
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// Each item is printed on its own line followed by its neighbours as
/// tab-separated `id=distance` pairs, nearest first.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use neighbourly_cli::cli::{ExecutionSummary, render_summary};
/// # use neighbourly_core::{DataShape, InMemoryDataset, AbsoluteDifference, NeighbourhoodFactoryBuilder};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let points = InMemoryDataset::<usize, f32>::new("demo", [(0, 0.0_f32), (1, 2.0)])
///     .with_shape(DataShape::scalars());
/// let neighbourhood = NeighbourhoodFactoryBuilder::new(AbsoluteDifference)
///     .with_k(1)
///     .build()?
///     .build(&points)?;
/// let summary = ExecutionSummary { data_source: "demo".into(), neighbourhood };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert_eq!(
///     String::from_utf8(buffer)?,
///     "data source: demo\nmetric: absolute-difference\nk: 1\n0\t1=2\n1\t0=2\n",
/// );
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let neighbourhood = &summary.neighbourhood;
    writeln!(writer, "data source: {}", summary.data_source)?;
    writeln!(writer, "metric: {}", neighbourhood.metric_name())?;
    writeln!(writer, "k: {}", neighbourhood.k())?;
    for (id, neighbours) in neighbourhood.iter() {
        write!(writer, "{id}")?;
        for neighbour in neighbours {
            write!(writer, "\t{}={}", neighbour.id, neighbour.distance)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
