//! Unit tests for the CLI commands and data ingestion helpers.

use super::commands::{derive_data_source_name, run_command};
use super::test_fixtures::create_parquet_file;
use super::test_helpers::{
    TestResult, create_text_file, run_cli_expecting_error, run_command_expecting_error, temp_dir,
    text_command,
};
use super::{
    Cli, CliError, Command, ParquetArgs, RunCommand, RunSource, TextMetric, VectorMetric,
    render_summary, run_cli,
};

use std::num::NonZeroUsize;
use std::path::Path;

use clap::Parser;
use neighbourly_core::{NeighbourSetPredicate, NeighbourhoodError};
use neighbourly_providers_dense::DenseMatrixProviderError;
use neighbourly_providers_text::TextProviderError;
use neighbourly_test_support::tracing::RecordingLayer;
use rstest::rstest;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

const LENGTHS: &str = "a\nbb\nccc\ndddddddddd\n";

fn parquet_command(path: std::path::PathBuf, metric: VectorMetric) -> RunCommand {
    RunCommand {
        k: 2,
        sequential: false,
        threads: None,
        max_bytes: None,
        cache: false,
        source: RunSource::Parquet(ParquetArgs {
            path,
            column: "features".into(),
            metric,
            name: Some("points".into()),
        }),
    }
}

#[rstest]
#[case::override_name("/tmp/source.parquet", Some("override"), "override")]
#[case::stem_with_extension("/tmp/source.parquet", None, "source")]
#[case::stem_without_extension("/tmp/source", None, "source")]
#[case::missing_stem("", None, "data_source")]
fn derive_data_source_name_selects_expected_name(
    #[case] raw_path: &str,
    #[case] override_name: Option<&'static str>,
    #[case] expected: &str,
) {
    let path = Path::new(raw_path);
    let name = derive_data_source_name(path, override_name);
    assert_eq!(name, expected);
}

#[rstest]
#[case::parallel(false, None, false)]
#[case::sequential(true, None, false)]
#[case::dedicated_pool(false, NonZeroUsize::new(2), false)]
#[case::cached(false, None, true)]
fn run_text_orders_neighbours_by_distance(
    #[case] sequential: bool,
    #[case] threads: Option<NonZeroUsize>,
    #[case] cache: bool,
) -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "lines.txt", LENGTHS)?;
    let mut command = text_command(path, 2, TextMetric::Length);
    command.sequential = sequential;
    command.threads = threads;
    command.cache = cache;

    let summary = run_command(command)?;
    let neighbourhood = &summary.neighbourhood;
    assert_eq!(summary.data_source, "lines");
    assert_eq!(neighbourhood.neighbour_ids(&0)?, [1, 2]);
    assert_eq!(neighbourhood.neighbour_ids(&1)?, [0, 2]);
    assert_eq!(neighbourhood.neighbour_ids(&3)?, [2, 1]);
    Ok(())
}

#[rstest]
fn run_text_with_levenshtein() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "words.txt", "cat\nbat\ncart\n")?;
    let cli = Cli {
        command: Command::Run(text_command(path, 1, TextMetric::Levenshtein)),
    };
    let summary = run_cli(cli)?;
    assert_eq!(summary.neighbourhood.metric_name(), "levenshtein");
    assert_eq!(summary.neighbourhood.neighbour_ids(&2)?, [0]);
    Ok(())
}

#[rstest]
fn run_text_rejects_empty_files() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "empty.txt", "")?;
    let cli = Cli {
        command: Command::Run(text_command(path, 1, TextMetric::Levenshtein)),
    };
    let err = run_cli_expecting_error(cli, "empty input must fail");
    assert!(matches!(err, CliError::Text(TextProviderError::EmptyInput)));
    Ok(())
}

#[rstest]
fn run_parquet_success() -> TestResult {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "vectors.parquet")?;
    let summary = run_command(parquet_command(path, VectorMetric::Euclidean))?;
    assert_eq!(summary.data_source, "points");
    assert_eq!(summary.neighbourhood.len(), 4);
    assert_eq!(summary.neighbourhood.neighbour_ids(&0)?, [1, 2]);
    assert_eq!(summary.neighbourhood.neighbour_ids(&3)?, [2, 1]);
    Ok(())
}

#[rstest]
fn run_parquet_cosine_rejects_zero_vector() -> TestResult {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "vectors.parquet")?;
    let err = run_command_expecting_error(
        parquet_command(path, VectorMetric::Cosine),
        "the origin has no direction",
    );
    assert!(matches!(
        err,
        CliError::Core(NeighbourhoodError::Metric { .. })
    ));
    Ok(())
}

#[rstest]
fn run_parquet_rejects_missing_column() -> TestResult {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "vectors.parquet")?;
    let mut command = parquet_command(path, VectorMetric::Euclidean);
    if let RunSource::Parquet(args) = &mut command.source {
        args.column = "unknown".into();
    }
    let err = run_command_expecting_error(command, "unknown column must fail");
    assert!(matches!(
        err,
        CliError::Dense(DenseMatrixProviderError::ColumnNotFound { .. })
    ));
    Ok(())
}

#[rstest]
fn negative_k_is_rejected_by_the_factory() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "lines.txt", LENGTHS)?;
    let path_arg = path.to_string_lossy().into_owned();
    let cli = Cli::try_parse_from([
        "neighbourly",
        "run",
        "--k",
        "-1",
        "text",
        path_arg.as_str(),
        "--metric",
        "length",
    ])?;
    let err = run_cli_expecting_error(cli, "negative k must fail");
    assert!(matches!(
        err,
        CliError::Core(NeighbourhoodError::InvalidK { got: -1 })
    ));
    Ok(())
}

#[rstest]
fn render_summary_outputs_every_list() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "lines.txt", LENGTHS)?;
    let summary = run_command(text_command(path, 2, TextMetric::Length))?;
    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer)?;
    let text = String::from_utf8(buffer)?;
    assert_eq!(
        text,
        concat!(
            "data source: lines\n",
            "metric: char-length-difference\n",
            "k: 2\n",
            "0\t1=1\t2=2\n",
            "1\t0=1\t2=1\n",
            "2\t1=1\t0=2\n",
            "3\t2=7\t1=8\n",
        )
    );
    Ok(())
}

#[rstest]
#[case::unknown_metric(&["neighbourly", "run", "--k", "2", "text", "data.txt", "--metric", "unsupported"])]
#[case::missing_k(&["neighbourly", "run", "text", "data.txt", "--metric", "length"])]
#[case::zero_threads(&["neighbourly", "run", "--k", "2", "--threads", "0", "text", "data.txt", "--metric", "length"])]
#[case::sequential_with_threads(&["neighbourly", "run", "--k", "2", "--sequential", "--threads", "2", "text", "data.txt", "--metric", "length"])]
fn clap_rejects_invalid_arguments(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err());
}

#[rstest]
fn clap_defaults_parquet_metric_to_euclidean() {
    let cli = Cli::try_parse_from([
        "neighbourly",
        "run",
        "--k",
        "4",
        "parquet",
        "data.parquet",
        "--column",
        "features",
    ])
    .expect("valid args must parse");
    let Command::Run(command) = cli.command;
    assert_eq!(command.k, 4);
    assert!(matches!(
        command.source,
        RunSource::Parquet(ParquetArgs {
            metric: VectorMetric::Euclidean,
            ..
        })
    ));
}

#[rstest]
fn run_command_emits_tracing_fields() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "lines.txt", LENGTHS)?;
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    let command = text_command(path, 2, TextMetric::Length);
    let summary = tracing::subscriber::with_default(subscriber, || run_command(command))?;
    assert_eq!(summary.data_source, "lines");

    let execute = layer.span("cli.execute").expect("cli.execute span must exist");
    assert_eq!(execute.field("k"), Some("2"));
    assert_eq!(execute.field("strategy"), Some("Auto"));
    assert_eq!(execute.field("source"), Some("text"));

    let text_span = layer.span("cli.run_text").expect("cli.run_text span must exist");
    assert!(
        text_span
            .field("path")
            .is_some_and(|value| value.ends_with("lines.txt"))
    );
    assert_eq!(text_span.field("metric"), Some("length"));
    assert_eq!(text_span.field("override_name"), Some("<derived>"));

    let build = layer
        .span("neighbourhood.build")
        .expect("neighbourhood.build span must exist");
    assert_eq!(build.field("metric"), Some("char-length-difference"));
    assert_eq!(build.field("items"), Some("4"));

    assert!(layer.events_at(Level::INFO).iter().any(|event| {
        event.field("message") == Some("command completed")
            && event.field("data_source") == Some("lines")
    }));
    Ok(())
}

#[rstest]
fn open_text_reader_records_path_on_error() -> TestResult {
    let dir = temp_dir();
    let missing_path = dir.path().join("missing.txt");
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    let command = text_command(missing_path, 1, TextMetric::Levenshtein);
    let err = tracing::subscriber::with_default(subscriber, || run_command(command))
        .expect_err("missing file must fail");
    assert!(matches!(err, CliError::Io { .. }));

    let reader_span = layer
        .span("cli.open_text_reader")
        .expect("reader span must exist");
    assert!(
        reader_span
            .field("path")
            .is_some_and(|value| value.ends_with("missing.txt"))
    );

    let run_span = layer.span("cli.run_text").expect("run_text span must exist");
    assert_eq!(run_span.field("override_name"), Some("<derived>"));
    Ok(())
}
