//! Tests for the `--max-bytes` memory guard and `parse_byte_size` parser.

use super::commands::{parse_byte_size, run_command};
use super::{CliError, Cli, Command, TextMetric};

use clap::Parser;
use neighbourly_core::NeighbourhoodError;
use rstest::rstest;

use super::test_helpers::{
    TestResult, create_text_file, run_command_expecting_error, temp_dir, text_command,
};

// -- parse_byte_size: happy paths -------------------------------------------

#[rstest]
#[case::plain_bytes("1024", 1024)]
#[case::zero("0", 0)]
#[case::bytes_suffix("512B", 512)]
#[case::suffix_k_lower("100k", 100 * 1024)]
#[case::suffix_k_upper("100K", 100 * 1024)]
#[case::suffix_kb("100KB", 100 * 1024)]
#[case::suffix_kib("100KiB", 100 * 1024)]
#[case::suffix_m_lower("512m", 512 * 1024 * 1024)]
#[case::suffix_mb("512MB", 512 * 1024 * 1024)]
#[case::suffix_mib("512MiB", 512 * 1024 * 1024)]
#[case::suffix_g_upper("2G", 2 * 1024 * 1024 * 1024)]
#[case::suffix_gib("2GiB", 2 * 1024 * 1024 * 1024)]
#[case::suffix_t("1T", 1024_u64 * 1024 * 1024 * 1024)]
#[case::suffix_tib("1TiB", 1024_u64 * 1024 * 1024 * 1024)]
#[case::padded(" 64M ", 64 * 1024 * 1024)]
fn parse_byte_size_accepts_valid_input(#[case] input: &str, #[case] expected: u64) {
    assert_eq!(
        parse_byte_size(input).expect("valid input must parse"),
        expected
    );
}

// -- parse_byte_size: unhappy paths -----------------------------------------

#[rstest]
#[case::empty("")]
#[case::only_suffix("M")]
#[case::unknown_suffix("100X")]
#[case::negative("-100")]
#[case::decimal("1.5G")]
fn parse_byte_size_rejects_invalid_input(#[case] input: &str) {
    assert!(
        parse_byte_size(input).is_err(),
        "expected `{input}` to be rejected"
    );
}

#[rstest]
fn parse_byte_size_rejects_overflow() {
    assert!(parse_byte_size("18446744073709551615T").is_err());
}

// -- CLI memory guard: integration ------------------------------------------

#[rstest]
fn run_command_rejects_when_max_bytes_exceeded() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "lines.txt", "alpha\nbeta\ngamma\n")?;
    let mut command = text_command(path, 2, TextMetric::Levenshtein);
    command.max_bytes = Some(16);

    let err = run_command_expecting_error(command, "16-byte limit must be exceeded");
    assert!(
        matches!(
            err,
            CliError::Core(NeighbourhoodError::MemoryLimitExceeded { limit: 16, .. })
        ),
        "expected MemoryLimitExceeded, got {err:?}"
    );
    Ok(())
}

#[rstest]
fn run_command_succeeds_when_max_bytes_sufficient() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "lines.txt", "alpha\nbeta\ngamma\n")?;
    let mut command = text_command(path, 2, TextMetric::Levenshtein);
    command.max_bytes = Some(1_073_741_824);

    let summary = run_command(command)?;
    assert_eq!(summary.neighbourhood.len(), 3);
    Ok(())
}

#[rstest]
fn run_command_zero_max_bytes_rejects_any_dataset() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "lines.txt", "alpha\nbeta\n")?;
    let mut command = text_command(path, 1, TextMetric::Levenshtein);
    command.max_bytes = Some(0);

    let err = run_command_expecting_error(command, "zero max_bytes must reject any dataset");
    assert!(matches!(
        err,
        CliError::Core(NeighbourhoodError::MemoryLimitExceeded { .. })
    ));
    Ok(())
}

#[rstest]
#[case::present(&["--max-bytes", "2G"], Some(2 * 1024 * 1024 * 1024))]
#[case::absent(&[], None)]
fn clap_parses_max_bytes_flag(#[case] flag: &[&str], #[case] expected: Option<u64>) {
    let args = ["neighbourly", "run", "--k", "3"]
        .into_iter()
        .chain(flag.iter().copied())
        .chain(["text", "data.txt", "--metric", "levenshtein"]);
    let cli = Cli::try_parse_from(args).expect("valid args must parse");
    let Command::Run(cmd) = cli.command;
    assert_eq!(cmd.max_bytes, expected);
}

#[rstest]
fn clap_rejects_malformed_max_bytes() {
    let args = [
        "neighbourly",
        "run",
        "--k",
        "3",
        "--max-bytes",
        "lots",
        "text",
        "data.txt",
        "--metric",
        "levenshtein",
    ];
    assert!(Cli::try_parse_from(args).is_err());
}
