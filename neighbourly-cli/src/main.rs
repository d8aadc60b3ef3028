//! CLI entry point for the neighbourly k-nearest-neighbour builder.
//!
//! Parses command-line arguments with clap, builds the neighbourhood of the
//! selected data source, renders every neighbour list to stdout, and maps
//! errors to a failing exit code. Logging is initialised first so every later
//! step can emit structured diagnostics via `tracing`.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use neighbourly_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError},
};
use tracing::{error, field};

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let summary = run_cli(cli).context("failed to build neighbourhood")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_summary(&summary, &mut writer).context("failed to render neighbour lists")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn report_failure(err: &anyhow::Error) {
    let cli_error = err.downcast_ref::<CliError>();
    let stage = cli_error.map(CliError::stage);
    let core = cli_error.and_then(CliError::neighbourhood_error);
    let code = core.map(|core| field::display(core.code().as_str()));
    let data_source_code = core
        .and_then(|core| core.data_source_code())
        .map(|code| field::display(code.as_str()));

    error!(
        error = %format_args!("{err:#}"),
        stage,
        code,
        data_source_code,
        "command execution failed"
    );
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}

#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialised"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialise logging: {err}");
}
