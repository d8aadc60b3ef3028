//! Command-line interface orchestration for neighbourly.
//!
//! The CLI offers a single `run` command that loads either a Parquet dense
//! matrix or a line-based UTF-8 text corpus, builds its k-nearest-neighbour
//! neighbourhood and prints every neighbour list.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, ParquetArgs, RunCommand, RunSource, TextArgs,
    TextMetric, VectorMetric, render_summary, run_cli,
};

#[cfg(test)]
mod test_fixtures;
#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod test_memory_guard;
#[cfg(test)]
mod tests;
