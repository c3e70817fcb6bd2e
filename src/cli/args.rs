//! Top-level argument definitions

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::annotate::AnnotateArgs;
use crate::cli::commands::letters::LettersArgs;
use crate::cli::commands::run::RunArgs;
use crate::cli::commands::summary::SummaryArgs;

#[derive(Parser, Debug)]
#[command(
    name = "sigbar",
    version,
    about = "Group-comparison statistics with chart-ready significance annotations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Per-group descriptive statistics for a dataset
    Summary(SummaryArgs),

    /// Run a statistical procedure through the external R runtime
    Run(RunArgs),

    /// Compact-letter display from a comparison result table
    Letters(LettersArgs),

    /// Bracket/star/letter layout for a bar chart, as JSON
    Annotate(AnnotateArgs),
}

/// How command output is rendered
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// CSV on stdout
    Csv,
}
