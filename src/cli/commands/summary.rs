//! `sigbar summary` command - per-group descriptive statistics

use std::path::PathBuf;

use miette::{IntoDiagnostic, Result};
use tabled::Tabled;

use crate::cli::output::{self, fmt_opt};
use crate::cli::OutputFormat;
use crate::core::Table;
use crate::stats::{summarize, GroupSummary};

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    /// Dataset CSV (one row per observation)
    pub input: PathBuf,

    /// Column holding the group label
    #[arg(long, short = 'g', default_value = "group")]
    pub group: String,

    /// Column holding the measured value
    #[arg(long, short = 'v', default_value = "value")]
    pub value: String,

    #[arg(long, short = 'f', value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "N")]
    n: usize,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "SD")]
    std: String,
    #[tabled(rename = "SEM")]
    sem: String,
    #[tabled(rename = "Median")]
    median: String,
}

impl From<&GroupSummary> for SummaryRow {
    fn from(s: &GroupSummary) -> Self {
        Self {
            group: s.group.clone(),
            n: s.n,
            mean: fmt_opt(Some(s.mean)),
            std: fmt_opt(s.std),
            sem: fmt_opt(s.sem),
            median: fmt_opt(s.median),
        }
    }
}

pub fn run(args: SummaryArgs) -> Result<()> {
    let table = Table::from_csv_path(&args.input).into_diagnostic()?;
    let summary = summarize(&table, &args.group, &args.value).into_diagnostic()?;

    print_summary(&summary, args.format)
}

pub(crate) fn print_summary(summary: &[GroupSummary], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            output::print_table(summary.iter().map(SummaryRow::from));
            Ok(())
        }
        OutputFormat::Json => output::print_json(&summary),
        OutputFormat::Csv => {
            let rows: Vec<Vec<String>> = summary
                .iter()
                .map(|s| {
                    vec![
                        s.group.clone(),
                        s.n.to_string(),
                        s.mean.to_string(),
                        s.std.map(|v| v.to_string()).unwrap_or_default(),
                        s.sem.map(|v| v.to_string()).unwrap_or_default(),
                        s.median.map(|v| v.to_string()).unwrap_or_default(),
                    ]
                })
                .collect();
            output::print_csv(&["group", "n", "mean", "std", "sem", "median"], &rows)
        }
    }
}
