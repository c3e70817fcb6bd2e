//! `sigbar letters` command - compact-letter display from a result table

use std::path::PathBuf;

use miette::{IntoDiagnostic, Result};
use tabled::Tabled;

use crate::cli::output;
use crate::cli::OutputFormat;
use crate::core::{Config, Table};
use crate::stats::{assign_letters, sigmap, SignificanceMaps};

#[derive(clap::Args, Debug)]
pub struct LettersArgs {
    /// Comparison result CSV (one row per comparison, with a p column)
    pub input: PathBuf,

    /// Control group name, for parsing control-vs-group labels
    #[arg(long, short = 'c')]
    pub control: Option<String>,

    /// Significance threshold (default from .sigbar.yaml)
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Explicit comma-separated group order; default is first appearance
    /// in the comparison labels
    #[arg(long)]
    pub groups: Option<String>,

    #[arg(long, short = 'f', value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Tabled, serde::Serialize)]
struct LetterRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Letters")]
    letters: String,
}

pub fn run(args: LettersArgs) -> Result<()> {
    let config = Config::load_or_default().into_diagnostic()?;
    let alpha = args.alpha.unwrap_or(config.alpha);

    let table = Table::from_csv_path(&args.input).into_diagnostic()?;
    let maps = sigmap::build(&table, args.control.as_deref());
    if maps.pairwise.is_empty() {
        return Err(miette::miette!(
            "No pairwise comparisons could be read from {}",
            args.input.display()
        ));
    }

    let groups: Vec<String> = match &args.groups {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect(),
        None => SignificanceMaps::groups_in_order(&table, args.control.as_deref()),
    };

    let assigned = assign_letters(&groups, &maps, alpha);
    let rows: Vec<LetterRow> = groups
        .iter()
        .map(|g| LetterRow {
            group: g.clone(),
            letters: assigned.get(g).cloned().unwrap_or_default(),
        })
        .collect();

    match args.format {
        OutputFormat::Table => {
            output::print_table(rows);
            Ok(())
        }
        OutputFormat::Json => output::print_json(&rows),
        OutputFormat::Csv => {
            let csv_rows: Vec<Vec<String>> =
                rows.into_iter().map(|r| vec![r.group, r.letters]).collect();
            output::print_csv(&["group", "letters"], &csv_rows)
        }
    }
}
