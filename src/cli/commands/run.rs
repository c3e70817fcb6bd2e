//! `sigbar run` command - drive a procedure through the external R runtime

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::Tabled;

use crate::chart::{stars, GlyphMode};
use crate::cli::output::{self, fmt_p};
use crate::cli::OutputFormat;
use crate::core::{Config, Table};
use crate::stats::{
    assign_letters, run_comparison, CompareOutcome, CompareRequest, Procedure, RscriptRunner,
    SignificanceMaps,
};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureArg {
    /// Tukey HSD over every pair of groups
    AllPairs,
    /// Each group against a control (Welch t-tests, p.adjust)
    VsControl,
    /// Two-group t-test
    SinglePair,
}

impl From<ProcedureArg> for Procedure {
    fn from(arg: ProcedureArg) -> Self {
        match arg {
            ProcedureArg::AllPairs => Procedure::AllPairs,
            ProcedureArg::VsControl => Procedure::EachVsControl,
            ProcedureArg::SinglePair => Procedure::SinglePair,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Dataset CSV (one row per observation)
    pub input: PathBuf,

    #[arg(long, short = 'p', value_enum)]
    pub procedure: ProcedureArg,

    /// Column holding the group label
    #[arg(long, short = 'g', default_value = "group")]
    pub group: String,

    /// Column holding the measured value
    #[arg(long, short = 'v', default_value = "value")]
    pub value: String,

    /// Secondary two-level factor (vs-control only): compare the factor
    /// levels within each group instead of group against control
    #[arg(long)]
    pub factor: Option<String>,

    /// Control group name (required for vs-control without --factor)
    #[arg(long, short = 'c')]
    pub control: Option<String>,

    /// Significance threshold (default from .sigbar.yaml)
    #[arg(long)]
    pub alpha: Option<f64>,

    /// p.adjust method (default from .sigbar.yaml)
    #[arg(long)]
    pub adjust: Option<String>,

    /// Seconds to wait for the external runtime
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Program used to reach R (default from .sigbar.yaml)
    #[arg(long)]
    pub runner: Option<String>,

    /// Write the raw comparison table to this CSV as well
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,

    #[arg(long, short = 'f', value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Tabled)]
struct ComparisonRow {
    #[tabled(rename = "Comparison")]
    comparison: String,
    #[tabled(rename = "p")]
    p: String,
    #[tabled(rename = "")]
    glyph: String,
}

#[derive(Serialize)]
struct RunReport<'a> {
    summary: &'a [crate::stats::GroupSummary],
    comparisons: Vec<JsonComparison>,
    letters: Option<Vec<(String, String)>>,
}

#[derive(Serialize)]
struct JsonComparison {
    comparison: String,
    p: Option<f64>,
    glyph: String,
}

pub fn run(args: RunArgs) -> Result<()> {
    let config = Config::load_or_default().into_diagnostic()?;
    let alpha = args.alpha.unwrap_or(config.alpha);

    let dataset = Table::from_csv_path(&args.input).into_diagnostic()?;
    let request = CompareRequest {
        procedure: args.procedure.into(),
        group_col: args.group.clone(),
        value_col: args.value.clone(),
        factor_col: args.factor.clone(),
        control: args.control.clone(),
        alpha,
        adjust: args.adjust.clone().unwrap_or(config.adjust.clone()),
        timeout: Duration::from_secs(args.timeout.unwrap_or(config.timeout_secs)),
    };
    let runner = RscriptRunner::new(args.runner.clone().unwrap_or(config.runner.clone()));

    let outcome = run_comparison(&runner, &dataset, &request).into_diagnostic()?;

    if let Some(out) = &args.out {
        outcome.table.write_csv_path(out).into_diagnostic()?;
        eprintln!(
            "{} Wrote comparison table to {}",
            style("→").blue(),
            out.display()
        );
    }

    let comparisons = collect_comparisons(&outcome.maps, alpha, &config);
    let letters = letters_if_pairwise(&outcome, alpha);

    match args.format {
        OutputFormat::Table => {
            println!("{}", style("Group summary").bold());
            super::summary::print_summary(&outcome.summary, OutputFormat::Table)?;

            println!("{}", style("Comparisons").bold());
            output::print_table(comparisons.iter().map(|c| ComparisonRow {
                comparison: c.comparison.clone(),
                p: fmt_p(c.p),
                glyph: c.glyph.clone(),
            }));

            if let Some(letters) = &letters {
                println!("{}", style("Letters").bold());
                for (group, text) in letters {
                    println!("  {group}: {text}");
                }
            }
            Ok(())
        }
        OutputFormat::Json => output::print_json(&RunReport {
            summary: &outcome.summary,
            comparisons,
            letters,
        }),
        OutputFormat::Csv => {
            let rows: Vec<Vec<String>> = comparisons
                .into_iter()
                .map(|c| {
                    vec![
                        c.comparison,
                        c.p.map(|p| p.to_string()).unwrap_or_default(),
                        c.glyph,
                    ]
                })
                .collect();
            output::print_csv(&["comparison", "p", "glyph"], &rows)
        }
    }
}

fn collect_comparisons(
    maps: &SignificanceMaps,
    alpha: f64,
    config: &Config,
) -> Vec<JsonComparison> {
    let mut out = Vec::new();
    for (group, p) in maps.vs_control_sorted() {
        // factor-mode rows have no control; the group name stands alone
        let comparison = match maps.control.as_deref() {
            Some(control) => format!("{control} vs {group}"),
            None => group.clone(),
        };
        out.push(JsonComparison {
            comparison,
            p,
            glyph: stars(p, alpha, GlyphMode::Graded, &config.ladder),
        });
    }
    for (key, p) in maps.pairwise_sorted() {
        // vs-control entries are already listed above
        let (a, b) = key.groups();
        if let Some(ctrl) = maps.control.as_deref() {
            let other = if a == ctrl { b } else { a };
            if (a == ctrl || b == ctrl) && maps.vs_control.contains_key(other) {
                continue;
            }
        }
        out.push(JsonComparison {
            comparison: key.to_string(),
            p,
            glyph: stars(p, alpha, GlyphMode::Graded, &config.ladder),
        });
    }
    out
}

fn letters_if_pairwise(outcome: &CompareOutcome, alpha: f64) -> Option<Vec<(String, String)>> {
    if outcome.maps.pairwise.is_empty() {
        return None;
    }
    let groups: Vec<String> = outcome.summary.iter().map(|s| s.group.clone()).collect();
    let assigned = assign_letters(&groups, &outcome.maps, alpha);
    Some(
        groups
            .into_iter()
            .map(|g| {
                let text = assigned.get(&g).cloned().unwrap_or_default();
                (g, text)
            })
            .collect(),
    )
}
