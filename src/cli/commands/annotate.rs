//! `sigbar annotate` command - chart annotation layout as JSON
//!
//! Joins a comparison result table against the dataset it came from: the
//! dataset supplies bar order, heights, and error whiskers; the result
//! table supplies the significance maps. The emitted JSON is plotting-
//! library-agnostic (bar indices plus data-space y coordinates).

use std::path::PathBuf;

use clap::ValueEnum;
use miette::{IntoDiagnostic, Result};

use crate::chart::{annotate, BracketScope, ChartView, GlyphMode};
use crate::cli::output;
use crate::core::{Config, Table};
use crate::stats::{sigmap, summarize};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeArg {
    /// Brackets over every significant pair
    #[default]
    All,
    /// Stars over non-control bars when a control is set
    Control,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeArg {
    /// "***" / "**" / "*" / "." ladder
    #[default]
    Graded,
    /// Single star at p <= alpha
    SingleStar,
}

#[derive(clap::Args, Debug)]
pub struct AnnotateArgs {
    /// Comparison result CSV (one row per comparison, with a p column)
    pub results: PathBuf,

    /// Dataset CSV the comparisons were computed from
    #[arg(long, short = 'd')]
    pub data: PathBuf,

    /// Column holding the group label
    #[arg(long, short = 'g', default_value = "group")]
    pub group: String,

    /// Column holding the measured value
    #[arg(long, short = 'v', default_value = "value")]
    pub value: String,

    /// Control group name
    #[arg(long, short = 'c')]
    pub control: Option<String>,

    #[arg(long, value_enum, default_value = "all")]
    pub scope: ScopeArg,

    #[arg(long, value_enum, default_value = "graded")]
    pub mode: ModeArg,

    /// Significance threshold (default from .sigbar.yaml)
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Lower edge of the chart's y axis
    #[arg(long, default_value_t = 0.0)]
    pub y_min: f64,

    /// Upper edge of the chart's y axis; default leaves 20% headroom
    /// above the tallest bar plus whisker
    #[arg(long)]
    pub y_max: Option<f64>,
}

pub fn run(args: AnnotateArgs) -> Result<()> {
    let config = Config::load_or_default().into_diagnostic()?;
    let alpha = args.alpha.unwrap_or(config.alpha);

    let dataset = Table::from_csv_path(&args.data).into_diagnostic()?;
    let summary = summarize(&dataset, &args.group, &args.value).into_diagnostic()?;
    if summary.is_empty() {
        return Err(miette::miette!(
            "No usable rows in {} (column '{}')",
            args.data.display(),
            args.value
        ));
    }

    let results = Table::from_csv_path(&args.results).into_diagnostic()?;
    let maps = sigmap::build(&results, args.control.as_deref());

    let labels: Vec<String> = summary.iter().map(|s| s.group.clone()).collect();
    let means: Vec<f64> = summary.iter().map(|s| s.mean).collect();
    let errors: Vec<f64> = summary.iter().map(|s| s.sem.unwrap_or(0.0)).collect();

    let y_max = match args.y_max {
        Some(v) => v,
        None => {
            let tallest = means
                .iter()
                .zip(&errors)
                .map(|(m, e)| m + e)
                .fold(f64::NEG_INFINITY, f64::max);
            if tallest > 0.0 {
                tallest * 1.2
            } else {
                1.0
            }
        }
    };

    let view = ChartView {
        labels: &labels,
        means: &means,
        errors: &errors,
        y_min: args.y_min,
        y_max,
    };
    let scope = match args.scope {
        ScopeArg::All => BracketScope::All,
        ScopeArg::Control => BracketScope::Control,
    };
    let mode = match args.mode {
        ModeArg::Graded => GlyphMode::Graded,
        ModeArg::SingleStar => GlyphMode::SingleStar,
    };

    let annotations = annotate(&view, &maps, scope, alpha, mode, &config.ladder);
    output::print_json(&annotations)
}
