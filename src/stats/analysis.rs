//! One comparison from dataset to significance maps
//!
//! Ties the pipeline together: validate the request against the
//! dataset, summarize the groups, hand the data to the external runner,
//! and fold the returned comparison table into [`SignificanceMaps`].

use std::time::Duration;

use thiserror::Error;

use crate::core::{DataError, Table};
use crate::stats::runner::{Procedure, RunnerError, TestRequest, TestRunner};
use crate::stats::sigmap::{self, SignificanceMaps};
use crate::stats::summary::{summarize, GroupSummary};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Procedure '{0}' requires a control group (use --control)")]
    MissingControl(Procedure),

    #[error("Control group '{0}' does not appear in column '{1}'")]
    ControlNotInData(String, String),

    #[error("No usable rows: every value in column '{0}' is empty or non-numeric")]
    NoUsableRows(String),

    #[error("Procedure '{0}' needs at least {1} groups, found {2}")]
    TooFewGroups(Procedure, usize, usize),
}

/// Everything one comparison run needs, carried explicitly instead of
/// through shared mutable state.
#[derive(Debug, Clone)]
pub struct CompareRequest {
    pub procedure: Procedure,
    pub group_col: String,
    pub value_col: String,
    pub factor_col: Option<String>,
    pub control: Option<String>,
    pub alpha: f64,
    pub adjust: String,
    pub timeout: Duration,
}

impl CompareRequest {
    fn to_test_request(&self) -> TestRequest {
        TestRequest {
            procedure: self.procedure,
            group_col: self.group_col.clone(),
            value_col: self.value_col.clone(),
            factor_col: self.factor_col.clone(),
            control: self.control.clone(),
            alpha: self.alpha,
            adjust: self.adjust.clone(),
            timeout: self.timeout,
        }
    }
}

/// Result of one comparison run
#[derive(Debug)]
pub struct CompareOutcome {
    /// Per-group descriptives over the rows the runner saw
    pub summary: Vec<GroupSummary>,
    /// Raw comparison table as returned by the external runtime
    pub table: Table,
    /// The same table folded into lookup form
    pub maps: SignificanceMaps,
}

/// Run one comparison end to end.
pub fn run_comparison(
    runner: &dyn TestRunner,
    dataset: &Table,
    request: &CompareRequest,
) -> Result<CompareOutcome, AnalysisError> {
    let g_idx = dataset
        .column_index(&request.group_col)
        .ok_or_else(|| DataError::ColumnNotFound(request.group_col.clone()))?;
    let v_idx = dataset
        .column_index(&request.value_col)
        .ok_or_else(|| DataError::ColumnNotFound(request.value_col.clone()))?;
    if let Some(factor) = &request.factor_col {
        dataset
            .column_index(factor)
            .ok_or_else(|| DataError::ColumnNotFound(factor.clone()))?;
    }

    // keep only rows the external procedure can use
    let usable = dataset.retain_rows(|table, row| {
        !table.cell(row, g_idx).trim().is_empty() && table.numeric(row, v_idx).is_some()
    });
    if usable.is_empty() {
        return Err(AnalysisError::NoUsableRows(request.value_col.clone()));
    }

    // every procedure compares across groups, so two is the floor; the
    // single-pair script additionally rejects more than two on its side
    let groups = usable.unique_values(g_idx);
    if groups.len() < 2 {
        return Err(AnalysisError::TooFewGroups(
            request.procedure,
            2,
            groups.len(),
        ));
    }

    if request.procedure == Procedure::EachVsControl && request.factor_col.is_none() {
        let control = request
            .control
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(AnalysisError::MissingControl(request.procedure))?;
        if !groups.iter().any(|g| g == control) {
            return Err(AnalysisError::ControlNotInData(
                control.to_string(),
                request.group_col.clone(),
            ));
        }
    }

    let summary = summarize(&usable, &request.group_col, &request.value_col)?;

    tracing::debug!(
        procedure = %request.procedure,
        groups = groups.len(),
        rows = usable.n_rows(),
        "running comparison"
    );
    let table = runner.run(&usable, &request.to_test_request())?;

    // vs-control results index by the non-control side, so the control
    // name is threaded into map construction only for that procedure
    let control_for_maps = match request.procedure {
        Procedure::EachVsControl => request.control.as_deref(),
        _ => None,
    };
    let maps = sigmap::build(&table, control_for_maps);

    Ok(CompareOutcome {
        summary,
        table,
        maps,
    })
}
