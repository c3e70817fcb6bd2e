//! External test invocation over a subprocess boundary
//!
//! The statistical procedures run in an external R runtime (`Rscript`).
//! Data crosses the boundary as CSV exchange files inside a scratch
//! directory that exists only for the duration of one call: the input
//! subset is written before spawning, the result table is read back
//! afterwards, and the `TempDir` guard removes everything on every exit
//! path including errors.
//!
//! One invocation attempt per call; retrying is the caller's decision.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::core::{DataError, Table};
use crate::stats::rscript;

/// Poll interval while waiting on the external process
const WAIT_SLICE: Duration = Duration::from_millis(25);

/// The three procedures the external runtime knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    /// Tukey-style all-pairs comparison
    AllPairs,
    /// Welch t-test of every other group against a designated control,
    /// with multiple-comparison adjustment (Dunnett-style)
    EachVsControl,
    /// Classic two-group test
    SinglePair,
}

impl std::fmt::Display for Procedure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Procedure::AllPairs => write!(f, "all-pairs"),
            Procedure::EachVsControl => write!(f, "vs-control"),
            Procedure::SinglePair => write!(f, "single-pair"),
        }
    }
}

/// Everything one invocation needs
#[derive(Debug, Clone)]
pub struct TestRequest {
    pub procedure: Procedure,
    pub group_col: String,
    pub value_col: String,
    /// Secondary factor for the repeated-measures vs-control mode
    pub factor_col: Option<String>,
    pub control: Option<String>,
    pub alpha: f64,
    /// p.adjust method name, e.g. "holm"
    pub adjust: String,
    /// Wall-clock bound for the whole subprocess
    pub timeout: Duration,
}

/// Errors from one external invocation
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("External statistical runtime '{0}' not found on PATH. Install R and make sure it is reachable")]
    RunnerNotFound(String),

    #[error("Procedure '{0}' requires a control group")]
    MissingControl(Procedure),

    #[error("{program} exited with status {code}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}")]
    Failed {
        program: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("{program} timed out after {limit_secs}s\n--- stderr so far ---\n{stderr}")]
    Timeout {
        program: String,
        limit_secs: u64,
        stderr: String,
    },

    #[error("{program} reported success but produced no result table\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}")]
    MissingOutput {
        program: String,
        stdout: String,
        stderr: String,
    },

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The injectable process-boundary capability: run one procedure against
/// a dataset and hand back its result table. Production uses
/// [`RscriptRunner`]; tests substitute in-memory stubs.
pub trait TestRunner {
    fn run(&self, dataset: &Table, request: &TestRequest) -> Result<Table, RunnerError>;
}

/// Runs procedures through `Rscript` (or any compatible program)
#[derive(Debug, Clone)]
pub struct RscriptRunner {
    program: String,
}

impl RscriptRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve the configured program to an executable path without
    /// running anything; a missing runtime is a configuration error
    /// reported before any side effect.
    fn resolve_program(&self) -> Result<PathBuf, RunnerError> {
        let candidate = Path::new(&self.program);
        if candidate.components().count() > 1 {
            if candidate.is_file() {
                return Ok(candidate.to_path_buf());
            }
            return Err(RunnerError::RunnerNotFound(self.program.clone()));
        }
        let path_var = std::env::var_os("PATH").unwrap_or_default();
        for dir in std::env::split_paths(&path_var) {
            let full = dir.join(&self.program);
            if full.is_file() {
                return Ok(full);
            }
        }
        Err(RunnerError::RunnerNotFound(self.program.clone()))
    }
}

impl TestRunner for RscriptRunner {
    fn run(&self, dataset: &Table, request: &TestRequest) -> Result<Table, RunnerError> {
        if request.procedure == Procedure::EachVsControl
            && request.factor_col.is_none()
            && request.control.as_deref().map_or(true, str::is_empty)
        {
            return Err(RunnerError::MissingControl(request.procedure));
        }
        let program = self.resolve_program()?;

        let scratch = tempfile::tempdir()?;
        let in_csv = scratch.path().join("input.csv");
        let out_csv = scratch.path().join("result.csv");
        let script = scratch.path().join("procedure.R");

        dataset
            .select(&rscript::exchange_columns(request))?
            .write_csv_path(&in_csv)?;
        std::fs::write(&script, rscript::source_for(request))?;

        tracing::debug!(
            procedure = %request.procedure,
            program = %program.display(),
            "invoking external statistical runtime"
        );

        let mut child = Command::new(&program)
            .arg(&script)
            .args(rscript::args_for(request, &in_csv, &out_csv))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RunnerError::RunnerNotFound(self.program.clone())
                } else {
                    RunnerError::Io(e)
                }
            })?;

        // drain the pipes on the side so a chatty process cannot deadlock
        // against a full pipe buffer while we poll for exit; output lands
        // in shared buffers so the timeout path can read what arrived so
        // far without waiting on the readers
        let stdout_buf: Arc<Mutex<Vec<u8>>> = Arc::default();
        let stderr_buf: Arc<Mutex<Vec<u8>>> = Arc::default();
        let stdout_handle = spawn_drain(child.stdout.take(), Arc::clone(&stdout_buf));
        let stderr_handle = spawn_drain(child.stderr.take(), Arc::clone(&stderr_buf));

        let deadline = Instant::now() + request.timeout;
        let status = loop {
            match child.try_wait()? {
                Some(status) => break status,
                None if Instant::now() >= deadline => {
                    // best-effort termination. The drain threads are NOT
                    // joined here: a grandchild forked by the program
                    // inherits the pipe write ends, so the readers may
                    // never see EOF even though the direct child is dead.
                    // Snapshotting the buffers keeps the timeout prompt.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(RunnerError::Timeout {
                        program: self.program.clone(),
                        limit_secs: request.timeout.as_secs(),
                        stderr: snapshot(&stderr_buf),
                    });
                }
                None => std::thread::sleep(WAIT_SLICE),
            }
        };

        let _ = stdout_handle.join();
        let _ = stderr_handle.join();
        let stdout = snapshot(&stdout_buf);
        let stderr = snapshot(&stderr_buf);

        if !status.success() {
            return Err(RunnerError::Failed {
                program: self.program.clone(),
                code: status.code().unwrap_or(-1),
                stdout,
                stderr,
            });
        }
        if !out_csv.is_file() {
            return Err(RunnerError::MissingOutput {
                program: self.program.clone(),
                stdout,
                stderr,
            });
        }

        Ok(Table::from_csv_path(&out_csv)?)
    }
}

fn spawn_drain<R: Read + Send + 'static>(
    pipe: Option<R>,
    buf: Arc<Mutex<Vec<u8>>>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let Some(mut pipe) = pipe else { return };
        let mut chunk = [0u8; 4096];
        loop {
            match pipe.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let mut guard = buf.lock().unwrap_or_else(|e| e.into_inner());
                    guard.extend_from_slice(&chunk[..n]);
                }
            }
        }
    })
}

fn snapshot(buf: &Arc<Mutex<Vec<u8>>>) -> String {
    let guard = buf.lock().unwrap_or_else(|e| e.into_inner());
    String::from_utf8_lossy(&guard).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TestRequest {
        TestRequest {
            procedure: Procedure::AllPairs,
            group_col: "g".to_string(),
            value_col: "v".to_string(),
            factor_col: None,
            control: None,
            alpha: 0.05,
            adjust: "holm".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_missing_runtime_is_a_configuration_error() {
        let runner = RscriptRunner::new("definitely-not-a-real-binary-sigbar");
        let dataset = Table::new(vec!["g".into(), "v".into()]);
        let err = runner.run(&dataset, &request()).unwrap_err();
        assert!(matches!(err, RunnerError::RunnerNotFound(_)));
    }

    #[test]
    fn test_missing_runtime_by_path() {
        let runner = RscriptRunner::new("/nonexistent/bin/Rscript");
        let dataset = Table::new(vec!["g".into(), "v".into()]);
        let err = runner.run(&dataset, &request()).unwrap_err();
        assert!(matches!(err, RunnerError::RunnerNotFound(_)));
    }

    #[test]
    fn test_vs_control_without_control_rejected_before_spawn() {
        let runner = RscriptRunner::new("definitely-not-a-real-binary-sigbar");
        let dataset = Table::new(vec!["g".into(), "v".into()]);
        let mut req = request();
        req.procedure = Procedure::EachVsControl;
        let err = runner.run(&dataset, &req).unwrap_err();
        // control validation fires before the program lookup
        assert!(matches!(err, RunnerError::MissingControl(_)));
    }

    #[test]
    fn test_procedure_display_names() {
        assert_eq!(Procedure::AllPairs.to_string(), "all-pairs");
        assert_eq!(Procedure::EachVsControl.to_string(), "vs-control");
        assert_eq!(Procedure::SinglePair.to_string(), "single-pair");
    }
}
