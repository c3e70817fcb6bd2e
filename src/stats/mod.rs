//! Statistics module - external test invocation and result normalization

pub mod analysis;
pub mod label;
pub mod letters;
pub mod rscript;
pub mod runner;
pub mod sigmap;
pub mod summary;

pub use analysis::{run_comparison, AnalysisError, CompareOutcome, CompareRequest};
pub use label::ParsedComparison;
pub use letters::assign_letters;
pub use runner::{Procedure, RscriptRunner, RunnerError, TestRequest, TestRunner};
pub use sigmap::{PairKey, SignificanceMaps};
pub use summary::{summarize, GroupSummary};
