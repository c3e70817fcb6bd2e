//! sigbar: group-comparison statistics with chart-ready significance annotations
//!
//! The statistical tests themselves (Tukey HSD, Dunnett, Welch t-tests) run in
//! an external R runtime reached over a subprocess boundary. This crate drives
//! that runtime, normalizes its heterogeneous result tables into canonical
//! significance maps, and turns those maps into compact-letter displays and
//! non-overlapping bracket/star layouts for bar charts.

pub mod chart;
pub mod cli;
pub mod core;
pub mod stats;
