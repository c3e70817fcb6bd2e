//! Command implementations

pub mod annotate;
pub mod letters;
pub mod run;
pub mod summary;
