//! Core module - tabular data carrier and configuration

pub mod config;
pub mod table;

pub use config::{Config, ConfigError};
pub use table::{DataError, Table};
