//! Tabular data carrier shared by input datasets and external test results
//!
//! Both sides of the process boundary speak CSV: the dataset subset we hand
//! to the external runtime, and the result table it writes back. `Table`
//! keeps everything as strings; numeric coercion happens per cell and
//! unparsable cells coerce to `None` rather than erroring.

use std::path::Path;

use thiserror::Error;

/// Errors that can occur reading, writing, or slicing tabular data
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Table has no header row")]
    EmptyTable,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An ordered header row plus string-valued data rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given headers
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a data row, padding or truncating to the header width
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Read a table from a CSV file with a required header row
    pub fn from_csv_path(path: &Path) -> Result<Self, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        if headers.is_empty() {
            return Err(DataError::EmptyTable);
        }
        let mut table = Table::new(headers);
        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().map(|c| c.to_string()).collect());
        }
        Ok(table)
    }

    /// Write the table to a CSV file (UTF-8, header row first)
    pub fn write_csv_path(&self, path: &Path) -> Result<(), DataError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case-insensitive exact column lookup
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Cell access; out-of-range reads yield the empty string
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Numeric coercion for one cell; unparsable or missing yields `None`
    pub fn numeric(&self, row: usize, col: usize) -> Option<f64> {
        let cell = self.cell(row, col).trim();
        if cell.is_empty() || cell.eq_ignore_ascii_case("na") || cell.eq_ignore_ascii_case("nan") {
            return None;
        }
        cell.parse::<f64>().ok().filter(|v| !v.is_nan())
    }

    /// Column subset in the given order, preserving all rows
    pub fn select(&self, columns: &[&str]) -> Result<Table, DataError> {
        let indices: Vec<usize> = columns
            .iter()
            .map(|c| {
                self.column_index(c)
                    .ok_or_else(|| DataError::ColumnNotFound(c.to_string()))
            })
            .collect::<Result<_, _>>()?;
        let mut out = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for row in 0..self.rows.len() {
            out.push_row(indices.iter().map(|&i| self.cell(row, i).to_string()).collect());
        }
        Ok(out)
    }

    /// Keep only rows accepted by the predicate
    pub fn retain_rows<F: FnMut(&Table, usize) -> bool>(&self, mut keep: F) -> Table {
        let mut out = Table::new(self.headers.clone());
        for row in 0..self.rows.len() {
            if keep(self, row) {
                out.rows.push(self.rows[row].clone());
            }
        }
        out
    }

    /// Distinct non-empty values of a column, in first-appearance order
    pub fn unique_values(&self, col: usize) -> Vec<String> {
        let mut seen = Vec::new();
        for row in 0..self.rows.len() {
            let v = self.cell(row, col).trim();
            if !v.is_empty() && !seen.iter().any(|s| s == v) {
                seen.push(v.to_string());
            }
        }
        seen
    }
}
