//! Output formatting utilities

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::settings::Style;
use tabled::Tabled;

/// Render rows as a boxed table on stdout
pub fn print_table<T: Tabled>(rows: impl IntoIterator<Item = T>) {
    let mut table = tabled::Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");
}

/// Pretty-printed JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{rendered}");
    Ok(())
}

/// CSV on stdout with the given header row
pub fn print_csv(headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(headers).into_diagnostic()?;
    for row in rows {
        writer.write_record(row).into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}

/// Fixed-precision float, or a dash when absent
pub fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "-".to_string(),
    }
}

/// p-values keep more digits at the small end
pub fn fmt_p(value: Option<f64>) -> String {
    match value {
        Some(p) if p < 0.001 => format!("{p:.2e}"),
        Some(p) => format!("{p:.4}"),
        None => "-".to_string(),
    }
}
