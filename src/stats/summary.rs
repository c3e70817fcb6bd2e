//! Per-group descriptive statistics

use serde::Serialize;

use crate::core::{DataError, Table};

/// Descriptive statistics for one group, in first-appearance order of
/// the source table. Spread measures are absent below two observations.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub group: String,
    pub n: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub sem: Option<f64>,
    pub median: Option<f64>,
}

/// Summarize `value_col` per level of `group_col`. Rows whose value
/// cell is empty or non-numeric are skipped; a group whose every row is
/// skipped does not appear in the output.
pub fn summarize(
    table: &Table,
    group_col: &str,
    value_col: &str,
) -> Result<Vec<GroupSummary>, DataError> {
    let g_idx = table
        .column_index(group_col)
        .ok_or_else(|| DataError::ColumnNotFound(group_col.to_string()))?;
    let v_idx = table
        .column_index(value_col)
        .ok_or_else(|| DataError::ColumnNotFound(value_col.to_string()))?;

    let mut order: Vec<String> = Vec::new();
    let mut values: std::collections::HashMap<String, Vec<f64>> =
        std::collections::HashMap::new();
    for row in 0..table.n_rows() {
        let group = table.cell(row, g_idx).trim().to_string();
        if group.is_empty() {
            continue;
        }
        let Some(value) = table.numeric(row, v_idx) else {
            continue;
        };
        if !values.contains_key(&group) {
            order.push(group.clone());
        }
        values.entry(group).or_default().push(value);
    }

    Ok(order
        .into_iter()
        .filter_map(|group| {
            let xs = values.remove(&group)?;
            Some(summarize_group(group, xs))
        })
        .collect())
}

fn summarize_group(group: String, mut xs: Vec<f64>) -> GroupSummary {
    let n = xs.len();
    let mean = xs.iter().sum::<f64>() / n as f64;

    let (std, sem) = if n >= 2 {
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
        let std = var.sqrt();
        (Some(std), Some(std / (n as f64).sqrt()))
    } else {
        (None, None)
    };

    let median = if n == 0 {
        None
    } else {
        xs.sort_by(f64::total_cmp);
        Some(if n % 2 == 1 {
            xs[n / 2]
        } else {
            (xs[n / 2 - 1] + xs[n / 2]) / 2.0
        })
    };

    GroupSummary {
        group,
        n,
        mean,
        std,
        sem,
        median,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(&str, &str)]) -> Table {
        let mut t = Table::new(vec!["group".into(), "value".into()]);
        for (g, v) in rows {
            t.push_row(vec![g.to_string(), v.to_string()]);
        }
        t
    }

    #[test]
    fn test_basic_summary() {
        let t = table(&[
            ("A", "1.0"),
            ("A", "2.0"),
            ("A", "3.0"),
            ("B", "10.0"),
            ("B", "14.0"),
        ]);
        let s = summarize(&t, "group", "value").unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].group, "A");
        assert_eq!(s[0].n, 3);
        assert!((s[0].mean - 2.0).abs() < 1e-12);
        assert!((s[0].std.unwrap() - 1.0).abs() < 1e-12);
        assert!((s[0].sem.unwrap() - 1.0 / 3f64.sqrt()).abs() < 1e-12);
        assert_eq!(s[0].median, Some(2.0));
        assert_eq!(s[1].group, "B");
        assert!((s[1].mean - 12.0).abs() < 1e-12);
        assert_eq!(s[1].median, Some(12.0));
    }

    #[test]
    fn test_singleton_group_has_no_spread() {
        let t = table(&[("A", "5.0")]);
        let s = summarize(&t, "group", "value").unwrap();
        assert_eq!(s[0].n, 1);
        assert_eq!(s[0].mean, 5.0);
        assert!(s[0].std.is_none());
        assert!(s[0].sem.is_none());
        assert_eq!(s[0].median, Some(5.0));
    }

    #[test]
    fn test_non_numeric_rows_skipped() {
        let t = table(&[("A", "1.0"), ("A", "NA"), ("A", ""), ("A", "3.0"), ("B", "oops")]);
        let s = summarize(&t, "group", "value").unwrap();
        // B has no usable rows at all
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].n, 2);
        assert!((s[0].mean - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_first_appearance_order() {
        let t = table(&[("Z", "1"), ("A", "2"), ("Z", "3"), ("M", "4")]);
        let s = summarize(&t, "group", "value").unwrap();
        let names: Vec<_> = s.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(names, vec!["Z", "A", "M"]);
    }

    #[test]
    fn test_missing_column() {
        let t = table(&[("A", "1.0")]);
        let err = summarize(&t, "nope", "value").unwrap_err();
        assert!(matches!(err, DataError::ColumnNotFound(_)));
    }
}
