//! Canonical significance maps built from external result tables
//!
//! Each procedure writes a differently-shaped CSV: column names vary
//! (`p adj`, `p_adj`, `p.value`, ...) and comparison labels follow the
//! producing tool's habits. This module normalizes all of them into two
//! lookups: unordered group-pair -> p and other-group -> p (vs control).
//!
//! Building is lenient by design: malformed labels and unparsable
//! p-values are skipped (logged at debug level), never raised. A caller
//! that must distinguish "not significant" from "unparsable" has to
//! inspect the raw result table.

use std::collections::HashMap;
use std::fmt;

use crate::core::Table;
use crate::stats::label;

/// Known names for the p-value-bearing column, lowercase
const P_ALIASES: [&str; 9] = [
    "p", "p_value", "pvalue", "p.value", "p-adj", "p.adj", "padj", "p_adj", "pval",
];

/// The subset of aliases that denote multiplicity-adjusted p-values
const P_ADJUSTED: [&str; 4] = ["p-adj", "p.adj", "padj", "p_adj"];

/// Canonical key for an unordered pair of group labels
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    a: String,
    b: String,
}

impl PairKey {
    /// Build a key; the two labels are stored in a fixed order so that
    /// `{A,B}` and `{B,A}` hash and compare identically.
    pub fn new(g1: &str, g2: &str) -> Self {
        if g1 <= g2 {
            Self {
                a: g1.to_string(),
                b: g2.to_string(),
            }
        } else {
            Self {
                a: g2.to_string(),
                b: g1.to_string(),
            }
        }
    }

    pub fn groups(&self) -> (&str, &str) {
        (&self.a, &self.b)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.a, self.b)
    }
}

/// The two canonical lookups a compute request produces.
///
/// Values are `None` when the source row carried no parsable p-value;
/// consumers treat that the same as an absent entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignificanceMaps {
    pub pairwise: HashMap<PairKey, Option<f64>>,
    /// Keyed by the non-control group; two-factor rows land here too,
    /// keyed by their outer group
    pub vs_control: HashMap<String, Option<f64>>,
    pub control: Option<String>,
}

impl SignificanceMaps {
    /// Pairwise p-value lookup by unordered pair
    pub fn pairwise_p(&self, g1: &str, g2: &str) -> Option<f64> {
        self.pairwise.get(&PairKey::new(g1, g2)).copied().flatten()
    }

    /// Vs-control p-value lookup
    pub fn vs_control_p(&self, group: &str) -> Option<f64> {
        self.vs_control.get(group).copied().flatten()
    }

    /// Pairwise entries in a stable (sorted) order for display
    pub fn pairwise_sorted(&self) -> Vec<(&PairKey, Option<f64>)> {
        let mut entries: Vec<_> = self.pairwise.iter().map(|(k, p)| (k, *p)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Vs-control entries in a stable (sorted) order for display
    pub fn vs_control_sorted(&self) -> Vec<(&String, Option<f64>)> {
        let mut entries: Vec<_> = self.vs_control.iter().map(|(k, p)| (k, *p)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Group identifiers in first-appearance order across the parsed
    /// comparisons; the order groups are later displayed in.
    pub fn groups_in_order(table: &Table, control: Option<&str>) -> Vec<String> {
        let comp_col = find_comparison_column(table);
        let mut groups = Vec::new();
        for row in 0..table.n_rows() {
            let parsed = label::parse(table.cell(row, comp_col), control);
            for g in [&parsed.left, &parsed.right] {
                if !g.is_empty() && !groups.iter().any(|s| s == g) {
                    groups.push(g.clone());
                }
            }
        }
        groups
    }
}

/// Locate the p-value column: exact case-insensitive alias match first,
/// then substring candidates with adjusted aliases preferred over raw.
pub fn find_pvalue_column(table: &Table) -> Option<usize> {
    for (i, header) in table.headers().iter().enumerate() {
        let lower = header.to_lowercase();
        if P_ALIASES.contains(&lower.as_str()) {
            return Some(i);
        }
    }

    let candidates: Vec<usize> = table
        .headers()
        .iter()
        .enumerate()
        .filter(|(_, h)| {
            let lower = h.to_lowercase();
            P_ALIASES.iter().any(|a| lower.contains(a))
        })
        .map(|(i, _)| i)
        .collect();

    candidates
        .iter()
        .copied()
        .find(|&i| {
            let lower = table.headers()[i].to_lowercase();
            P_ADJUSTED.iter().any(|a| lower.contains(a))
        })
        .or_else(|| candidates.first().copied())
}

/// The comparison-label column: `comparison` when present, else the first
pub fn find_comparison_column(table: &Table) -> usize {
    table.column_index("comparison").unwrap_or(0)
}

/// Build both maps from a result table. Never fails; idempotent for a
/// given table. Later rows overwrite earlier ones for the same pair.
pub fn build(table: &Table, control: Option<&str>) -> SignificanceMaps {
    let mut maps = SignificanceMaps {
        control: control.map(str::to_string),
        ..Default::default()
    };

    let comp_col = find_comparison_column(table);
    let p_col = find_pvalue_column(table);
    if p_col.is_none() {
        tracing::debug!("no p-value column recognized among {:?}", table.headers());
    }

    for row in 0..table.n_rows() {
        let raw = table.cell(row, comp_col);
        let parsed = label::parse(raw, control);
        if !parsed.is_complete() {
            tracing::debug!(label = raw, "skipping comparison row with unparsable label");
            continue;
        }
        let p = p_col.and_then(|c| table.numeric(row, c));

        // two-factor rows ("G : lv1 vs lv2") carry one p per outer group;
        // keying them by the factor levels would collapse every group
        // onto the same pair
        if let Some(qualifier) = &parsed.qualifier {
            maps.vs_control.insert(qualifier.clone(), p);
            continue;
        }

        maps.pairwise
            .insert(PairKey::new(&parsed.left, &parsed.right), p);

        if let Some(ctrl) = control {
            let other = if parsed.left == ctrl && parsed.right != ctrl {
                Some(&parsed.right)
            } else if parsed.right == ctrl && parsed.left != ctrl {
                Some(&parsed.left)
            } else {
                None
            };
            if let Some(other) = other {
                maps.vs_control.insert(other.clone(), p);
            }
        }
    }

    maps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_table(headers: &[&str], rows: &[&[&str]]) -> Table {
        let mut t = Table::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            t.push_row(row.iter().map(|c| c.to_string()).collect());
        }
        t
    }

    #[test]
    fn test_pair_key_is_unordered() {
        assert_eq!(PairKey::new("A", "B"), PairKey::new("B", "A"));
        let mut map = HashMap::new();
        map.insert(PairKey::new("B", "A"), Some(0.03));
        assert_eq!(map.get(&PairKey::new("A", "B")), Some(&Some(0.03)));
    }

    #[test]
    fn test_exact_alias_match_wins() {
        let t = result_table(&["comparison", "estimate", "P.Value"], &[]);
        assert_eq!(find_pvalue_column(&t), Some(2));
    }

    #[test]
    fn test_substring_fallback_prefers_adjusted() {
        let t = result_table(&["comparison", "pval_raw", "padj_holm"], &[]);
        // neither is an exact alias; "padj_holm" contains an adjusted alias
        assert_eq!(find_pvalue_column(&t), Some(2));
    }

    #[test]
    fn test_no_p_column() {
        // note: "p" as a substring is enough to make a candidate, so none
        // of these header names may contain the letter at all
        let t = result_table(&["contrast", "estimate"], &[]);
        assert_eq!(find_pvalue_column(&t), None);
    }

    #[test]
    fn test_build_pairwise_round_trip() {
        let t = result_table(
            &["comparison", "diff", "p.adj"],
            &[
                &["KO-WT", "1.2", "0.031"],
                &["Het-WT", "0.4", "0.44"],
                &["Het-KO", "-0.8", "0.009"],
            ],
        );
        let maps = build(&t, None);
        assert_eq!(maps.pairwise.len(), 3);
        assert_eq!(maps.pairwise_p("WT", "KO"), Some(0.031));
        assert_eq!(maps.pairwise_p("KO", "Het"), Some(0.009));
        assert_eq!(maps.pairwise_p("WT", "Het"), Some(0.44));
    }

    #[test]
    fn test_build_is_idempotent() {
        let t = result_table(
            &["comparison", "p_adj"],
            &[&["A vs B", "0.01"], &["A vs C", "0.5"]],
        );
        assert_eq!(build(&t, None), build(&t, None));
    }

    #[test]
    fn test_vs_control_map_only_with_control() {
        let t = result_table(
            &["comparison", "p_adj"],
            &[&["Ctrl vs X", "0.02"], &["Ctrl vs Y", "0.7"], &["X vs Y", "0.3"]],
        );
        let maps = build(&t, Some("Ctrl"));
        assert_eq!(maps.vs_control_p("X"), Some(0.02));
        assert_eq!(maps.vs_control_p("Y"), Some(0.7));
        // pair not involving the control never lands in the vs-control map
        assert!(!maps.vs_control.contains_key("Ctrl"));
        assert_eq!(maps.vs_control.len(), 2);

        let no_ctrl = build(&t, None);
        assert!(no_ctrl.vs_control.is_empty());
    }

    #[test]
    fn test_two_factor_rows_keep_one_entry_per_group() {
        let t = result_table(
            &["comparison", "p.adj"],
            &[
                &["G1 : pre vs post", "0.01"],
                &["G2 : pre vs post", "0.6"],
                &["G3 : pre vs post", "0.002"],
            ],
        );
        let maps = build(&t, None);
        // the shared factor levels must not collapse the groups
        assert!(maps.pairwise.is_empty());
        assert_eq!(maps.vs_control.len(), 3);
        assert_eq!(maps.vs_control_p("G1"), Some(0.01));
        assert_eq!(maps.vs_control_p("G2"), Some(0.6));
        assert_eq!(maps.vs_control_p("G3"), Some(0.002));
    }

    #[test]
    fn test_unparsable_p_is_absent_not_zero() {
        let t = result_table(
            &["comparison", "p_adj"],
            &[&["A vs B", "NA"], &["A vs C", "0.01"]],
        );
        let maps = build(&t, None);
        assert!(maps.pairwise.contains_key(&PairKey::new("A", "B")));
        assert_eq!(maps.pairwise_p("A", "B"), None);
        assert_eq!(maps.pairwise_p("A", "C"), Some(0.01));
    }

    #[test]
    fn test_malformed_label_skipped_silently() {
        let t = result_table(&["comparison", "p"], &[&["nonsense", "0.01"], &["", "0.02"]]);
        let maps = build(&t, None);
        assert!(maps.pairwise.is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let t = result_table(
            &["comparison", "p"],
            &[&["A vs B", "0.5"], &["B vs A", "0.01"]],
        );
        let maps = build(&t, None);
        assert_eq!(maps.pairwise.len(), 1);
        assert_eq!(maps.pairwise_p("A", "B"), Some(0.01));
    }

    #[test]
    fn test_groups_in_order() {
        let t = result_table(
            &["comparison", "p"],
            &[&["B vs A", "0.5"], &["C vs A", "0.1"]],
        );
        let groups = SignificanceMaps::groups_in_order(&t, None);
        assert_eq!(groups, vec!["B".to_string(), "A".to_string(), "C".to_string()]);
    }
}
