//! Comparison label parsing
//!
//! Every external procedure names its comparisons differently: R's TukeyHSD
//! uses "A-B" row names, DescTools-style output uses "A vs B", the
//! two-factor t-test mode emits "Group : Lv1 vs Lv2". Group names may
//! themselves contain hyphens ("Trt-1"), so the grammar is ambiguous and
//! parsing is best-effort: a label that cannot be split degrades to
//! `(label, "")` instead of failing.

use std::sync::OnceLock;

use regex::Regex;

/// Separators tried in priority order when the numeric-suffix rule misses
const SEPARATORS: [&str; 8] = [" vs ", " VS ", " Vs ", " - ", "-", " vs. ", " x ", "/"];

/// A comparison label split into canonical group identifiers.
///
/// `right` is empty when the label was too ambiguous to split. The
/// two-factor form carries the outer group as `qualifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedComparison {
    pub qualifier: Option<String>,
    pub left: String,
    pub right: String,
}

impl ParsedComparison {
    fn pair(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            left: left.into(),
            right: right.into(),
        }
    }

    /// Both identifiers are usable
    pub fn is_complete(&self) -> bool {
        !self.left.is_empty() && !self.right.is_empty()
    }
}

/// Matches "<name-ending-in-a-number>-<name>" so that labels like
/// "Trt-1-Control" split at the hyphen after the numeric suffix, not at
/// the hyphen inside the group name.
fn numeric_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*-\d+)-(.*)$").unwrap())
}

/// Split a free-form comparison label into group identifiers.
///
/// Never fails. Priority: numeric-suffix hyphen rule, then the fixed
/// separator list, then salvage against a known control label, then the
/// whole label as `left` with an empty `right`.
pub fn parse(label: &str, control: Option<&str>) -> ParsedComparison {
    let s = label.trim();

    if let Some(caps) = numeric_suffix_re().captures(s) {
        return ParsedComparison::pair(caps[1].trim(), caps[2].trim());
    }

    for sep in SEPARATORS {
        if !s.contains(sep) {
            continue;
        }
        let parts: Vec<&str> = s.split(sep).map(str::trim).filter(|p| !p.is_empty()).collect();
        if parts.len() < 2 {
            // separator present but nothing on one side; try the next one
            continue;
        }
        if let Some((qualifier, left)) = parts[0].split_once(" : ") {
            return ParsedComparison {
                qualifier: Some(qualifier.trim().to_string()),
                left: left.trim().to_string(),
                right: parts[1].to_string(),
            };
        }
        return ParsedComparison::pair(parts[0], parts[1]);
    }

    // The label may embed a known control group without any separator we
    // recognize; strip the control and the separator keywords and take the
    // first remaining token as the other group.
    if let Some(ctrl) = control.filter(|c| !c.is_empty()) {
        if s.contains(ctrl) {
            let remainder = s
                .replace(ctrl, "")
                .replace('-', "")
                .replace("vs", "")
                .replace("VS", "");
            if let Some(other) = remainder.split_whitespace().next() {
                return ParsedComparison::pair(ctrl, other);
            }
        }
    }

    ParsedComparison::pair(s, "")
}
