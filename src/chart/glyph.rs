//! Significance glyph selection
//!
//! A p-value maps to a display glyph through a threshold ladder. The
//! graded ladder is configuration (see [`crate::core::config`]), not a
//! law of nature; single-star mode collapses everything to one star at
//! the caller's alpha.

use serde::{Deserialize, Serialize};

use crate::core::config::GlyphStep;

/// How p-values render as glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlyphMode {
    /// Full ladder: "***", "**", "*", "." by fixed thresholds
    Graded,
    /// One star at p <= alpha, nothing otherwise
    SingleStar,
}

/// Glyph for a p-value. Absent or unparsable p-values always yield the
/// empty string: no annotation is drawn, and no error is raised.
pub fn stars(p: Option<f64>, alpha: f64, mode: GlyphMode, ladder: &[GlyphStep]) -> String {
    let p = match p {
        Some(v) if !v.is_nan() => v,
        _ => return String::new(),
    };
    match mode {
        GlyphMode::Graded => ladder
            .iter()
            .find(|step| p <= step.max_p)
            .map(|step| step.glyph.clone())
            .unwrap_or_default(),
        GlyphMode::SingleStar => {
            if p <= alpha {
                "*".to_string()
            } else {
                String::new()
            }
        }
    }
}
