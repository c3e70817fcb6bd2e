//! Annotation layout: stacked brackets, stars, and compact letters
//!
//! The layout engine is a pure computation. Given the bars (means and
//! error extents in display order), the significance maps, and the
//! currently visible y-range, it produces the annotation geometry a
//! renderer can draw directly: bracket connectors between significantly
//! different bars, stars above bars for vs-control comparisons, compact
//! letters otherwise, plus the axis growth needed to fit everything.
//!
//! Bracket stacking is greedy: shorter spans are placed first and
//! lowest, and each new bracket is pushed upward in fixed increments
//! until it clears every already-used level. That guarantees no two
//! lines coincide but not a globally minimal total height.

use serde::Serialize;

use crate::chart::glyph::{stars, GlyphMode};
use crate::core::config::GlyphStep;
use crate::stats::letters::assign_letters;
use crate::stats::sigmap::SignificanceMaps;

/// Which comparisons become bracket candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketScope {
    /// Every significant pairwise comparison gets a bracket
    All,
    /// Vs-control comparisons render as stars above bars, not brackets;
    /// with no control designated this falls back to pairwise brackets
    Control,
}

/// A bracket connector between two bars, ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bracket {
    /// Bar index of the left endpoint
    pub left: usize,
    /// Bar index of the right endpoint
    pub right: usize,
    /// Height of the horizontal line
    pub y: f64,
    /// Length of the two vertical legs hanging from the line
    pub leg: f64,
    /// Significance glyph centered above the line (may be empty)
    pub glyph: String,
}

/// A significance glyph drawn directly above one bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarMark {
    pub index: usize,
    pub y: f64,
    pub glyph: String,
}

/// A compact-letter label drawn above one bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetterMark {
    pub index: usize,
    pub y: f64,
    pub text: String,
}

/// Everything the renderer needs, plus the requested axis growth
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Annotations {
    pub brackets: Vec<Bracket>,
    pub stars: Vec<StarMark>,
    pub letters: Vec<LetterMark>,
    /// New y-axis upper bound when the stacked brackets outgrow the
    /// current view; `None` when everything already fits
    pub y_upper: Option<f64>,
}

/// The bar chart as the layout engine sees it: one entry per bar in
/// display order, plus the visible y-range reported by the renderer.
#[derive(Debug, Clone)]
pub struct ChartView<'a> {
    pub labels: &'a [String],
    pub means: &'a [f64],
    pub errors: &'a [f64],
    pub y_min: f64,
    pub y_max: f64,
}

impl ChartView<'_> {
    fn top_of_bar(&self, i: usize) -> f64 {
        self.means[i] + self.errors[i]
    }

    fn mean_spread(&self) -> f64 {
        let max = self.means.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = self.means.iter().copied().fold(f64::INFINITY, f64::min);
        max - min
    }
}

/// Compute the annotation layout. Never fails: pathological inputs (no
/// groups, empty maps, all p-values absent) produce empty annotations.
pub fn annotate(
    view: &ChartView<'_>,
    maps: &SignificanceMaps,
    scope: BracketScope,
    alpha: f64,
    mode: GlyphMode,
    ladder: &[GlyphStep],
) -> Annotations {
    let mut out = Annotations::default();
    let n = view.labels.len();
    if n == 0 || view.means.len() != n || view.errors.len() != n {
        return out;
    }

    let yrange = if view.y_max - view.y_min > 0.0 {
        view.y_max - view.y_min
    } else {
        view.means
            .iter()
            .fold(f64::NEG_INFINITY, |a, &m| a.max(m))
            .abs()
            .max(1.0)
    };
    let base_offset = yrange * 0.05;

    let index_of = |label: &str| view.labels.iter().position(|l| l == label);

    // bracket candidates: scope `Control` with a designated control draws
    // stars instead, so its bracket set stays empty
    let draw_pair_brackets =
        matches!(scope, BracketScope::All) || maps.control.is_none();
    let mut candidates: Vec<(usize, usize, f64)> = Vec::new();
    if draw_pair_brackets {
        for (key, p) in &maps.pairwise {
            let Some(p) = *p else { continue };
            if p.is_nan() || p >= alpha {
                continue;
            }
            let (a, b) = key.groups();
            if let (Some(i), Some(j)) = (index_of(a), index_of(b)) {
                candidates.push((i.min(j), i.max(j), p));
            }
        }
    }
    // shorter spans first so they stack lowest
    candidates.sort_by(|a, b| {
        (a.1 - a.0, a.0)
            .cmp(&(b.1 - b.0, b.0))
            .then(a.2.total_cmp(&b.2))
    });

    let min_gap = base_offset * 0.9;
    let mut used_levels: Vec<f64> = Vec::new();
    for (left, right, p) in candidates {
        // the line must clear every bar it spans, not just its endpoints
        let span_top = (left..=right)
            .map(|i| view.top_of_bar(i))
            .fold(f64::NEG_INFINITY, f64::max);
        let base_y = span_top + base_offset;
        let mut y = base_y;
        while used_levels.iter().any(|&u| (y - u).abs() < min_gap) {
            y += min_gap;
        }
        used_levels.push(y);
        out.brackets.push(Bracket {
            left,
            right,
            y,
            leg: yrange * 0.03,
            glyph: stars(Some(p), alpha, mode, ladder),
        });
    }

    if let Some(highest) = used_levels.iter().copied().reduce(f64::max) {
        if highest + base_offset * 0.8 > view.y_max {
            out.y_upper = Some(highest + base_offset * 1.5);
        }
    }

    // vs-control comparisons: stars directly above the affected bars,
    // falling back per bar to the {control, bar} pairwise entry
    if !maps.vs_control.is_empty() {
        let spread = view.mean_spread();
        for (i, label) in view.labels.iter().enumerate() {
            let p = maps
                .vs_control_p(label)
                .or_else(|| maps.control.as_deref().and_then(|c| maps.pairwise_p(c, label)));
            let glyph = stars(p, alpha, mode, ladder);
            if !glyph.is_empty() {
                out.stars.push(StarMark {
                    index: i,
                    y: view.top_of_bar(i) + spread * 0.08,
                    glyph,
                });
            }
        }
        return out;
    }

    // no control in play: compact letters above the bars
    if !maps.pairwise.is_empty() {
        let spread = view.mean_spread();
        let letters = assign_letters(view.labels, maps, alpha);
        for (i, label) in view.labels.iter().enumerate() {
            if let Some(text) = letters.get(label).filter(|t| !t.is_empty()) {
                out.letters.push(LetterMark {
                    index: i,
                    y: view.top_of_bar(i) + spread * 0.05,
                    text: text.clone(),
                });
            }
        }
    }

    out
}
