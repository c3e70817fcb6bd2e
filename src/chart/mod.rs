//! Chart module - significance glyphs and annotation layout

pub mod glyph;
pub mod layout;

pub use glyph::{stars, GlyphMode};
pub use layout::{annotate, Annotations, Bracket, BracketScope, ChartView, LetterMark, StarMark};
