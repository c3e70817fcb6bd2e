//! Project configuration loaded from `.sigbar.yaml`
//!
//! Everything here is a default the CLI flags can override. The glyph
//! ladder thresholds live in configuration rather than as literals so a
//! lab can adopt its own significance notation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file name looked up in the working directory
pub const CONFIG_FILE: &str = ".sigbar.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

/// One rung of the graded significance ladder: p-values at or below
/// `max_p` earn `glyph` (unless a lower rung already claimed them)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphStep {
    pub max_p: f64,
    pub glyph: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Significance threshold used when a command does not pass --alpha
    pub alpha: f64,

    /// Multiple-comparison adjustment method handed to the external runtime
    pub adjust: String,

    /// Wall-clock bound for one external test invocation
    pub timeout_secs: u64,

    /// Program name (or path) of the external statistical runtime
    pub runner: String,

    /// Graded star ladder, ordered strictest first
    pub ladder: Vec<GlyphStep>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            adjust: "holm".to_string(),
            timeout_secs: 120,
            runner: "Rscript".to_string(),
            ladder: vec![
                GlyphStep {
                    max_p: 0.001,
                    glyph: "***".to_string(),
                },
                GlyphStep {
                    max_p: 0.01,
                    glyph: "**".to_string(),
                },
                GlyphStep {
                    max_p: 0.05,
                    glyph: "*".to_string(),
                },
                GlyphStep {
                    max_p: 0.1,
                    glyph: ".".to_string(),
                },
            ],
        }
    }
}

impl Config {
    /// Load `.sigbar.yaml` from the working directory if present.
    ///
    /// An absent file yields the defaults; a malformed file is an error
    /// rather than a silent fallback.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load configuration from an explicit path, defaulting when absent
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_yml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
