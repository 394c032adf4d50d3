use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::filter::DEFAULT_OUTLIER_THRESHOLD;
use crate::data::histogram::{COMPARISON_BINS, DEFAULT_BINS};

/// Tunable analysis parameters. Missing JSON fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// `|delta_M|` above which an event is reported as an outlier.
    pub outlier_threshold: f64,
    /// Bins for single-distribution histograms.
    pub bins: usize,
    /// Bins for the M vs M_New overlay.
    pub comparison_bins: usize,
    /// Outlier rows shown in the console preview.
    pub preview_rows: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            bins: DEFAULT_BINS,
            comparison_bins: COMPARISON_BINS,
            preview_rows: 5,
        }
    }
}

impl AnalysisSettings {
    /// Read settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing settings JSON")
    }
}
