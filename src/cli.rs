use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::settings::AnalysisSettings;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Event table to open (.csv, .parquet or .json)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Print the console report and exit (no GUI)
    #[arg(long, default_value_t = false)]
    pub report: bool,

    /// Outlier threshold on |delta_M| (overrides settings)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Histogram bin count (overrides settings)
    #[arg(long)]
    pub bins: Option<usize>,

    /// Number of outlier rows to preview (overrides settings)
    #[arg(long)]
    pub preview: Option<usize>,

    /// Path to settings JSON
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Write the table with M_New and delta_M appended to this CSV
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

impl Args {
    /// Settings from `--settings` (or defaults) with flag overrides applied.
    pub fn resolve_settings(&self) -> Result<AnalysisSettings> {
        let mut settings = match &self.settings {
            Some(path) => AnalysisSettings::load(path)?,
            None => AnalysisSettings::default(),
        };
        if let Some(t) = self.threshold {
            settings.outlier_threshold = t;
        }
        if let Some(b) = self.bins {
            settings.bins = b;
        }
        if let Some(p) = self.preview {
            settings.preview_rows = p;
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from(["dielectron-viewer", "data.csv", "--report", "--threshold", "0.5"]);
        assert!(args.report);
        assert_eq!(args.path, Some(PathBuf::from("data.csv")));
        let settings = args.resolve_settings().unwrap();
        assert_eq!(settings.outlier_threshold, 0.5);
        assert_eq!(settings.bins, 500);
    }
}
