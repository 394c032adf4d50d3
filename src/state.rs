use std::path::Path;

use crate::data::analysis::Analysis;
use crate::data::model::EventDataset;
use crate::settings::AnalysisSettings;

// ---------------------------------------------------------------------------
// Plot views
// ---------------------------------------------------------------------------

/// Which plot the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotView {
    #[default]
    MassScatter,
    RecordedHistogram,
    RecomputedHistogram,
    CleanHistogram,
    Comparison,
    DeltaHistogram,
    EnergyVsDelta,
}

impl PlotView {
    pub const ALL: [PlotView; 7] = [
        PlotView::MassScatter,
        PlotView::RecordedHistogram,
        PlotView::RecomputedHistogram,
        PlotView::CleanHistogram,
        PlotView::Comparison,
        PlotView::DeltaHistogram,
        PlotView::EnergyVsDelta,
    ];

    pub fn title(self) -> &'static str {
        match self {
            PlotView::MassScatter => "M_New vs M",
            PlotView::RecordedHistogram => "Distribution of Original Invariant Mass",
            PlotView::RecomputedHistogram => "Distribution of Calculated Invariant Mass",
            PlotView::CleanHistogram => "Histogram of Cleaned M_New Values",
            PlotView::Comparison => "Comparison of M vs M_New",
            PlotView::DeltaHistogram => "Distribution of Differences Between M and M_New",
            PlotView::EnergyVsDelta => "Energy vs. Difference in Invariant Mass",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<EventDataset>,

    /// Derived columns and selections for `dataset`.
    pub analysis: Option<Analysis>,

    pub settings: AnalysisSettings,

    pub view: PlotView,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Ingest a newly loaded dataset and recompute its derived columns.
    pub fn set_dataset(&mut self, dataset: EventDataset) {
        self.analysis = Some(Analysis::run(&dataset, self.settings.outlier_threshold));
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Load `path`, reporting failure in the status bar.
    pub fn open(&mut self, path: &Path) {
        match crate::data::loader::load_file(path) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Change the outlier threshold; only the outlier selection is redone.
    pub fn set_threshold(&mut self, threshold: f64) {
        self.settings.outlier_threshold = threshold;
        if let Some(analysis) = &mut self.analysis {
            analysis.set_threshold(threshold);
        }
    }

    /// Dataset and analysis together, once a file is loaded.
    pub fn loaded(&self) -> Option<(&EventDataset, &Analysis)> {
        Some((self.dataset.as_ref()?, self.analysis.as_ref()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv_reader;

    const TABLE: &str = "\
E1,E2,px1,px2,py1,py2,pz1,pz2,M
50,50,30,-30,0,0,0,0,101.3
50,50,30,-30,0,0,0,0,100.7
";

    #[test]
    fn dataset_and_threshold_flow_through() {
        let mut state = AppState::default();
        assert!(state.loaded().is_none());
        state.open(Path::new("missing.unknown"));
        assert!(state.status_message.is_some());

        state.set_dataset(load_csv_reader(TABLE.as_bytes()).unwrap());
        let (_, analysis) = state.loaded().unwrap();
        assert_eq!(analysis.outliers, vec![0]);
        assert!(state.status_message.is_none());

        state.set_threshold(0.5);
        let (_, analysis) = state.loaded().unwrap();
        assert_eq!(analysis.outliers, vec![0, 1]);
        assert_eq!(state.settings.outlier_threshold, 0.5);
    }

    #[test]
    fn failed_open_sets_status() {
        let mut state = AppState::default();
        state.open(Path::new("missing.unknown"));
        assert!(state.dataset.is_none());
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Error:")));
    }
}
