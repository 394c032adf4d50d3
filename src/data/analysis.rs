use super::filter::{clean_indices, outlier_indices};
use super::mass::{recompute, DerivedColumns};
use super::model::EventDataset;

// ---------------------------------------------------------------------------
// Analysis – derived columns plus the views built on them
// ---------------------------------------------------------------------------

/// Everything computed from a loaded dataset.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub derived: DerivedColumns,
    /// Rows with a defined `M_New`.
    pub clean: Vec<usize>,
    /// Rows with `|delta_M| > threshold`.
    pub outliers: Vec<usize>,
    pub threshold: f64,
}

impl Analysis {
    pub fn run(dataset: &EventDataset, threshold: f64) -> Self {
        let derived = recompute(dataset);
        let clean = clean_indices(&derived);
        let outliers = outlier_indices(&derived, threshold);
        log::info!(
            "Recomputed M_New for {} events: {} clean, {} outliers (|delta_M| > {threshold})",
            derived.len(),
            clean.len(),
            outliers.len()
        );
        Analysis {
            derived,
            clean,
            outliers,
            threshold,
        }
    }

    /// Re-select outliers without touching the derived columns.
    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
        self.outliers = outlier_indices(&self.derived, threshold);
    }

    /// Defined `M_New` values, in row order.
    pub fn m_new_values(&self) -> Vec<f64> {
        self.derived.m_new.iter().flatten().copied().collect()
    }

    /// `M_New` of the clean view.
    pub fn clean_m_new(&self) -> Vec<f64> {
        self.clean
            .iter()
            .filter_map(|&i| self.derived.m_new[i])
            .collect()
    }

    /// Defined `delta_M` values, in row order.
    pub fn delta_m_values(&self) -> Vec<f64> {
        self.derived.delta_m.iter().flatten().copied().collect()
    }

    /// `(M_New, M)` pairs where both are defined.
    pub fn m_new_vs_m(&self, dataset: &EventDataset) -> Vec<[f64; 2]> {
        dataset
            .events
            .iter()
            .zip(&self.derived.m_new)
            .filter_map(|(ev, m_new)| Some([(*m_new)?, ev.m?]))
            .collect()
    }

    /// `(E1, delta_M)` pairs where both are defined.
    pub fn e1_vs_delta_m(&self, dataset: &EventDataset) -> Vec<[f64; 2]> {
        dataset
            .events
            .iter()
            .zip(&self.derived.delta_m)
            .filter_map(|(ev, delta)| Some([ev.e1?, (*delta)?]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Event;

    fn z_event(row: usize, m: Option<f64>, e1: f64) -> Event {
        // Back-to-back pair with invariant mass 2 * e1.
        Event {
            row,
            e1: Some(e1),
            e2: Some(e1),
            px1: Some(0.0),
            px2: Some(0.0),
            py1: Some(0.0),
            py2: Some(0.0),
            pz1: Some(e1 / 2.0),
            pz2: Some(-e1 / 2.0),
            m,
            ..Default::default()
        }
    }

    fn dataset() -> EventDataset {
        let mut bad = z_event(2, Some(50.0), 1.0);
        bad.px1 = Some(10.0);
        EventDataset::new(
            vec![
                z_event(0, Some(90.0), 45.0),
                z_event(1, Some(95.0), 45.0),
                bad,
                z_event(3, None, 40.0),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn run_builds_views() {
        let ds = dataset();
        let analysis = Analysis::run(&ds, 1.0);
        assert_eq!(analysis.clean, vec![0, 1, 3]);
        assert_eq!(analysis.outliers, vec![1]);
        assert_eq!(analysis.m_new_values(), vec![90.0, 90.0, 80.0]);
        assert_eq!(analysis.clean_m_new(), vec![90.0, 90.0, 80.0]);
        assert_eq!(analysis.delta_m_values(), vec![0.0, 5.0]);
        assert_eq!(analysis.m_new_vs_m(&ds), vec![[90.0, 90.0], [90.0, 95.0]]);
        assert_eq!(analysis.e1_vs_delta_m(&ds), vec![[45.0, 0.0], [45.0, 5.0]]);
    }

    #[test]
    fn threshold_change_reselects_outliers_only() {
        let ds = dataset();
        let mut analysis = Analysis::run(&ds, 1.0);
        let before = analysis.derived.clone();
        analysis.set_threshold(10.0);
        assert!(analysis.outliers.is_empty());
        analysis.set_threshold(-1.0);
        assert_eq!(analysis.outliers, vec![0, 1]);
        assert_eq!(analysis.derived, before);
    }
}
