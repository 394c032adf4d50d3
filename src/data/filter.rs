use super::mass::DerivedColumns;

/// Default `|delta_M|` above which an event counts as an outlier.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 1.0;

/// Indices of events with a defined `M_New`, in row order.
///
/// Events left out here stay in the full dataset.
pub fn clean_indices(derived: &DerivedColumns) -> Vec<usize> {
    derived
        .m_new
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_some())
        .map(|(i, _)| i)
        .collect()
}

/// Whether a single `delta_M` marks an outlier. Strictly greater than.
pub fn is_outlier(delta_m: f64, threshold: f64) -> bool {
    delta_m.abs() > threshold
}

/// Indices of events whose `|delta_M|` exceeds `threshold`, in row order.
/// Events with undefined `delta_M` never qualify.
pub fn outlier_indices(derived: &DerivedColumns, threshold: f64) -> Vec<usize> {
    derived
        .delta_m
        .iter()
        .enumerate()
        .filter(|(_, d)| d.is_some_and(|d| is_outlier(d, threshold)))
        .map(|(i, _)| i)
        .collect()
}
