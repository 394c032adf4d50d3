// ---------------------------------------------------------------------------
// Fixed-width histograms for the plot views
// ---------------------------------------------------------------------------

/// Bin count used for single distributions.
pub const DEFAULT_BINS: usize = 500;
/// Bin count used when overlaying two distributions.
pub const COMPARISON_BINS: usize = 100;

/// Equal-width histogram. `counts[i]` covers
/// `[lo + i * width, lo + (i + 1) * width)`; the last bin is closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub lo: f64,
    pub width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` over their own finite range.
    pub fn from_values(values: &[f64], bins: usize) -> Self {
        match finite_range(values) {
            Some((lo, hi)) => Self::with_range(values, bins, lo, hi),
            None => Self::empty(),
        }
    }

    /// Bin `values` over `[lo, hi]`. Values outside the range or not finite
    /// are skipped.
    pub fn with_range(values: &[f64], bins: usize, lo: f64, hi: f64) -> Self {
        let bins = bins.max(1);
        // All values equal: one unit-wide bin centred on the value.
        if hi <= lo {
            let count = values.iter().filter(|&&v| v == lo).count();
            return Histogram {
                lo: lo - 0.5,
                width: 1.0,
                counts: vec![count],
            };
        }

        // Offsets are taken at half scale so spans near ±f64::MAX stay finite.
        let half_width = (hi * 0.5 - lo * 0.5) / bins as f64;
        let mut counts = vec![0; bins];
        for &v in values {
            if !v.is_finite() || v < lo || v > hi {
                continue;
            }
            let idx = (((v * 0.5 - lo * 0.5) / half_width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Histogram {
            lo,
            width: half_width * 2.0,
            counts,
        }
    }

    pub fn empty() -> Self {
        Histogram {
            lo: 0.0,
            width: 1.0,
            counts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of binned values.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn bin_center(&self, idx: usize) -> f64 {
        self.lo + (idx as f64 + 0.5) * self.width
    }

    /// `(centre, count)` for every bin.
    pub fn bars(&self) -> impl Iterator<Item = (f64, usize)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| (self.bin_center(i), c))
    }
}

/// Histograms of two series over their shared finite range.
pub fn overlay(a: &[f64], b: &[f64], bins: usize) -> (Histogram, Histogram) {
    let range = match (finite_range(a), finite_range(b)) {
        (Some((alo, ahi)), Some((blo, bhi))) => Some((alo.min(blo), ahi.max(bhi))),
        (Some(r), None) | (None, Some(r)) => Some(r),
        (None, None) => None,
    };
    match range {
        Some((lo, hi)) => (
            Histogram::with_range(a, bins, lo, hi),
            Histogram::with_range(b, bins, lo, hi),
        ),
        None => (Histogram::empty(), Histogram::empty()),
    }
}

fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn bins_values_and_closes_last_bin() {
        let h = Histogram::from_values(&[0.0, 1.0, 2.5, 9.9, 10.0], 10);
        assert_eq!(h.counts.len(), 10);
        assert_relative_eq!(h.width, 1.0);
        assert_eq!(h.counts[0], 1);
        assert_eq!(h.counts[1], 1);
        assert_eq!(h.counts[2], 1);
        assert_eq!(h.counts[9], 2);
        assert_eq!(h.total(), 5);
        assert_relative_eq!(h.bin_center(0), 0.5);
    }

    #[test]
    fn skips_non_finite_values() {
        let h = Histogram::from_values(&[f64::NAN, 1.0, f64::INFINITY, 3.0], 2);
        assert_eq!(h.counts, vec![1, 1]);
    }

    #[test]
    fn degenerate_and_empty_inputs() {
        let h = Histogram::from_values(&[91.2, 91.2], 500);
        assert_eq!(h.counts, vec![2]);
        assert_relative_eq!(h.bin_center(0), 91.2);

        assert!(Histogram::from_values(&[], 500).is_empty());
        assert!(Histogram::from_values(&[f64::NAN], 500).is_empty());
    }

    #[test]
    fn spans_beyond_f64_max_still_spread() {
        let h = Histogram::from_values(&[-f64::MAX, -f64::MAX / 3.0, f64::MAX / 3.0, f64::MAX], 4);
        assert!(h.width.is_finite());
        assert_eq!(h.counts, vec![1, 1, 1, 1]);
    }

    #[test]
    fn overlay_shares_the_range() {
        let (a, b) = overlay(&[0.0, 4.0], &[6.0, 10.0], 5);
        assert_eq!(a.lo, b.lo);
        assert_eq!(a.width, b.width);
        assert_eq!(a.counts, vec![1, 0, 1, 0, 0]);
        assert_eq!(b.counts, vec![0, 0, 0, 1, 1]);

        let (a, b) = overlay(&[], &[1.0, 2.0], 2);
        assert!(a.counts.iter().all(|&c| c == 0));
        assert_eq!(b.total(), 2);
    }
}
