use std::collections::BTreeMap;
use std::fmt;
use std::ops::Add;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Kinematic source columns, in the order the mass formula consumes them.
pub const KINEMATIC_COLUMNS: [&str; 8] = ["E1", "E2", "px1", "px2", "py1", "py2", "pz1", "pz2"];

/// Recorded invariant mass.
pub const MASS_COLUMN: &str = "M";
pub const RUN_COLUMN: &str = "Run";
pub const EVENT_COLUMN: &str = "Event";

// ---------------------------------------------------------------------------
// FourMomentum – (E, px, py, pz)
// ---------------------------------------------------------------------------

/// Energy and momentum of one particle, in detector units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FourMomentum {
    pub e: f64,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
}

impl FourMomentum {
    pub fn new(e: f64, px: f64, py: f64, pz: f64) -> Self {
        Self { e, px, py, pz }
    }

    /// `E² - |p|²`. Negative for combinations that no real particle has.
    pub fn mass_squared(&self) -> f64 {
        self.e.powi(2) - self.px.powi(2) - self.py.powi(2) - self.pz.powi(2)
    }
}

impl Add for FourMomentum {
    type Output = FourMomentum;

    fn add(self, rhs: FourMomentum) -> FourMomentum {
        FourMomentum {
            e: self.e + rhs.e,
            px: self.px + rhs.px,
            py: self.py + rhs.py,
            pz: self.pz + rhs.pz,
        }
    }
}

impl fmt::Display for FourMomentum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(E={:.4}, px={:.4}, py={:.4}, pz={:.4})",
            self.e, self.px, self.py, self.pz
        )
    }
}

// ---------------------------------------------------------------------------
// Event – one row of the table
// ---------------------------------------------------------------------------

/// One electron-pair event. Every source cell is optional; `None` is an
/// empty cell in the input file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    /// Zero-based row index in the source file.
    pub row: usize,
    pub run: Option<i64>,
    pub event: Option<i64>,
    pub e1: Option<f64>,
    pub e2: Option<f64>,
    pub px1: Option<f64>,
    pub px2: Option<f64>,
    pub py1: Option<f64>,
    pub py2: Option<f64>,
    pub pz1: Option<f64>,
    pub pz2: Option<f64>,
    /// Previously recorded invariant mass.
    pub m: Option<f64>,
}

impl Event {
    /// Build an event from a column lookup. `value` is called with each
    /// trimmed column name and returns the cell, or `None` when empty.
    pub fn from_lookup<F>(row: usize, mut value: F) -> Self
    where
        F: FnMut(&str) -> Option<f64>,
    {
        Event {
            row,
            run: value(RUN_COLUMN).map(|v| v as i64),
            event: value(EVENT_COLUMN).map(|v| v as i64),
            e1: value("E1"),
            e2: value("E2"),
            px1: value("px1"),
            px2: value("px2"),
            py1: value("py1"),
            py2: value("py2"),
            pz1: value("pz1"),
            pz2: value("pz2"),
            m: value(MASS_COLUMN),
        }
    }

    /// Both particles' four-momenta, or `None` when any component is missing.
    pub fn four_momenta(&self) -> Option<(FourMomentum, FourMomentum)> {
        let p1 = FourMomentum::new(self.e1?, self.px1?, self.py1?, self.pz1?);
        let p2 = FourMomentum::new(self.e2?, self.px2?, self.py2?, self.pz2?);
        Some((p1, p2))
    }

    /// Short label for previews: `run:event` when known, else the row index.
    pub fn label(&self) -> String {
        match (self.run, self.event) {
            (Some(run), Some(event)) => format!("{run}:{event}"),
            _ => format!("row {}", self.row),
        }
    }
}

// ---------------------------------------------------------------------------
// EventDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table.
#[derive(Debug, Clone, Default)]
pub struct EventDataset {
    /// All events, in file order.
    pub events: Vec<Event>,
    /// Trimmed column names in file order.
    pub column_names: Vec<String>,
    /// Number of empty cells per column.
    pub missing_counts: BTreeMap<String, usize>,
}

impl EventDataset {
    pub fn new(events: Vec<Event>, column_names: Vec<String>) -> Self {
        let missing_counts = column_names.iter().map(|c| (c.clone(), 0)).collect();
        EventDataset {
            events,
            column_names,
            missing_counts,
        }
    }

    /// Record one empty cell for `column`.
    pub fn note_missing(&mut self, column: &str) {
        *self.missing_counts.entry(column.to_string()).or_default() += 1;
    }

    /// Missing counts in file column order.
    pub fn missing_in_column_order(&self) -> Vec<(&str, usize)> {
        self.column_names
            .iter()
            .map(|c| (c.as_str(), self.missing_counts.get(c).copied().unwrap_or(0)))
            .collect()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Recorded masses, `None` for missing cells.
    pub fn recorded_masses(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.events.iter().map(|ev| ev.m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_of_back_to_back_pair_is_at_rest() {
        let p1 = FourMomentum::new(50.0, 30.0, 0.0, 0.0);
        let p2 = FourMomentum::new(50.0, -30.0, 0.0, 0.0);
        let total = p1 + p2;
        assert_eq!(total, FourMomentum::new(100.0, 0.0, 0.0, 0.0));
        assert_eq!(total.mass_squared(), 10_000.0);
    }

    #[test]
    fn four_momenta_requires_every_component() {
        let mut ev = Event {
            e1: Some(1.0),
            e2: Some(1.0),
            px1: Some(0.0),
            px2: Some(0.0),
            py1: Some(0.0),
            py2: Some(0.0),
            pz1: Some(0.0),
            pz2: Some(0.0),
            ..Default::default()
        };
        assert!(ev.four_momenta().is_some());
        ev.py2 = None;
        assert!(ev.four_momenta().is_none());
    }

    #[test]
    fn label_prefers_run_and_event() {
        let mut ev = Event {
            row: 7,
            ..Default::default()
        };
        assert_eq!(ev.label(), "row 7");
        ev.run = Some(147115);
        ev.event = Some(366639895);
        assert_eq!(ev.label(), "147115:366639895");
    }

    #[test]
    fn missing_counts_follow_column_order() {
        let mut ds = EventDataset::new(Vec::new(), vec!["E1".into(), "M".into()]);
        ds.note_missing("M");
        ds.note_missing("M");
        assert_eq!(ds.missing_in_column_order(), vec![("E1", 0), ("M", 2)]);
    }
}
