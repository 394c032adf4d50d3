use std::fmt;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::analysis::Analysis;
use crate::data::model::EventDataset;

// ---------------------------------------------------------------------------
// Console report
// ---------------------------------------------------------------------------

/// One row of the outlier preview.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierRow {
    pub label: String,
    pub m: f64,
    pub m_new: f64,
    pub delta_m: f64,
}

/// Summary printed by `--report`.
#[derive(Debug, Clone)]
pub struct Report {
    pub rows: usize,
    /// Missing cells per column, file order.
    pub missing: Vec<(String, usize)>,
    pub non_physical: usize,
    pub undefined: usize,
    pub threshold: f64,
    pub outlier_count: usize,
    /// First few outliers, row order.
    pub preview: Vec<OutlierRow>,
}

impl Report {
    pub fn new(dataset: &EventDataset, analysis: &Analysis, preview_rows: usize) -> Self {
        Report {
            rows: dataset.len(),
            missing: dataset
                .missing_in_column_order()
                .into_iter()
                .map(|(c, n)| (c.to_string(), n))
                .collect(),
            non_physical: analysis.derived.non_physical,
            undefined: analysis.derived.undefined(),
            threshold: analysis.threshold,
            outlier_count: analysis.outliers.len(),
            preview: outlier_preview(dataset, analysis, preview_rows),
        }
    }
}

/// The first `n` outliers with their `M`, `M_New` and `delta_M`.
pub fn outlier_preview(dataset: &EventDataset, analysis: &Analysis, n: usize) -> Vec<OutlierRow> {
    analysis
        .outliers
        .iter()
        .filter_map(|&i| {
            let ev = &dataset.events[i];
            Some(OutlierRow {
                label: ev.label(),
                m: ev.m?,
                m_new: analysis.derived.m_new[i]?,
                delta_m: analysis.derived.delta_m[i]?,
            })
        })
        .take(n)
        .collect()
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} events loaded", self.rows)?;
        writeln!(f, "Missing values per column:")?;
        let width = self.missing.iter().map(|(c, _)| c.len()).max().unwrap_or(0);
        for (col, n) in &self.missing {
            writeln!(f, "  {col:<width$}  {n}")?;
        }
        writeln!(f, "{} events with negative mass squared", self.non_physical)?;
        writeln!(f, "{} events with undefined M_New", self.undefined)?;
        writeln!(
            f,
            "{} significant outliers found. (|delta_M| > {})",
            self.outlier_count, self.threshold
        )?;
        if !self.preview.is_empty() {
            writeln!(f, "{:<20} {:>12} {:>12} {:>12}", "event", "M", "M_New", "delta_M")?;
            for row in &self.preview {
                writeln!(
                    f,
                    "{:<20} {:>12.5} {:>12.5} {:>12.5}",
                    row.label, row.m, row.m_new, row.delta_m
                )?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ExportRow {
    #[serde(rename = "Run")]
    run: Option<i64>,
    #[serde(rename = "Event")]
    event: Option<i64>,
    #[serde(rename = "E1")]
    e1: Option<f64>,
    #[serde(rename = "E2")]
    e2: Option<f64>,
    px1: Option<f64>,
    px2: Option<f64>,
    py1: Option<f64>,
    py2: Option<f64>,
    pz1: Option<f64>,
    pz2: Option<f64>,
    #[serde(rename = "M")]
    m: Option<f64>,
    #[serde(rename = "M_New")]
    m_new: Option<f64>,
    #[serde(rename = "delta_M")]
    delta_m: Option<f64>,
}

/// Write every event with `M_New` and `delta_M` appended. Undefined values
/// become empty cells.
pub fn write_derived_csv<W: Write>(out: W, dataset: &EventDataset, analysis: &Analysis) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for ((ev, m_new), delta_m) in dataset
        .events
        .iter()
        .zip(&analysis.derived.m_new)
        .zip(&analysis.derived.delta_m)
    {
        writer
            .serialize(ExportRow {
                run: ev.run,
                event: ev.event,
                e1: ev.e1,
                e2: ev.e2,
                px1: ev.px1,
                px2: ev.px2,
                py1: ev.py1,
                py2: ev.py2,
                pz1: ev.pz1,
                pz2: ev.pz2,
                m: ev.m,
                m_new: *m_new,
                delta_m: *delta_m,
            })
            .with_context(|| format!("writing row {}", ev.row))?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

pub fn export_csv(path: &Path, dataset: &EventDataset, analysis: &Analysis) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_derived_csv(file, dataset, analysis)?;
    log::info!("Wrote {} events to {}", dataset.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv_reader;

    const TABLE: &str = "\
Run,Event,E1,E2,px1 ,px2,py1,py2,pz1,pz2,M
1,10,50,50,30,-30,0,0,0,0,100.4
1,11,1,1,10,0,0,0,0,0,3.0
1,12,50,50,30,-30,0,0,0,0,101.3
1,13,50,50,30,-30,0,0,0,0,
1,14,50,50,30,-30,0,0,0,0,98.0
";

    fn analysed() -> (EventDataset, Analysis) {
        let ds = load_csv_reader(TABLE.as_bytes()).unwrap();
        let analysis = Analysis::run(&ds, 1.0);
        (ds, analysis)
    }

    #[test]
    fn report_counts_and_preview() {
        let (ds, analysis) = analysed();
        let report = Report::new(&ds, &analysis, 5);
        assert_eq!(report.rows, 5);
        assert_eq!(report.non_physical, 1);
        assert_eq!(report.undefined, 1);
        assert_eq!(report.outlier_count, 2);
        assert_eq!(report.preview.len(), 2);
        assert_eq!(report.preview[0].label, "1:12");
        assert_eq!(report.preview[1].label, "1:14");
        assert!(report.missing.contains(&("M".to_string(), 1)));

        let text = report.to_string();
        assert!(text.contains("2 significant outliers found."));
        assert!(text.contains("1 events with negative mass squared"));
    }

    #[test]
    fn preview_is_truncated() {
        let (ds, analysis) = analysed();
        let preview = outlier_preview(&ds, &analysis, 1);
        assert_eq!(preview.len(), 1);
        assert_eq!(preview[0].m_new, 100.0);
    }

    #[test]
    fn export_keeps_every_row_with_empty_undefined_cells() {
        let (ds, analysis) = analysed();
        let mut buf = Vec::new();
        write_derived_csv(&mut buf, &ds, &analysis).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].ends_with("M,M_New,delta_M"));
        assert!(lines[2].starts_with("1,11,"));
        assert!(lines[2].ends_with("3.0,,"));
        assert!(lines[4].ends_with(",100.0,"));
    }
}
