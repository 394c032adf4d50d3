use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, PlotUi, Points};

use crate::color::Series;
use crate::data::histogram::{overlay, Histogram};
use crate::state::{AppState, PlotView};

// ---------------------------------------------------------------------------
// Analysis plot (central panel)
// ---------------------------------------------------------------------------

/// Render the selected plot view in the central panel.
pub fn analysis_plot(ui: &mut Ui, state: &AppState) {
    let Some((dataset, analysis)) = state.loaded() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open an event table to start  (File → Open…)");
        });
        return;
    };

    let view = state.view;
    let bins = state.settings.bins;
    let (x_label, y_label) = axis_labels(view);

    ui.heading(view.title());

    Plot::new(format!("plot_{view:?}"))
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| match view {
            PlotView::MassScatter => {
                scatter(plot_ui, analysis.m_new_vs_m(dataset), "events");
            }
            PlotView::RecordedHistogram => {
                let m: Vec<f64> = dataset.recorded_masses().flatten().collect();
                histogram(plot_ui, &Histogram::from_values(&m, bins), "M", Series::RecordedMass.color());
            }
            PlotView::RecomputedHistogram => {
                let h = Histogram::from_values(&analysis.m_new_values(), bins);
                histogram(plot_ui, &h, "M_New", Series::RecomputedMass.color());
            }
            PlotView::CleanHistogram => {
                let h = Histogram::from_values(&analysis.clean_m_new(), bins);
                histogram(plot_ui, &h, "M_New (cleaned)", Series::CleanMass.color());
            }
            PlotView::Comparison => {
                let m: Vec<f64> = dataset.recorded_masses().flatten().collect();
                let (hm, hnew) = overlay(&m, &analysis.clean_m_new(), state.settings.comparison_bins);
                histogram(plot_ui, &hm, "Original M", Series::ComparisonRecorded.translucent(0.5));
                histogram(
                    plot_ui,
                    &hnew,
                    "Calculated M_New",
                    Series::ComparisonRecomputed.translucent(0.5),
                );
            }
            PlotView::DeltaHistogram => {
                let h = Histogram::from_values(&analysis.delta_m_values(), bins);
                histogram(plot_ui, &h, "delta_M", Series::DeltaMass.color());
            }
            PlotView::EnergyVsDelta => {
                scatter(plot_ui, analysis.e1_vs_delta_m(dataset), "events");
            }
        });
}

fn axis_labels(view: PlotView) -> (&'static str, &'static str) {
    match view {
        PlotView::MassScatter => (
            "Calculated Invariant Mass (M_New)",
            "Original Invariant Mass (M)",
        ),
        PlotView::RecordedHistogram => ("Invariant Mass (M)", "Frequency"),
        PlotView::RecomputedHistogram => ("Calculated Invariant Mass (M_New)", "Frequency"),
        PlotView::CleanHistogram => ("M_New (Cleaned Data)", "Frequency"),
        PlotView::Comparison => ("Invariant Mass", "Frequency"),
        PlotView::DeltaHistogram => ("Difference Between M and M_New (delta_M)", "Frequency"),
        PlotView::EnergyVsDelta => ("Energy (E1)", "Difference in Invariant Mass (delta_M)"),
    }
}

fn scatter(plot_ui: &mut PlotUi, points: Vec<[f64; 2]>, name: &str) {
    let points: PlotPoints = points.into_iter().collect();
    plot_ui.points(
        Points::new(points)
            .name(name)
            .color(Series::Scatter.translucent(0.5))
            .radius(1.5),
    );
}

fn histogram(plot_ui: &mut PlotUi, hist: &Histogram, name: &str, fill: Color32) {
    let bars: Vec<Bar> = hist
        .bars()
        .map(|(center, count)| {
            Bar::new(center, count as f64)
                .width(hist.width)
                .fill(fill)
        })
        .collect();
    plot_ui.bar_chart(BarChart::new(bars).name(name).color(fill));
}
