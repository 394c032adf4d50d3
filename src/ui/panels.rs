use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::report::{export_csv, outlier_preview};
use crate::state::{AppState, PlotView};

/// Outlier rows listed in the side panel.
const PANEL_OUTLIER_ROWS: usize = 50;

// ---------------------------------------------------------------------------
// Left side panel – views, settings, outliers
// ---------------------------------------------------------------------------

/// Render the left analysis panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Plots");
    ui.separator();

    for view in PlotView::ALL {
        ui.radio_value(&mut state.view, view, view.title());
    }
    ui.separator();

    ui.strong("Settings");
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Bins");
        ui.add(egui::DragValue::new(&mut state.settings.bins).range(1..=5000));
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Comparison bins");
        ui.add(egui::DragValue::new(&mut state.settings.comparison_bins).range(1..=5000));
    });
    let mut threshold = state.settings.outlier_threshold;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Outlier |delta_M| >");
        ui.add(
            egui::DragValue::new(&mut threshold)
                .speed(0.05)
                .range(0.0..=f64::MAX),
        );
    });
    if threshold != state.settings.outlier_threshold {
        state.set_threshold(threshold);
    }
    ui.separator();

    let Some((dataset, analysis)) = state.loaded() else {
        ui.label("No dataset loaded.");
        return;
    };

    ui.strong("Summary");
    ui.label(format!("{} events", dataset.len()));
    ui.label(format!("{} with undefined M_New", analysis.derived.undefined()));
    ui.label(format!(
        "{} with negative mass squared",
        analysis.derived.non_physical
    ));
    ui.label(format!("{} significant outliers", analysis.outliers.len()));
    ui.separator();

    let preview = outlier_preview(dataset, analysis, PANEL_OUTLIER_ROWS);
    if preview.is_empty() {
        return;
    }
    ui.strong(format!("First {} outliers", preview.len()));

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .column(Column::auto())
                .columns(Column::auto(), 3)
                .header(18.0, |mut header| {
                    for title in ["event", "M", "M_New", "delta_M"] {
                        header.col(|ui: &mut Ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|mut body| {
                    for row in &preview {
                        body.row(16.0, |mut table_row| {
                            table_row.col(|ui: &mut Ui| {
                                ui.label(&row.label);
                            });
                            for v in [row.m, row.m_new, row.delta_m] {
                                table_row.col(|ui: &mut Ui| {
                                    ui.monospace(format!("{v:.4}"));
                                });
                            }
                        });
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let loaded = state.loaded().is_some();
            if ui
                .add_enabled(loaded, egui::Button::new("Export…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some((ds, analysis)) = state.loaded() {
            ui.label(format!(
                "{} events loaded, {} clean",
                ds.len(),
                analysis.clean.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open event table")
        .add_filter("Supported files", &["csv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let Some((dataset, analysis)) = state.loaded() else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export derived columns")
        .set_file_name("dielectron_derived.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = export_csv(&path, dataset, analysis) {
            log::error!("Failed to export: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
