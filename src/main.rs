use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;

use dielectron_viewer::app::DielectronApp;
use dielectron_viewer::cli;
use dielectron_viewer::data::{analysis::Analysis, loader};
use dielectron_viewer::report;
use dielectron_viewer::settings::AnalysisSettings;
use dielectron_viewer::state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();
    let settings = args.resolve_settings()?;

    if args.report || args.export.is_some() {
        return run_headless(&args, &settings);
    }

    let mut state = AppState::new(settings);
    if let Some(path) = &args.path {
        state.open(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Dielectron Viewer – Invariant Mass",
        options,
        Box::new(move |_cc| Ok(Box::new(DielectronApp::new(state)))),
    )
    .map_err(|e| anyhow!("running viewer: {e}"))
}

/// Load, recompute, then print the report and/or export the table.
fn run_headless(args: &cli::Args, settings: &AnalysisSettings) -> Result<()> {
    let path = args
        .path
        .as_deref()
        .context("an input PATH is required with --report or --export")?;
    let dataset = loader::load_file(path)?;
    let analysis = Analysis::run(&dataset, settings.outlier_threshold);

    if args.report {
        print!(
            "{}",
            report::Report::new(&dataset, &analysis, settings.preview_rows)
        );
    }
    if let Some(out) = &args.export {
        report::export_csv(out, &dataset, &analysis)?;
    }
    Ok(())
}
