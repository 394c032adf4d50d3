//! Invariant-mass recalculation for dielectron event tables, with a
//! console report and an egui viewer for the resulting distributions.

pub mod app;
pub mod cli;
pub mod color;
pub mod data;
pub mod report;
pub mod settings;
pub mod state;
pub mod ui;
