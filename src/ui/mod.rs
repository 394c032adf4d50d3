//! Viewer widgets: the side/top panels and the central plot.

pub mod panels;
pub mod plot;
