/// Data layer: event model, loading, mass recalculation and selections.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → EventDataset (trimmed column names)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   mass   │  per-event invariant mass → M_New, delta_M
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  clean view (defined M_New), outliers (|delta_M| > threshold)
///   └──────────┘
/// ```
///
/// `analysis` bundles the three steps; `histogram` bins the resulting
/// columns for the plot views.

pub mod analysis;
pub mod filter;
pub mod histogram;
pub mod loader;
pub mod mass;
pub mod model;
