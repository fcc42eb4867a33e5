/// Data layer: core types, loading, normalisation and analysis.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode file → Dataset (ordered Records)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  detect columns → ColumnBinding; parse_salary per cell
///   └───────────┘
///        │            (session: Dataset + ColumnBinding, immutable)
///        ▼
///   ┌──────────┐
///   │ analysis  │  top-10 exclusion → grouping → IQR filter → median order
///   └──────────┘      + highlight entries (outliers / top earners)
///        │
///        ▼
///   ┌──────────┐
///   │  table    │  headers + cell text for the preview and highlight tables
///   └──────────┘
/// ```

pub mod analysis;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod session;
pub mod stats;
pub mod table;
