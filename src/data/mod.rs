/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  URL (CSV) / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse → SalesDataset, held by a DatasetHandle
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  price window, cluster and category sets, dealer exclusion
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  cluster summary, map points, top dealers / models
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod source;
