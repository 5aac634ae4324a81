/// Data layer: core types, loading, filtering and chart aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse + validate file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset  │  Vec<Track>, sorted genre index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  genre + popularity predicates → FilteredView
///   └──────────┘
///        │                         │
///        ▼                         ▼
///   ┌───────────┐           ┌───────────┐
///   │ aggregate │ → charts  │  export   │ → .csv / .parquet
///   └───────────┘           └───────────┘
///
///   chart click → selection → re-filter → Track / not found
/// ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod selection;
