/// Data layer: listing types, loading/cleaning, memoization and filtering.
///
/// Architecture:
/// ```text
///  .csv.gz / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  project columns, normalize price, drop incomplete rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  one CleanedDataset per path, shared via Arc
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterCriteria → FilteredView (indices, count, mean)
///   └──────────┘
/// ```

pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
