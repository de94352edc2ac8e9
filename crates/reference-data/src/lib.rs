//! WHO growth reference tables.
//!
//! Loads the percentile and z-score CSV downloads, renames their headers to
//! one canonical schema, converts composite `years:months` ages to fractional
//! years, and keeps the results in a read-only [`ReferenceCatalog`].

pub mod age;
pub mod catalog;
pub mod columns;
pub mod table;

pub use age::parse_age;
pub use catalog::{CatalogEntrySummary, FailedEntry, LoadReport, ReferenceCatalog, ReferenceManifest};
pub use columns::{normalize_header, normalize_headers, AGE_MONTHS, AGE_YEARS, CURVE_COLUMNS};
pub use table::ReferenceTable;
