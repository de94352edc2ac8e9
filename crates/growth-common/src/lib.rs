//! Common types and utilities shared across the growth chart crates.

pub mod error;
pub mod metric;
pub mod record;

pub use error::{GrowthError, GrowthResult, Stage};
pub use metric::{BodyMetric, CatalogKey, ChartKey, Sex, TableKind};
pub use record::{BodyComposition, ChildRecord};
