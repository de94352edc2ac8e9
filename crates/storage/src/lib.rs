//! Storage for rendered growth charts.
//!
//! Provides:
//! - An S3-compatible object storage client (GCS through its S3 interop
//!   endpoint, MinIO, AWS)
//! - The [`ChartSink`] seam the request pipeline uploads through

pub mod object_store;
pub mod sink;

pub use self::object_store::{ObjectStorage, ObjectStorageConfig};
pub use sink::{chart_object_name, ChartSink};
