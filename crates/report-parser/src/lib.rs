//! Body-composition report extraction.
//!
//! Reports are third-party HTML pages. [`parse_report`] reads one page into
//! a [`ChildRecord`](growth_common::ChildRecord); [`HttpReportSource`]
//! fetches pages over HTTP.

pub mod parse;
pub mod source;

pub use parse::parse_report;
pub use source::{HttpReportSource, ReportSource};
