//! Growth chart service library.
//!
//! Turns a body-composition report link into six WHO growth comparison
//! charts, uploads them, and writes the measurements and chart URLs back to
//! the CRM record.

pub mod comparison;
pub mod config;
pub mod handlers;
pub mod page;
pub mod pipeline;
pub mod server;
pub mod state;
