//! Error types for the growth chart services.

use std::fmt;

use thiserror::Error;

/// Result type alias using GrowthError.
pub type GrowthResult<T> = Result<T, GrowthError>;

/// Primary error type for growth chart operations.
#[derive(Debug, Error)]
pub enum GrowthError {
    // === Reference Data Errors ===
    #[error("Failed to load reference table {path}: {message}")]
    SourceLoad { path: String, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    // === Chart Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    // === Collaborator Errors ===
    #[error("Report extraction failed: {0}")]
    Scrape(String),

    #[error("External call failed: {0}")]
    ExternalCall(String),

    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    // === Infrastructure Errors ===
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GrowthError {
    /// Whether this error aborts the whole request rather than one chart.
    pub fn is_request_fatal(&self) -> bool {
        matches!(
            self,
            GrowthError::Scrape(_) | GrowthError::ExternalCall(_) | GrowthError::Unauthenticated(_)
        )
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            GrowthError::Scrape(_) => 400,
            GrowthError::Unauthenticated(_) => 401,
            GrowthError::ExternalCall(_) => 502,
            _ => 500,
        }
    }
}

impl From<serde_json::Error> for GrowthError {
    fn from(err: serde_json::Error) -> Self {
        GrowthError::Parse(format!("JSON error: {}", err))
    }
}

/// Request pipeline stage, used to name the failing step to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Scrape,
    Render,
    Upload,
    WriteBack,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Scrape => "scrape",
            Stage::Render => "render",
            Stage::Upload => "upload",
            Stage::WriteBack => "write-back",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
