//! Report fetching.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument};

use growth_common::{ChildRecord, GrowthError, GrowthResult};

use crate::parse::parse_report;

/// Something that turns a report link into a child record.
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Fetch and parse the report at `url`.
    ///
    /// Any failure is a [`GrowthError::Scrape`].
    async fn fetch(&self, url: &str) -> GrowthResult<ChildRecord>;
}

/// Fetches report pages over HTTP.
pub struct HttpReportSource {
    client: Client,
}

impl HttpReportSource {
    pub fn new(timeout: Duration) -> GrowthResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GrowthError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReportSource for HttpReportSource {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> GrowthResult<ChildRecord> {
        debug!("Fetching report");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GrowthError::Scrape(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GrowthError::Scrape(format!("report returned HTTP {}", status)));
        }

        let html = response
            .text()
            .await
            .map_err(|e| GrowthError::Scrape(format!("unreadable body: {}", e)))?;

        let record = parse_report(&html)?;
        info!(name = %record.name, bytes = html.len(), "Extracted report");
        Ok(record)
    }
}
