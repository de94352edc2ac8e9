//! The per-request pipeline: scrape, render, upload, write back.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crm_client::{WriteBack, WriteBackPayload};
use growth_common::{ChartKey, ChildRecord, GrowthError, Stage};
use reference_data::ReferenceCatalog;
use report_parser::ReportSource;
use storage::{chart_object_name, ChartSink};

use crate::comparison::{compare, ChartArtifact};

/// A request-level failure, tagged with the stage that failed.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    pub source: GrowthError,
}

impl PipelineError {
    fn new(stage: Stage, source: GrowthError) -> Self {
        Self { stage, source }
    }

    pub fn http_status_code(&self) -> u16 {
        self.source.http_status_code()
    }
}

/// Per-chart result reported back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ChartReport {
    pub chart: String,
    pub rendered: bool,
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a successfully written-back request.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub request_id: Uuid,
    pub processed_at: DateTime<Utc>,
    pub name: String,
    pub charts: Vec<ChartReport>,
}

/// Collaborators and settings one pipeline run needs.
pub struct Pipeline {
    pub catalog: Arc<ReferenceCatalog>,
    pub reports: Arc<dyn ReportSource>,
    pub sink: Arc<dyn ChartSink>,
    pub crm: Arc<dyn WriteBack>,
    pub output_dir: PathBuf,
    pub type_id: u32,
}

impl Pipeline {
    /// Process one report link for CRM item `item_id`.
    ///
    /// Chart rendering and upload failures are absorbed (the chart's URL is
    /// written back as null). Scrape and write-back failures abort the run.
    #[instrument(skip(self), fields(request_id))]
    pub async fn run(&self, link: &str, item_id: &str) -> Result<ProcessOutcome, PipelineError> {
        let request_id = Uuid::new_v4();
        tracing::Span::current().record("request_id", tracing::field::display(request_id));

        let record = self
            .reports
            .fetch(link)
            .await
            .map_err(|e| PipelineError::new(Stage::Scrape, e))?;
        info!(name = %record.name, age = record.age_years, gender = %record.gender, "Report extracted");

        let artifacts = self.render(request_id, &record).await?;
        let urls = self.upload(&record, &artifacts).await;
        self.discard_local(request_id).await;

        let payload = WriteBackPayload::build(self.type_id, item_id, &record, link, &urls);
        self.crm
            .update_item(&payload)
            .await
            .map_err(|e| PipelineError::new(Stage::WriteBack, e))?;

        let charts = artifacts
            .iter()
            .map(|artifact| ChartReport {
                chart: artifact.key.slug(),
                rendered: artifact.is_rendered(),
                url: urls.get(&artifact.key).cloned().flatten(),
                error: artifact.outcome.as_ref().err().map(|e| e.to_string()),
            })
            .collect();

        Ok(ProcessOutcome {
            request_id,
            processed_at: Utc::now(),
            name: record.name,
            charts,
        })
    }

    /// Render off the async workers; charts go to `{output_dir}/{request_id}/`
    /// and are removed after upload.
    async fn render(
        &self,
        request_id: Uuid,
        record: &ChildRecord,
    ) -> Result<Vec<ChartArtifact>, PipelineError> {
        let catalog = Arc::clone(&self.catalog);
        let record = record.clone();
        let out_dir = self.request_dir(request_id);

        tokio::task::spawn_blocking(move || compare(&catalog, &record, &out_dir))
            .await
            .map_err(|e| {
                PipelineError::new(
                    Stage::Render,
                    GrowthError::Render(format!("render task failed: {}", e)),
                )
            })
    }

    fn request_dir(&self, request_id: Uuid) -> PathBuf {
        self.output_dir.join(request_id.to_string())
    }

    /// Remove the request's chart directory once its charts are uploaded.
    async fn discard_local(&self, request_id: Uuid) {
        let dir = self.request_dir(request_id);
        if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
            warn!(path = %dir.display(), error = %e, "Failed to remove local charts");
        }
    }

    /// Upload rendered charts one at a time; failures leave the URL empty.
    async fn upload(
        &self,
        record: &ChildRecord,
        artifacts: &[ChartArtifact],
    ) -> BTreeMap<ChartKey, Option<String>> {
        let mut urls = BTreeMap::new();
        for artifact in artifacts {
            let url = if artifact.is_rendered() {
                let dest = chart_object_name(&record.name, &artifact.key.slug());
                match self.sink.upload(&artifact.path, &dest).await {
                    Ok(url) => Some(url),
                    Err(e) => {
                        error!(chart = %artifact.key, error = %e, "Chart upload failed");
                        None
                    }
                }
            } else {
                warn!(chart = %artifact.key, "Skipping upload of unrendered chart");
                None
            };
            urls.insert(artifact.key, url);
        }
        urls
    }
}
