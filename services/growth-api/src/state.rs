//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crm_client::{CrmClient, OAuthClient, TokenStore, WriteBack};
use reference_data::ReferenceCatalog;
use report_parser::{HttpReportSource, ReportSource};
use storage::{ChartSink, ObjectStorage};

use crate::config::ServiceConfig;
use crate::pipeline::Pipeline;

/// Shared application state.
pub struct AppState {
    /// Reference tables, loaded once at startup.
    pub catalog: Arc<ReferenceCatalog>,
    pub reports: Arc<dyn ReportSource>,
    pub sink: Arc<dyn ChartSink>,
    /// Write-back through the incoming webhook (`/process`).
    pub webhook_crm: Option<Arc<dyn WriteBack>>,
    /// Write-back through OAuth bearer calls (`/webhook`).
    pub oauth_crm: Option<Arc<dyn WriteBack>>,
    /// Same client as `oauth_crm`, for the token probe.
    pub crm_user: Option<Arc<CrmClient>>,
    pub oauth: Option<Arc<OAuthClient>>,
    pub tokens: Arc<TokenStore>,
    pub output_dir: PathBuf,
    pub rpa_type_id: u32,
}

impl AppState {
    /// Build the production collaborators from configuration.
    pub fn from_config(config: &ServiceConfig, catalog: Arc<ReferenceCatalog>) -> Result<Self> {
        let reports: Arc<dyn ReportSource> = Arc::new(HttpReportSource::new(config.http_timeout)?);
        let sink: Arc<dyn ChartSink> = Arc::new(ObjectStorage::new(&config.storage)?);
        let tokens = Arc::new(TokenStore::new());

        let webhook_crm: Option<Arc<dyn WriteBack>> = match &config.crm_webhook_url {
            Some(url) => Some(Arc::new(CrmClient::webhook(url.clone(), config.http_timeout)?)),
            None => {
                warn!("BITRIX_WEBHOOK_URL not set; /process is disabled");
                None
            }
        };

        let (oauth, crm_user) = match &config.oauth {
            Some(oauth_config) => {
                let oauth = Arc::new(OAuthClient::new(oauth_config.clone(), config.http_timeout)?);
                let client = Arc::new(CrmClient::oauth(
                    config.crm_api_url.clone(),
                    Arc::clone(&oauth),
                    Arc::clone(&tokens),
                    config.http_timeout,
                )?);
                (Some(oauth), Some(client))
            }
            None => {
                warn!("BITRIX_CLIENT_ID/BITRIX_CLIENT_SECRET not set; OAuth routes are disabled");
                (None, None)
            }
        };

        info!(
            bucket = %config.storage.bucket,
            output_dir = %config.chart_output_dir.display(),
            "Application state ready"
        );

        Ok(Self {
            catalog,
            reports,
            sink,
            webhook_crm,
            oauth_crm: crm_user.clone().map(|c| c as Arc<dyn WriteBack>),
            crm_user,
            oauth,
            tokens,
            output_dir: config.chart_output_dir.clone(),
            rpa_type_id: config.rpa_type_id,
        })
    }

    /// A pipeline writing back through `crm`.
    pub fn pipeline(&self, crm: Arc<dyn WriteBack>) -> Pipeline {
        Pipeline {
            catalog: Arc::clone(&self.catalog),
            reports: Arc::clone(&self.reports),
            sink: Arc::clone(&self.sink),
            crm,
            output_dir: self.output_dir.clone(),
            type_id: self.rpa_type_id,
        }
    }
}
