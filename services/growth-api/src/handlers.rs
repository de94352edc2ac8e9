//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Form, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crm_client::WriteBack;
use growth_common::GrowthError;
use reference_data::CatalogEntrySummary;

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// Body of every JSON response except health and catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            details,
        }
    }

    pub fn error(message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            details,
        }
    }

    fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

fn error_response(err: &GrowthError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    ApiResponse::error(err.to_string(), None).with_status(status)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub catalog_entries: usize,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub loaded: usize,
    pub entries: Vec<CatalogEntrySummary>,
}

// ============================================================================
// Request Parameters
// ============================================================================

/// `link` and `rpa_id`, from a form body or the query string.
#[derive(Debug, Default, Deserialize)]
pub struct ProcessParams {
    pub link: Option<String>,
    pub rpa_id: Option<String>,
}

impl ProcessParams {
    fn or(self, other: ProcessParams) -> ProcessParams {
        ProcessParams {
            link: self.link.or(other.link),
            rpa_id: self.rpa_id.or(other.rpa_id),
        }
    }

    fn required(&self) -> Option<(&str, &str)> {
        let link = self.link.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let rpa_id = self.rpa_id.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((link, rpa_id))
    }
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallback {
    pub code: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /process - Process a report and write back through the webhook
pub async fn process_handler(
    Extension(state): Extension<Arc<AppState>>,
    Form(params): Form<ProcessParams>,
) -> Response {
    let Some(crm) = state.webhook_crm.clone() else {
        return error_response(&GrowthError::Config(
            "CRM webhook URL is not configured".to_string(),
        ));
    };

    run_pipeline(&state, crm, &params).await
}

/// GET|POST /webhook - Process a report and write back with the OAuth session
pub async fn webhook_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<ProcessParams>,
    form: Option<Form<ProcessParams>>,
) -> Response {
    if !state.tokens.is_authenticated().await {
        return ApiResponse::error("User not authenticated with CRM", None)
            .with_status(StatusCode::UNAUTHORIZED);
    }

    let Some(crm) = state.oauth_crm.clone() else {
        return error_response(&GrowthError::Config("CRM OAuth is not configured".to_string()));
    };

    let params = query.or(form.map(|Form(f)| f).unwrap_or_default());
    run_pipeline(&state, crm, &params).await
}

async fn run_pipeline(state: &AppState, crm: Arc<dyn WriteBack>, params: &ProcessParams) -> Response {
    let Some((link, rpa_id)) = params.required() else {
        return ApiResponse::error("Missing required parameters: link and rpa_id", None)
            .with_status(StatusCode::BAD_REQUEST);
    };

    match state.pipeline(crm).run(link, rpa_id).await {
        Ok(outcome) => {
            info!(request_id = %outcome.request_id, rpa_id = %rpa_id, "Report processed");
            let details = serde_json::to_value(&outcome).ok();
            ApiResponse::success("Data sent successfully to CRM", details).with_status(StatusCode::OK)
        }
        Err(e) => {
            error!(stage = %e.stage, error = %e.source, "Report processing failed");
            let status = StatusCode::from_u16(e.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            ApiResponse::error(e.to_string(), Some(json!({ "stage": e.stage.as_str() })))
                .with_status(status)
        }
    }
}

/// GET /oauth?code= - OAuth callback; stores the issued tokens
pub async fn oauth_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(callback): Query<OAuthCallback>,
) -> Response {
    let Some(code) = callback.code.filter(|c| !c.is_empty()) else {
        return ApiResponse::error("Authorization code not provided", None)
            .with_status(StatusCode::BAD_REQUEST);
    };

    let Some(oauth) = state.oauth.clone() else {
        return error_response(&GrowthError::Config("CRM OAuth is not configured".to_string()));
    };

    match oauth.exchange_code(&code).await {
        Ok(tokens) => {
            state.tokens.set(tokens).await;
            ApiResponse::success("CRM authentication successful", None).with_status(StatusCode::OK)
        }
        Err(e) => {
            warn!(error = %e, "OAuth code exchange failed");
            ApiResponse::error("Failed to retrieve access token", Some(json!(e.to_string())))
                .with_status(StatusCode::BAD_REQUEST)
        }
    }
}

/// GET /crm/user - Check the stored token by fetching the current CRM user
pub async fn crm_user_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let Some(client) = state.crm_user.clone() else {
        return error_response(&GrowthError::Config("CRM OAuth is not configured".to_string()));
    };

    match client.current_user().await {
        Ok(user) => ApiResponse::success("CRM token is valid", Some(user)).with_status(StatusCode::OK),
        Err(e) => error_response(&e),
    }
}

/// GET /health - Basic health check
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        catalog_entries: state.catalog.len(),
    })
}

/// GET /api/catalog - Loaded reference tables
pub async fn catalog_handler(Extension(state): Extension<Arc<AppState>>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        loaded: state.catalog.len(),
        entries: state.catalog.summary(),
    })
}
