//! Router assembly.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::page;
use crate::state::AppState;

/// All service routes with tracing and permissive CORS.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(page::index_handler).post(page::index_handler))
        // Report processing
        .route("/process", post(handlers::process_handler))
        .route(
            "/webhook",
            get(handlers::webhook_handler).post(handlers::webhook_handler),
        )
        // CRM session
        .route("/oauth", get(handlers::oauth_handler))
        .route("/crm/user", get(handlers::crm_user_handler))
        // Status
        .route("/health", get(handlers::health_handler))
        .route("/api/catalog", get(handlers::catalog_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
