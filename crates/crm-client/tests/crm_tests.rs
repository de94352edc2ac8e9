//! Tests for OAuth token handling and item write-back against a fake CRM.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Value};

use crm_client::fields::{AGE, BMI_CHART_PER, BMI_CHART_Z, GENDER};
use crm_client::{
    CrmClient, OAuthClient, OAuthConfig, TokenPair, TokenStore, WriteBack, WriteBackPayload,
};
use growth_common::{ChartKey, ChildRecord, GrowthError};
use test_utils::spawn_test_server;

const TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Fake CRM
// ============================================================================

#[derive(Default)]
struct FakeCrm {
    /// Access token the REST endpoints accept.
    valid_token: Mutex<String>,
    token_requests: Mutex<Vec<HashMap<String, String>>>,
    json_updates: Mutex<Vec<Value>>,
    form_updates: Mutex<Vec<HashMap<String, String>>>,
    /// Reject every refresh grant.
    refresh_fails: bool,
}

type Shared = Arc<FakeCrm>;

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn token_endpoint(
    State(crm): State<Shared>,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    crm.token_requests.lock().unwrap().push(form.clone());

    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") if form.get("code").map(String::as_str) == Some("good-code") => {
            *crm.valid_token.lock().unwrap() = "access-1".to_string();
            Json(json!({"access_token": "access-1", "refresh_token": "refresh-1", "expires_in": 3600}))
        }
        Some("refresh_token") if !crm.refresh_fails => {
            *crm.valid_token.lock().unwrap() = "access-2".to_string();
            Json(json!({"access_token": "access-2", "refresh_token": "refresh-2"}))
        }
        _ => Json(json!({"error": "invalid_grant", "error_description": "rejected"})),
    }
}

async fn item_update(
    State(crm): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if bearer(&headers) != Some(crm.valid_token.lock().unwrap().clone()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "expired_token"})));
    }
    crm.json_updates.lock().unwrap().push(body);
    (StatusCode::OK, Json(json!({"result": {"item": {"id": 42}}})))
}

async fn current_user(State(crm): State<Shared>, headers: HeaderMap) -> impl IntoResponse {
    if bearer(&headers) != Some(crm.valid_token.lock().unwrap().clone()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "expired_token"})));
    }
    (StatusCode::OK, Json(json!({"result": {"ID": "1", "NAME": "Clinic"}})))
}

async fn webhook_update(
    State(crm): State<Shared>,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    crm.form_updates.lock().unwrap().push(form);
    Json(json!({"result": true}))
}

async fn start(crm: Shared) -> String {
    let router = Router::new()
        .route("/oauth/token/", post(token_endpoint))
        .route("/rest/rpa.item.update.json", post(item_update))
        .route("/rest/user.current.json", get(current_user))
        .route("/rest/1/secret/rpa.item.update.json", post(webhook_update))
        .route(
            "/rest/broken/rpa.item.update.json",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .with_state(crm);
    spawn_test_server(router).await
}

fn oauth_client(base: &str) -> Arc<OAuthClient> {
    let config = OAuthConfig {
        client_id: "app.1".to_string(),
        client_secret: "s3cret".to_string(),
        redirect_uri: "https://growth.test/oauth".to_string(),
        token_url: format!("{}/oauth/token/", base),
    };
    Arc::new(OAuthClient::new(config, TIMEOUT).unwrap())
}

fn payload() -> WriteBackPayload {
    let record = ChildRecord {
        name: "Alex Kim".to_string(),
        age_years: 8,
        gender: "Male".to_string(),
        height_cm: 130.0,
        weight_kg: 28.0,
        bmi: 16.5,
        ..Default::default()
    };
    let mut urls = BTreeMap::new();
    urls.insert(
        ChartKey::all()[0],
        Some("https://storage.test/Alex_Kim_bmi_chart_per.png".to_string()),
    );
    urls.insert(ChartKey::all()[1], None);
    WriteBackPayload::build(1, "42", &record, "https://report.test/alex", &urls)
}

fn pair(access: &str) -> TokenPair {
    TokenPair {
        access_token: access.to_string(),
        refresh_token: "refresh-1".to_string(),
    }
}

// ============================================================================
// OAuth tokens
// ============================================================================

#[tokio::test]
async fn test_exchange_code() {
    let crm = Shared::default();
    let base = start(crm.clone()).await;

    let tokens = oauth_client(&base).exchange_code("good-code").await.unwrap();

    assert_eq!(tokens, TokenPair {
        access_token: "access-1".to_string(),
        refresh_token: "refresh-1".to_string(),
    });
    let requests = crm.token_requests.lock().unwrap();
    assert_eq!(requests[0]["grant_type"], "authorization_code");
    assert_eq!(requests[0]["client_id"], "app.1");
    assert_eq!(requests[0]["redirect_uri"], "https://growth.test/oauth");
}

#[tokio::test]
async fn test_exchange_bad_code_is_external_error() {
    let base = start(Shared::default()).await;

    let err = oauth_client(&base).exchange_code("bad-code").await.unwrap_err();

    assert!(matches!(err, GrowthError::ExternalCall(_)));
    assert!(err.to_string().contains("invalid_grant"));
}

#[tokio::test]
async fn test_refresh_returns_new_pair() {
    let crm = Shared::default();
    let base = start(crm.clone()).await;

    let next = oauth_client(&base).refresh(&pair("access-1")).await.unwrap();

    assert_eq!(next.access_token, "access-2");
    assert_eq!(next.refresh_token, "refresh-2");
    assert_eq!(crm.token_requests.lock().unwrap()[0]["refresh_token"], "refresh-1");
}

#[tokio::test]
async fn test_refresh_stored_without_session() {
    let base = start(Shared::default()).await;
    let store = TokenStore::new();

    let err = oauth_client(&base).refresh_stored(&store).await.unwrap_err();

    assert!(matches!(err, GrowthError::Unauthenticated(_)));
}

// ============================================================================
// OAuth write-back
// ============================================================================

#[tokio::test]
async fn test_oauth_update_sends_json() {
    let crm = Shared::default();
    *crm.valid_token.lock().unwrap() = "access-1".to_string();
    let base = start(crm.clone()).await;
    let store = Arc::new(TokenStore::new());
    store.set(pair("access-1")).await;

    let client =
        CrmClient::oauth(format!("{}/rest/", base), oauth_client(&base), store, TIMEOUT).unwrap();
    client.update_item(&payload()).await.unwrap();

    let updates = crm.json_updates.lock().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0]["id"], json!("42"));
    assert_eq!(updates[0]["typeId"], json!(1));
    assert_eq!(updates[0]["fields"][AGE], json!(8));
    assert_eq!(
        updates[0]["fields"][BMI_CHART_PER],
        json!("https://storage.test/Alex_Kim_bmi_chart_per.png")
    );
    assert_eq!(updates[0]["fields"][BMI_CHART_Z], Value::Null);
    assert!(crm.token_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_oauth_update_refreshes_once_on_401() {
    let crm = Shared::default();
    *crm.valid_token.lock().unwrap() = "access-2".to_string();
    let base = start(crm.clone()).await;
    let store = Arc::new(TokenStore::new());
    store.set(pair("stale")).await;

    let client = CrmClient::oauth(
        format!("{}/rest/", base),
        oauth_client(&base),
        store.clone(),
        TIMEOUT,
    )
    .unwrap();
    client.update_item(&payload()).await.unwrap();

    assert_eq!(crm.json_updates.lock().unwrap().len(), 1);
    assert_eq!(crm.token_requests.lock().unwrap().len(), 1);
    assert_eq!(store.get().await.unwrap().access_token, "access-2");
}

#[tokio::test]
async fn test_oauth_update_failed_refresh_is_unauthenticated() {
    let crm = Arc::new(FakeCrm {
        refresh_fails: true,
        ..Default::default()
    });
    *crm.valid_token.lock().unwrap() = "access-9".to_string();
    let base = start(crm.clone()).await;
    let store = Arc::new(TokenStore::new());
    store.set(pair("stale")).await;

    let client = CrmClient::oauth(
        format!("{}/rest/", base),
        oauth_client(&base),
        store.clone(),
        TIMEOUT,
    )
    .unwrap();
    let err = client.update_item(&payload()).await.unwrap_err();

    assert!(matches!(err, GrowthError::Unauthenticated(_)));
    assert!(crm.json_updates.lock().unwrap().is_empty());
    // A failed refresh leaves the stored pair alone
    assert_eq!(store.get().await.unwrap().access_token, "stale");
}

#[tokio::test]
async fn test_current_user_probe() {
    let crm = Shared::default();
    *crm.valid_token.lock().unwrap() = "access-1".to_string();
    let base = start(crm).await;
    let store = Arc::new(TokenStore::new());
    store.set(pair("access-1")).await;

    let client =
        CrmClient::oauth(format!("{}/rest", base), oauth_client(&base), store, TIMEOUT).unwrap();
    let user = client.current_user().await.unwrap();

    assert_eq!(user["result"]["NAME"], json!("Clinic"));
}

// ============================================================================
// Webhook write-back
// ============================================================================

#[tokio::test]
async fn test_webhook_update_sends_form() {
    let crm = Shared::default();
    let base = start(crm.clone()).await;

    let client =
        CrmClient::webhook(format!("{}/rest/1/secret/rpa.item.update.json", base), TIMEOUT).unwrap();
    client.update_item(&payload()).await.unwrap();

    let updates = crm.form_updates.lock().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0]["typeId"], "1");
    assert_eq!(updates[0]["id"], "42");
    assert_eq!(updates[0][&format!("fields[{}]", GENDER)], "Male");
    assert!(!updates[0].contains_key(&format!("fields[{}]", BMI_CHART_Z)));
}

#[tokio::test]
async fn test_webhook_error_status_is_external_error() {
    let base = start(Shared::default()).await;

    let client =
        CrmClient::webhook(format!("{}/rest/broken/rpa.item.update.json", base), TIMEOUT).unwrap();
    let err = client.update_item(&payload()).await.unwrap_err();

    assert!(matches!(err, GrowthError::ExternalCall(_)));
    assert!(err.to_string().contains("500"));
}
