//! RPA item write-back.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use growth_common::{GrowthError, GrowthResult};

use crate::fields::WriteBackPayload;
use crate::token::{OAuthClient, TokenStore};

const ITEM_UPDATE: &str = "rpa.item.update.json";
const CURRENT_USER: &str = "user.current.json";

/// Persists a processed report into the CRM.
#[async_trait]
pub trait WriteBack: Send + Sync {
    async fn update_item(&self, payload: &WriteBackPayload) -> GrowthResult<()>;
}

enum Auth {
    /// Incoming-webhook URL with the secret embedded; form-encoded calls.
    Webhook { url: String },
    /// REST base URL with bearer tokens; JSON calls.
    OAuth {
        api_base: String,
        oauth: Arc<OAuthClient>,
        tokens: Arc<TokenStore>,
    },
}

/// CRM REST client in one of two authentication modes.
pub struct CrmClient {
    http: Client,
    auth: Auth,
}

impl CrmClient {
    /// Client posting to a full incoming-webhook method URL
    /// (`https://host/rest/{user}/{secret}/rpa.item.update.json`).
    pub fn webhook(url: impl Into<String>, timeout: Duration) -> GrowthResult<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            auth: Auth::Webhook { url: url.into() },
        })
    }

    /// Client calling `{api_base}{method}` with the stored bearer token.
    pub fn oauth(
        api_base: impl Into<String>,
        oauth: Arc<OAuthClient>,
        tokens: Arc<TokenStore>,
        timeout: Duration,
    ) -> GrowthResult<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            auth: Auth::OAuth {
                api_base: api_base.into(),
                oauth,
                tokens,
            },
        })
    }

    /// Fetch the authenticated user, to check the stored token works.
    ///
    /// Only available in OAuth mode.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> GrowthResult<Value> {
        let Auth::OAuth { api_base, .. } = &self.auth else {
            return Err(GrowthError::Config(
                "current user lookup needs OAuth credentials".to_string(),
            ));
        };

        let url = method_url(api_base, CURRENT_USER);
        let response = self.send_bearer(|token| self.http.get(&url).bearer_auth(token)).await?;
        let response = ensure_success(response).await?;

        response
            .json::<Value>()
            .await
            .map_err(|e| GrowthError::ExternalCall(format!("{} returned non-JSON: {}", CURRENT_USER, e)))
    }

    /// Send a bearer-authenticated request, refreshing the token once on 401.
    async fn send_bearer<F>(&self, build: F) -> GrowthResult<Response>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let Auth::OAuth { oauth, tokens, .. } = &self.auth else {
            return Err(GrowthError::Config("bearer call without OAuth credentials".to_string()));
        };

        let access_token = match tokens.get().await {
            Some(pair) => pair.access_token,
            None => {
                warn!("No CRM access token; attempting refresh");
                oauth.refresh_stored(tokens).await?.access_token
            }
        };

        let response = send(build(&access_token)).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        warn!("CRM access token rejected; refreshing");
        let refreshed = oauth.refresh_stored(tokens).await.map_err(|e| match e {
            GrowthError::Unauthenticated(_) => e,
            other => GrowthError::Unauthenticated(format!("token refresh failed: {}", other)),
        })?;
        send(build(&refreshed.access_token)).await
    }
}

#[async_trait]
impl WriteBack for CrmClient {
    #[instrument(skip(self, payload), fields(item_id = %payload.item_id, type_id = payload.type_id))]
    async fn update_item(&self, payload: &WriteBackPayload) -> GrowthResult<()> {
        let response = match &self.auth {
            Auth::Webhook { url } => {
                debug!(fields = payload.fields.len(), "Posting item update via webhook");
                send(self.http.post(url).form(&payload.to_form())).await?
            }
            Auth::OAuth { api_base, .. } => {
                let url = method_url(api_base, ITEM_UPDATE);
                let body = payload.to_json();
                debug!(fields = payload.fields.len(), "Posting item update via OAuth");
                self.send_bearer(|token| self.http.post(&url).bearer_auth(token).json(&body))
                    .await?
            }
        };

        ensure_success(response).await?;
        info!("Updated CRM item");
        Ok(())
    }
}

fn http_client(timeout: Duration) -> GrowthResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GrowthError::Config(format!("HTTP client: {}", e)))
}

fn method_url(api_base: &str, method: &str) -> String {
    format!("{}/{}", api_base.trim_end_matches('/'), method)
}

async fn send(request: RequestBuilder) -> GrowthResult<Response> {
    request
        .send()
        .await
        .map_err(|e| GrowthError::ExternalCall(format!("CRM request failed: {}", e)))
}

async fn ensure_success(response: Response) -> GrowthResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!(status = %status, body = %body, "CRM call failed");
    Err(GrowthError::ExternalCall(format!("CRM returned HTTP {}: {}", status, body)))
}
