//! OAuth tokens: exchange, refresh and storage.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use growth_common::{GrowthError, GrowthResult};

/// Access and refresh token issued by the CRM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// The one token pair the service acts with.
///
/// Lives in application state and is passed explicitly to every call that
/// needs it. Empty until the OAuth callback has run.
#[derive(Debug, Default)]
pub struct TokenStore {
    current: RwLock<Option<TokenPair>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<TokenPair> {
        self.current.read().await.clone()
    }

    pub async fn set(&self, pair: TokenPair) {
        *self.current.write().await = Some(pair);
    }

    pub async fn clear(&self) {
        *self.current.write().await = None;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }
}

/// OAuth application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Token endpoint, e.g. `https://example.bitrix24.com/oauth/token/`
    pub token_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl TokenResponse {
    fn failure(&self) -> String {
        match (&self.error, &self.error_description) {
            (Some(e), Some(d)) => format!("{}: {}", e, d),
            (Some(e), None) => e.clone(),
            _ => "response has no access_token".to_string(),
        }
    }
}

/// Talks to the CRM token endpoint.
pub struct OAuthClient {
    http: Client,
    config: OAuthConfig,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig, timeout: Duration) -> GrowthResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GrowthError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Trade an authorization code from the OAuth callback for tokens.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str) -> GrowthResult<TokenPair> {
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
        ];

        let response = self.request_token(&form).await?;
        let reason = response.failure();
        match (response.access_token, response.refresh_token) {
            (Some(access_token), Some(refresh_token)) => {
                info!("Received CRM access token");
                Ok(TokenPair {
                    access_token,
                    refresh_token,
                })
            }
            (Some(_), None) => Err(GrowthError::ExternalCall(
                "token exchange returned no refresh_token".to_string(),
            )),
            (None, _) => {
                error!(reason = %reason, "CRM token exchange failed");
                Err(GrowthError::ExternalCall(format!("token exchange failed: {}", reason)))
            }
        }
    }

    /// Obtain a new pair from `current`'s refresh token.
    ///
    /// A response without a new refresh token keeps the current one.
    #[instrument(skip_all)]
    pub async fn refresh(&self, current: &TokenPair) -> GrowthResult<TokenPair> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", current.refresh_token.as_str()),
        ];

        let response = self.request_token(&form).await?;
        let Some(access_token) = response.access_token.clone() else {
            let reason = response.failure();
            error!(reason = %reason, "CRM token refresh failed");
            return Err(GrowthError::ExternalCall(format!("token refresh failed: {}", reason)));
        };

        info!("Refreshed CRM access token");
        Ok(TokenPair {
            access_token,
            refresh_token: response
                .refresh_token
                .unwrap_or_else(|| current.refresh_token.clone()),
        })
    }

    /// Refresh the pair held in `store` and store the result.
    ///
    /// An empty store is [`GrowthError::Unauthenticated`]; a failed refresh
    /// leaves the store unchanged.
    pub async fn refresh_stored(&self, store: &TokenStore) -> GrowthResult<TokenPair> {
        let Some(current) = store.get().await else {
            warn!("No CRM refresh token stored");
            return Err(GrowthError::Unauthenticated(
                "no CRM session; complete the OAuth flow first".to_string(),
            ));
        };

        let next = self.refresh(&current).await?;
        store.set(next.clone()).await;
        Ok(next)
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> GrowthResult<TokenResponse> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| GrowthError::ExternalCall(format!("token endpoint: {}", e)))?;

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| GrowthError::ExternalCall(format!("token endpoint returned non-JSON: {}", e)))
    }
}
