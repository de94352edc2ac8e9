//! Service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crm_client::OAuthConfig;
use storage::ObjectStorageConfig;

/// Everything the service reads from its environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding the WHO reference CSV files
    pub reference_dir: PathBuf,
    /// Root of the per-request chart directories
    pub chart_output_dir: PathBuf,
    /// Optional TTF/OTF font for chart text
    pub chart_font_path: Option<PathBuf>,
    pub storage: ObjectStorageConfig,
    /// OAuth application; `None` disables `/oauth` and `/webhook`
    pub oauth: Option<OAuthConfig>,
    /// REST base for bearer calls, e.g. `https://example.bitrix24.com/rest/`
    pub crm_api_url: String,
    /// Incoming-webhook item update URL; `None` disables `/process`
    pub crm_webhook_url: Option<String>,
    /// RPA process type id sent with every update
    pub rpa_type_id: u32,
    /// Timeout of every outbound HTTP call
    pub http_timeout: Duration,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let bucket =
            env::var("S3_BUCKET").unwrap_or_else(|_| "child-growth-charts".to_string());

        let storage = ObjectStorageConfig {
            endpoint: env::var("S3_ENDPOINT")
                .unwrap_or_else(|_| "https://storage.googleapis.com".to_string()),
            bucket,
            access_key_id: env::var("S3_ACCESS_KEY").unwrap_or_default(),
            secret_access_key: env::var("S3_SECRET_KEY").unwrap_or_default(),
            region: env::var("S3_REGION").unwrap_or_else(|_| "auto".to_string()),
            allow_http: env::var("S3_ALLOW_HTTP")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            public_base_url: non_empty("PUBLIC_BASE_URL"),
        };

        let oauth = match (non_empty("BITRIX_CLIENT_ID"), non_empty("BITRIX_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(OAuthConfig {
                client_id,
                client_secret,
                redirect_uri: env::var("BITRIX_REDIRECT_URI")
                    .unwrap_or_else(|_| "http://localhost:5002/oauth".to_string()),
                token_url: env::var("BITRIX_TOKEN_URL")
                    .unwrap_or_else(|_| "https://oauth.bitrix.info/oauth/token/".to_string()),
            }),
            _ => None,
        };

        Self {
            reference_dir: env::var("REFERENCE_DIR")
                .unwrap_or_else(|_| "csv_files".to_string())
                .into(),
            chart_output_dir: env::var("CHART_OUTPUT_DIR")
                .unwrap_or_else(|_| "static/charts".to_string())
                .into(),
            chart_font_path: non_empty("CHART_FONT_PATH").map(PathBuf::from),
            storage,
            oauth,
            crm_api_url: env::var("BITRIX_API_URL")
                .unwrap_or_else(|_| "https://localhost/rest/".to_string()),
            crm_webhook_url: non_empty("BITRIX_WEBHOOK_URL"),
            rpa_type_id: env::var("RPA_TYPE_ID")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            http_timeout: Duration::from_secs(
                env::var("HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment is process-wide; keep every env assertion in one test.
    #[test]
    fn test_from_env_defaults_and_overrides() {
        for key in [
            "REFERENCE_DIR",
            "CHART_OUTPUT_DIR",
            "CHART_FONT_PATH",
            "S3_BUCKET",
            "PUBLIC_BASE_URL",
            "BITRIX_CLIENT_ID",
            "BITRIX_CLIENT_SECRET",
            "BITRIX_WEBHOOK_URL",
            "RPA_TYPE_ID",
            "HTTP_TIMEOUT_SECS",
        ] {
            env::remove_var(key);
        }

        let config = ServiceConfig::from_env();
        assert_eq!(config.reference_dir, PathBuf::from("csv_files"));
        assert_eq!(config.chart_output_dir, PathBuf::from("static/charts"));
        assert!(config.chart_font_path.is_none());
        assert_eq!(config.storage.bucket, "child-growth-charts");
        assert_eq!(
            config.storage.public_base_url(),
            "https://storage.googleapis.com/child-growth-charts"
        );
        assert!(config.oauth.is_none());
        assert!(config.crm_webhook_url.is_none());
        assert_eq!(config.rpa_type_id, 1);
        assert_eq!(config.http_timeout, Duration::from_secs(30));

        env::set_var("S3_BUCKET", "charts-test");
        env::set_var("BITRIX_CLIENT_ID", "app.1");
        env::set_var("BITRIX_CLIENT_SECRET", "secret");
        env::set_var("RPA_TYPE_ID", "7");
        env::set_var("HTTP_TIMEOUT_SECS", "not-a-number");

        let config = ServiceConfig::from_env();
        assert_eq!(
            config.storage.public_base_url(),
            "https://storage.googleapis.com/charts-test"
        );
        assert_eq!(config.oauth.unwrap().client_id, "app.1");
        assert_eq!(config.rpa_type_id, 7);
        assert_eq!(config.http_timeout, Duration::from_secs(30));

        for key in ["S3_BUCKET", "BITRIX_CLIENT_ID", "BITRIX_CLIENT_SECRET", "RPA_TYPE_ID", "HTTP_TIMEOUT_SECS"] {
            env::remove_var(key);
        }
    }
}
