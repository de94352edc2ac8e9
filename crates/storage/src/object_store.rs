//! Object storage client for chart images (S3 compatible).

use std::path::Path as LocalPath;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::{aws::AmazonS3Builder, path::Path, ObjectStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use growth_common::{GrowthError, GrowthResult};

use crate::sink::ChartSink;

/// Configuration for object storage connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStorageConfig {
    /// S3-compatible endpoint URL
    pub endpoint: String,
    /// Bucket name
    pub bucket: String,
    /// Access key ID (HMAC key for GCS interop)
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Region ("auto" for GCS)
    pub region: String,
    /// Allow HTTP (for local MinIO)
    pub allow_http: bool,
    /// Base of the public object URLs; defaults to the GCS public URL of the bucket
    pub public_base_url: Option<String>,
}

impl Default for ObjectStorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://storage.googleapis.com".to_string(),
            bucket: "child-growth-charts".to_string(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            region: "auto".to_string(),
            allow_http: false,
            public_base_url: None,
        }
    }
}

impl ObjectStorageConfig {
    /// Public URL prefix of uploaded objects, without a trailing slash.
    pub fn public_base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://storage.googleapis.com/{}", self.bucket),
        }
    }
}

/// Object storage client for chart images.
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    public_base_url: String,
}

impl ObjectStorage {
    /// Create a new object storage client from config.
    pub fn new(config: &ObjectStorageConfig) -> GrowthResult<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_endpoint(&config.endpoint)
            .with_bucket_name(&config.bucket)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(&config.secret_access_key)
            .with_region(&config.region);

        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder
            .build()
            .map_err(|e| GrowthError::Config(format!("Failed to create S3 client: {}", e)))?;

        Ok(Self {
            store: Arc::new(store),
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url(),
        })
    }

    /// Wrap an existing store, e.g. an in-memory one.
    pub fn from_store(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Public URL of an object name.
    pub fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }

    /// Write bytes to a path in the bucket.
    #[instrument(skip(self, data), fields(bucket = %self.bucket, path = %path))]
    pub async fn put(&self, path: &str, data: Bytes) -> GrowthResult<()> {
        let location = Path::from(path);
        debug!(size = data.len(), "Writing object");

        self.store
            .put(&location, data.into())
            .await
            .map_err(|e| GrowthError::Upload(format!("Failed to write {}: {}", path, e)))?;

        Ok(())
    }
}

#[async_trait]
impl ChartSink for ObjectStorage {
    #[instrument(skip(self), fields(bucket = %self.bucket, local = %local.display()))]
    async fn upload(&self, local: &LocalPath, dest: &str) -> GrowthResult<String> {
        let data = tokio::fs::read(local).await.map_err(|e| {
            GrowthError::Upload(format!("Cannot read {}: {}", local.display(), e))
        })?;

        self.put(dest, Bytes::from(data)).await?;

        let url = self.public_url(dest);
        info!(url = %url, "Uploaded chart");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_public_base_url() {
        let config = ObjectStorageConfig::default();
        assert_eq!(
            config.public_base_url(),
            "https://storage.googleapis.com/child-growth-charts"
        );
    }

    #[test]
    fn test_configured_public_base_url_trimmed() {
        let config = ObjectStorageConfig {
            public_base_url: Some("https://cdn.example.com/charts/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.public_base_url(), "https://cdn.example.com/charts");
    }

    #[test]
    fn test_s3_client_builds_from_config() {
        let config = ObjectStorageConfig {
            endpoint: "http://localhost:9000".to_string(),
            access_key_id: "minioadmin".to_string(),
            secret_access_key: "minioadmin".to_string(),
            region: "us-east-1".to_string(),
            allow_http: true,
            ..Default::default()
        };
        let storage = ObjectStorage::new(&config).unwrap();
        assert_eq!(
            storage.public_url("Alex_Kim_bmi_chart_per.png"),
            "https://storage.googleapis.com/child-growth-charts/Alex_Kim_bmi_chart_per.png"
        );
    }
}
