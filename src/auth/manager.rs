use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::error::ApiError;
use crate::secrets::SecretStore;

use super::refresh;
use super::types::TraktCredentials;

/// Token manager
/// Derives fresh Trakt auth headers from the stored credential blob,
/// refreshing and persisting a new secret version when the token is
/// inside the expiry buffer.
pub struct TokenManager {
    /// Secret store holding the credential blob
    store: Arc<dyn SecretStore>,

    /// Logical name of the credential secret
    secret_name: String,

    /// Base URL of the Trakt API (for the OAuth token endpoint)
    base_url: String,

    /// Seconds before expiry at which a refresh is triggered
    refresh_buffer: i64,

    /// HTTP client for refresh requests
    client: Client,

    /// Serializes in-process refreshes; concurrent requests must not
    /// each fire their own refresh
    refresh_lock: Mutex<()>,
}

impl TokenManager {
    pub fn new(
        store: Arc<dyn SecretStore>,
        secret_name: impl Into<String>,
        base_url: impl Into<String>,
        refresh_buffer: i64,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            store,
            secret_name: secret_name.into(),
            base_url: base_url.into(),
            refresh_buffer,
            client,
            refresh_lock: Mutex::new(()),
        })
    }

    /// Load the current credential blob from the secret store.
    async fn load_credentials(&self) -> Result<TraktCredentials, ApiError> {
        let payload = self.store.access_latest(&self.secret_name).await?;
        let creds: TraktCredentials = serde_json::from_str(&payload)
            .map_err(|e| anyhow::anyhow!("Failed to parse credential blob: {}", e))?;
        Ok(creds)
    }

    /// Refresh the access token and persist the new blob as a new secret
    /// version. Only one refresh runs at a time; once the lock is held the
    /// blob is re-read in case another task already refreshed it.
    async fn refresh_credentials(&self) -> Result<TraktCredentials, ApiError> {
        let _guard = self.refresh_lock.lock().await;

        let creds = self.load_credentials().await?;
        if !creds.is_expiring(self.refresh_buffer) {
            return Ok(creds);
        }

        let refreshed = refresh::refresh_credentials(&self.client, &self.base_url, &creds).await?;

        let payload = serde_json::to_string(&refreshed)
            .map_err(|e| anyhow::anyhow!("Failed to serialize credential blob: {}", e))?;
        let version = self.store.add_version(&self.secret_name, &payload).await?;
        tracing::debug!(
            "Persisted refreshed credentials as secret version {}",
            version
        );

        Ok(refreshed)
    }

    /// Get headers for Trakt API requests, ensuring a fresh token.
    pub async fn auth_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut creds = self.load_credentials().await?;

        if creds.is_expiring(self.refresh_buffer) {
            creds = self.refresh_credentials().await?;
        }

        build_headers(&creds)
    }
}

fn build_headers(creds: &TraktCredentials) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert("trakt-api-version", HeaderValue::from_static("2"));
    headers.insert(
        "trakt-api-key",
        HeaderValue::from_str(&creds.client_id)
            .map_err(|e| anyhow::anyhow!("client_id is not a valid header value: {}", e))?,
    );
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", creds.oauth_token))
            .map_err(|e| anyhow::anyhow!("access token is not a valid header value: {}", e))?,
    );
    Ok(headers)
}
