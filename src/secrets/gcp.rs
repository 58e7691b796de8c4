//! Google Secret Manager storage implementation.
//!
//! Talks to the Secret Manager REST API directly and authenticates with an
//! access token from the GCE/Cloud Run metadata server, so no service-account
//! key file is needed when running on Google infrastructure.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{SecretStore, StoreError};

const SECRET_MANAGER_BASE_URL: &str = "https://secretmanager.googleapis.com/v1";
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
}

#[derive(Deserialize)]
struct SecretPayload {
    data: String,
}

#[derive(Deserialize)]
struct AccessVersionResponse {
    payload: SecretPayload,
}

#[derive(Deserialize)]
struct VersionResponse {
    // Fully qualified resource name, e.g. "projects/p/secrets/s/versions/7"
    name: String,
}

/// Secret store backed by Google Secret Manager.
pub struct GoogleSecretStore {
    http: Client,
    project: String,
    api_base_url: String,
    metadata_token_url: String,
}

impl GoogleSecretStore {
    pub fn new(project: impl Into<String>) -> Self {
        Self::with_endpoints(project, SECRET_MANAGER_BASE_URL, METADATA_TOKEN_URL)
    }

    fn with_endpoints(
        project: impl Into<String>,
        api_base_url: impl Into<String>,
        metadata_token_url: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            project: project.into(),
            api_base_url: api_base_url.into(),
            metadata_token_url: metadata_token_url.into(),
        }
    }

    async fn metadata_token(&self) -> Result<String, StoreError> {
        let response = self
            .http
            .get(&self.metadata_token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| StoreError::Backend {
                message: format!("metadata server unreachable: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(StoreError::Backend {
                message: format!("metadata token request failed: {}", response.status()),
            });
        }

        let token: MetadataToken = response.json().await.map_err(|e| StoreError::Backend {
            message: format!("failed to parse metadata token: {}", e),
        })?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl SecretStore for GoogleSecretStore {
    async fn access_latest(&self, name: &str) -> Result<String, StoreError> {
        let token = self.metadata_token().await?;
        let url = format!(
            "{}/projects/{}/secrets/{}/versions/latest:access",
            self.api_base_url, self.project, name
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| StoreError::Backend {
                message: format!("secret access request failed: {}", e),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                name: name.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend {
                message: format!("secret access failed: {} - {}", status, body),
            });
        }

        let parsed: AccessVersionResponse =
            response.json().await.map_err(|e| StoreError::Backend {
                message: format!("failed to parse secret payload: {}", e),
            })?;

        let bytes = BASE64
            .decode(parsed.payload.data)
            .map_err(|e| StoreError::Backend {
                message: format!("secret payload is not valid base64: {}", e),
            })?;
        String::from_utf8(bytes).map_err(|e| StoreError::Backend {
            message: format!("secret payload is not valid UTF-8: {}", e),
        })
    }

    async fn add_version(&self, name: &str, payload: &str) -> Result<u64, StoreError> {
        let token = self.metadata_token().await?;
        let url = format!(
            "{}/projects/{}/secrets/{}:addVersion",
            self.api_base_url, self.project, name
        );

        let body = json!({
            "payload": { "data": BASE64.encode(payload) }
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Backend {
                message: format!("add version request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend {
                message: format!("add version failed: {} - {}", status, body),
            });
        }

        let parsed: VersionResponse = response.json().await.map_err(|e| StoreError::Backend {
            message: format!("failed to parse version response: {}", e),
        })?;

        parsed
            .name
            .rsplit('/')
            .next()
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| StoreError::Backend {
                message: format!("unexpected version name: {}", parsed.name),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_metadata(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/token"))
            .and(header("Metadata-Flavor", "Google"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "metadata-token",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_access_latest_decodes_payload() {
        let server = MockServer::start().await;
        mock_metadata(&server).await;

        Mock::given(method("GET"))
            .and(path(
                "/projects/media-sync/secrets/TRAKT_SECRET/versions/latest:access",
            ))
            .and(header("authorization", "Bearer metadata-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "projects/media-sync/secrets/TRAKT_SECRET/versions/3",
                "payload": { "data": BASE64.encode("{\"client_id\":\"abc\"}") }
            })))
            .mount(&server)
            .await;

        let store = GoogleSecretStore::with_endpoints(
            "media-sync",
            server.uri(),
            format!("{}/token", server.uri()),
        );

        let payload = store.access_latest("TRAKT_SECRET").await.unwrap();
        assert_eq!(payload, "{\"client_id\":\"abc\"}");
    }

    #[tokio::test]
    async fn test_access_latest_missing_secret() {
        let server = MockServer::start().await;
        mock_metadata(&server).await;

        Mock::given(method("GET"))
            .and(path(
                "/projects/media-sync/secrets/MISSING/versions/latest:access",
            ))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = GoogleSecretStore::with_endpoints(
            "media-sync",
            server.uri(),
            format!("{}/token", server.uri()),
        );

        let result = store.access_latest("MISSING").await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_add_version_returns_new_number() {
        let server = MockServer::start().await;
        mock_metadata(&server).await;

        Mock::given(method("POST"))
            .and(path("/projects/media-sync/secrets/TRAKT_SECRET:addVersion"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "projects/media-sync/secrets/TRAKT_SECRET/versions/4"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = GoogleSecretStore::with_endpoints(
            "media-sync",
            server.uri(),
            format!("{}/token", server.uri()),
        );

        let version = store.add_version("TRAKT_SECRET", "{}").await.unwrap();
        assert_eq!(version, 4);
    }
}
