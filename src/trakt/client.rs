use anyhow::{Context, Result};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenManager;
use crate::error::ApiError;

/// Delay before the single retry after a 429 on POST/PUT/DELETE
const MUTATING_RATE_LIMIT_DELAY: Duration = Duration::from_secs(1);

/// Delay before the single retry after a 429 on GET,
/// modeling the 1000-requests-per-5-minutes budget
const GET_RATE_LIMIT_DELAY: Duration = Duration::from_millis(300);

/// HTTP client for the Trakt API with rate-limit handling
///
/// Every request is sent once with freshly generated auth headers. A 429
/// response triggers a method-dependent delay and exactly one retry; this is
/// a fixed single-retry policy, not exponential backoff. Any remaining
/// non-success status is an upstream error carrying the status and body.
pub struct TraktClient {
    /// Shared HTTP client with connection pooling
    http: Client,

    /// Token manager supplying auth headers
    token_manager: Arc<TokenManager>,

    /// Base URL of the Trakt API
    base_url: String,
}

impl TraktClient {
    pub fn new(
        token_manager: Arc<TokenManager>,
        base_url: impl Into<String>,
        connect_timeout: u64,
        request_timeout: u64,
    ) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout))
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            token_manager,
            base_url: base_url.into(),
        })
    }

    pub async fn get(&self, path: &str) -> Result<Response, ApiError> {
        self.request(Method::GET, path, None::<&()>).await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Response, ApiError> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Execute a request with the single rate-limit retry
    pub async fn request<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(method = %method, url = %url, "Sending Trakt request");

        let mut response = self.execute(&method, &url, body).await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let delay = rate_limit_delay(&method);
            tracing::warn!(
                "Rate limit exceeded on {} {}, retrying after {:?}",
                method,
                url,
                delay
            );
            tokio::time::sleep(delay).await;
            response = self.execute(&method, &url, body).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                url = %url,
                response_body = %body,
                "Trakt request failed"
            );
            return Err(ApiError::UpstreamHttp {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Send a single attempt; auth headers are regenerated per attempt so a
    /// retry never reuses a token that expired while waiting
    async fn execute<B: Serialize>(
        &self,
        method: &Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let headers = self.token_manager.auth_headers().await?;

        let mut request = self.http.request(method.clone(), url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }
}

fn rate_limit_delay(method: &Method) -> Duration {
    match *method {
        Method::POST | Method::PUT | Method::DELETE => MUTATING_RATE_LIMIT_DELAY,
        _ => GET_RATE_LIMIT_DELAY,
    }
}
