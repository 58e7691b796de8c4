// Error handling module
// Defines error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API errors that can occur during request processing
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed (missing fields, wrong method)
    #[error("{0}")]
    Validation(String),

    /// OAuth token refresh against Trakt failed
    #[error("Failed to refresh token. Error: {0}")]
    AuthRefresh(String),

    /// Non-success response from the Trakt API after the single rate-limit retry
    #[error("Trakt API error: {status} - {body}")]
    UpstreamHttp { status: u16, body: String },

    /// A workflow invariant did not hold (e.g. a cleared list still has items)
    #[error("{0}")]
    Invariant(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Internal(anyhow::Error::new(err).context("HTTP transport error"))
    }
}

impl From<crate::secrets::StoreError> for ApiError {
    fn from(err: crate::secrets::StoreError) -> Self {
        ApiError::Internal(anyhow::Error::new(err).context("Secret store error"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthRefresh(_)
            | ApiError::UpstreamHttp { .. }
            | ApiError::Invariant(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(ref err) => {
                tracing::error!("Internal error: {:?}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
