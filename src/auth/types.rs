// Authentication types

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Credential blob persisted in the secret store.
///
/// Written as a whole on every refresh; `oauth_expires_at` always reflects
/// the real expiry of `oauth_token` as of the most recent successful refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub oauth_token: String,
    pub oauth_refresh_token: String,
    /// Epoch seconds at which `oauth_token` expires
    pub oauth_expires_at: i64,
}

impl TraktCredentials {
    /// Whether the access token is expired or about to expire.
    ///
    /// The buffer keeps a token that is valid at request-construction time
    /// from expiring mid-flight.
    pub fn is_expiring(&self, buffer_secs: i64) -> bool {
        Utc::now().timestamp() >= self.oauth_expires_at - buffer_secs
    }
}

/// OAuth refresh request body
#[derive(Serialize)]
pub struct TokenRefreshRequest<'a> {
    pub refresh_token: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub redirect_uri: &'a str,
    pub grant_type: &'a str,
}

/// OAuth refresh response
#[derive(Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Error body returned by the OAuth token endpoint
#[derive(Deserialize, Default)]
pub struct OAuthErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}
