// Token refresh logic

use chrono::Utc;
use reqwest::Client;

use crate::error::ApiError;

use super::types::{OAuthErrorBody, TokenRefreshRequest, TokenRefreshResponse, TraktCredentials};

/// Out-of-band redirect URI used by device-less OAuth clients
const REDIRECT_URI_OOB: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Refresh the Trakt access token using the stored refresh token.
///
/// Returns a new credential blob with the rotated token pair and the real
/// expiry of the new access token. The caller is responsible for persisting it.
pub async fn refresh_credentials(
    client: &Client,
    base_url: &str,
    creds: &TraktCredentials,
) -> Result<TraktCredentials, ApiError> {
    tracing::info!("Refreshing Trakt access token...");

    let request = TokenRefreshRequest {
        refresh_token: &creds.oauth_refresh_token,
        client_id: &creds.client_id,
        client_secret: &creds.client_secret,
        redirect_uri: REDIRECT_URI_OOB,
        grant_type: "refresh_token",
    };

    let response = client
        .post(format!("{}/oauth/token", base_url))
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let description = serde_json::from_str::<OAuthErrorBody>(&body)
            .ok()
            .and_then(|e| e.error_description)
            .unwrap_or_else(|| format!("{} - {}", status, body));
        tracing::error!("Token refresh failed: {}", description);
        return Err(ApiError::AuthRefresh(description));
    }

    let data: TokenRefreshResponse = response.json().await?;

    let expires_at = Utc::now().timestamp() + data.expires_in;
    tracing::info!("Token refreshed, expires at {} (epoch seconds)", expires_at);

    Ok(TraktCredentials {
        client_id: creds.client_id.clone(),
        client_secret: creds.client_secret.clone(),
        oauth_token: data.access_token,
        oauth_refresh_token: data.refresh_token,
        oauth_expires_at: expires_at,
    })
}
