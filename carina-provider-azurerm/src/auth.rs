//! Azure AD token acquisition
//!
//! Supports the client-credentials (service principal) flow against the
//! Microsoft identity platform v2.0 token endpoint, or a static bearer token.

use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::Deserialize;

use crate::config::Credentials;
use crate::error::{AzureError, AzureResult};

/// Tokens are refreshed this long before they actually expire
const EXPIRY_MARGIN_SECS: i64 = 300;
/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Bearer token with its expiry
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AccessToken {
    /// True if the token is expired or about to expire at `now`
    pub fn is_expiring(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Token endpoint URL for a given tenant
pub fn token_url(authority_host: &str, tenant_id: &str) -> String {
    format!(
        "{}/{}/oauth2/v2.0/token",
        authority_host.trim_end_matches('/'),
        tenant_id
    )
}

/// OAuth2 scope for a resource manager endpoint
pub fn scope_for(resource_manager_endpoint: &str) -> String {
    format!("{}/.default", resource_manager_endpoint.trim_end_matches('/'))
}

/// Acquire a token for the given credentials
pub async fn acquire_token(
    http: &reqwest::Client,
    credentials: &Credentials,
    authority_host: &str,
    scope: &str,
) -> AzureResult<AccessToken> {
    let (tenant_id, client_id, client_secret) = match credentials {
        Credentials::AccessToken(token) => {
            return Ok(AccessToken {
                token: token.clone(),
                expires_at: DateTime::<Utc>::MAX_UTC,
            });
        }
        Credentials::ClientSecret {
            tenant_id,
            client_id,
            client_secret,
        } => (tenant_id, client_id, client_secret),
    };

    let url = token_url(authority_host, tenant_id);
    debug!("Azure token request -> {}", url);

    let form = [
        ("grant_type", "client_credentials"),
        ("client_id", client_id.as_str()),
        ("client_secret", client_secret.as_str()),
        ("scope", scope),
    ];

    let response = http.post(&url).form(&form).send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(AzureError::Auth(format!(
            "token endpoint returned {}: {}",
            status,
            body.trim()
        )));
    }

    let parsed: TokenResponse = serde_json::from_str(&body)?;
    Ok(token_from_response(parsed, Utc::now()))
}

fn token_from_response(response: TokenResponse, now: DateTime<Utc>) -> AccessToken {
    let lifetime = response.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    AccessToken {
        token: response.access_token,
        expires_at: now + Duration::seconds(lifetime),
    }
}
