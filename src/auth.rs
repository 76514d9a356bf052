//! OAuth2 client-credentials authentication for the Microsoft identity platform.
//!
//! Acquires bearer tokens from Azure AD's `/oauth2/v2.0/token` endpoint using
//! the client_credentials grant. The token is cached in `TokenProvider` and
//! refreshed on demand. Consumers (e.g. `GraphClient`) read the cached token
//! via `token()` and call `refresh_token()` when it is absent or stale.
//!
//! The command pipeline itself never touches this module beyond "a bearer
//! token exists for the target audience" — token acquisition and refresh are
//! wholly contained here.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::{CliError, Result};

/// Azure AD v2.0 token endpoint. `{tenant_id}` is replaced at runtime.
const TOKEN_URL: &str = "https://login.microsoftonline.com/{tenant_id}/oauth2/v2.0/token";

/// Default scope for Microsoft Graph application permissions.
pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Connect + request timeout for token requests. Token responses are small;
/// 30 seconds is generous.
const TOKEN_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Form body sent to the token endpoint.
/// Fields are serialized as `application/x-www-form-urlencoded` by reqwest's `.form()`.
#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    scope: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
}

/// Subset of the Azure AD token response that we need.
/// The endpoint returns additional fields (e.g. `ext_expires_in`) which are
/// silently ignored because the struct is not `deny_unknown_fields`.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Safety buffer subtracted from `expires_in` to trigger refresh before
/// the token actually expires. Prevents requests from racing the expiry boundary.
const EXPIRY_BUFFER_SECS: u64 = 60;

/// Manages OAuth2 token acquisition and caching.
///
/// Invariants:
/// - `response` is `None` until the first successful `refresh_token()` call.
/// - After a successful refresh, `token()` returns `Some` until the token
///   expires (with a 60-second safety buffer) or is invalidated.
/// - `acquired_at` is always `Some` when `response` is `Some`.
pub struct TokenProvider {
    client: reqwest::Client,
    scope: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
    response: Option<TokenResponse>,
    acquired_at: Option<Instant>,
}

impl TokenProvider {
    /// Creates a provider for the given tenant/app credentials and scope.
    /// No network call is made until the first `refresh_token()`.
    pub fn new(tenant_id: &str, client_id: &str, client_secret: &str, scope: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(TOKEN_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        TokenProvider {
            client,
            scope: scope.to_string(),
            tenant_id: tenant_id.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            response: None,
            acquired_at: None,
        }
    }

    /// Creates a `TokenProvider` with a pre-set token, bypassing Azure AD.
    /// Used by tests to avoid real HTTP calls during token acquisition.
    /// The token is treated as freshly acquired (expires_in = 3600s).
    pub fn with_token(token: &str) -> Self {
        TokenProvider {
            client: reqwest::Client::new(),
            scope: String::new(),
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            response: Some(TokenResponse {
                access_token: token.to_string(),
                expires_in: 3600,
            }),
            acquired_at: Some(Instant::now()),
        }
    }

    /// Fetches a new token from Azure AD and caches it.
    ///
    /// The response body is read as text first so that on failure the raw
    /// AADSTS error message is preserved in the error — `error_for_status()`
    /// would discard this diagnostic information.
    pub async fn refresh_token(&mut self) -> Result<()> {
        let body = TokenRequest {
            client_id: &self.client_id,
            scope: &self.scope,
            client_secret: &self.client_secret,
            grant_type: "client_credentials",
        };

        let url = TOKEN_URL.replace("{tenant_id}", &self.tenant_id);

        let response = self
            .client
            .post(&url)
            .form(&body)
            .send()
            .await
            .map_err(|e| CliError::Auth {
                message: "could not reach the token endpoint".to_string(),
                source: Some(Box::new(e)),
            })?;

        // Read body before checking status so we can surface Microsoft's
        // detailed error (AADSTS codes) on failure.
        let status = response.status();
        let body = response.text().await.map_err(|e| CliError::Auth {
            message: "could not read the token response".to_string(),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(CliError::Auth {
                message: format!("token request failed ({status}): {body}"),
                source: None,
            });
        }

        let resp: TokenResponse = serde_json::from_str(&body).map_err(|e| CliError::Auth {
            message: "could not parse the token response".to_string(),
            source: Some(Box::new(e)),
        })?;
        self.acquired_at = Some(Instant::now());
        self.response = Some(resp);

        Ok(())
    }

    /// Drops the cached token so the next `token()` call reports absence.
    /// Used by the client after a server-side 401 rejection.
    pub fn invalidate(&mut self) {
        self.response = None;
        self.acquired_at = None;
    }

    /// Returns `true` if a token exists but has exceeded its lifetime
    /// (minus the safety buffer). Returns `false` if no token is cached.
    fn is_expired(&self) -> bool {
        match (&self.response, self.acquired_at) {
            (Some(resp), Some(acquired)) => {
                let lifetime = resp.expires_in.saturating_sub(EXPIRY_BUFFER_SECS);
                acquired.elapsed().as_secs() >= lifetime
            }
            _ => false,
        }
    }

    /// Returns the cached access token, or `None` if no token exists
    /// or the token has expired (with a 60-second safety buffer).
    pub fn token(&self) -> Option<&str> {
        if self.is_expired() {
            return None;
        }
        self.response.as_ref().map(|ret| ret.access_token.as_str())
    }
}
