//! Authenticated HTTP client for the Microsoft Graph API.
//!
//! `GraphClient` wraps a `reqwest::Client` and a `TokenProvider` behind a
//! `Mutex`, providing JSON-based request helpers (`get`, `get_with_query`,
//! `patch_no_content`) and a bodiless `delete` for pure removals. Query
//! parameters are passed as pairs and encoded by reqwest, never spliced
//! into the path string.
//!
//! Token lifecycle:
//! - Lazy acquisition: the first request that finds no cached token triggers
//!   `refresh_token()` automatically via `bearer_token()`.
//! - Expiry-aware: `TokenProvider::token()` returns `None` when the cached
//!   token has expired, which triggers a fresh refresh on the next request.
//! - One-shot 401 retry: if the API returns `401 Unauthorized` (e.g. because
//!   the token was revoked server-side before our local expiry check caught
//!   it), the client invalidates the cached token, refreshes once, and
//!   retries the request exactly once. A second 401 is a hard failure.
//!
//! Error handling: non-success responses read the body *before* failing so
//! the Graph/OData error envelope survives to the normalizer
//! ([`crate::error::api_error`]). No other retries happen at this layer —
//! each command issues exactly one reading/mutating call and a failed call
//! propagates immediately.

use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::auth::TokenProvider;
use crate::error::{CliError, Result, api_error};

const BASE_URL: &str = "https://graph.microsoft.com/";

/// Connect timeout for Graph API calls.
/// Covers TCP + TLS handshake only. 10 seconds is generous for Azure services.
const API_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall request timeout for Graph API calls.
/// Covers the full round-trip including response body download. Directory
/// list responses can run to a few MB for large tenants; regular calls
/// complete well within this limit.
const API_REQUEST_TIMEOUT: Duration = Duration::from_secs(100);

/// Builds a `reqwest::Client` with explicit timeouts for Graph API calls.
///
/// Separate from the `TokenProvider`'s client so the two can carry
/// different timeout policies: token requests are small and fast, API
/// requests may carry large list responses.
fn build_api_client() -> Client {
    Client::builder()
        .connect_timeout(API_CONNECT_TIMEOUT)
        .timeout(API_REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// Authenticated HTTP client for the Microsoft Graph REST API.
///
/// Design decisions:
/// - `auth` is behind a `Mutex` because `refresh_token()` requires `&mut self`
///   while API methods only need `&self`. The lock is held only for the brief
///   token check/refresh, never across an HTTP round-trip.
/// - `base_url` is stored as a `String` rather than a `&'static str` so it
///   can be overridden in tests (e.g. pointing at a wiremock server).
pub struct GraphClient {
    client: Client,
    base_url: String,
    auth: Mutex<TokenProvider>,
}

impl GraphClient {
    /// Creates a client against the production Graph endpoint.
    pub fn new(auth: TokenProvider) -> Self {
        GraphClient {
            client: build_api_client(),
            base_url: BASE_URL.to_string(),
            auth: Mutex::new(auth),
        }
    }

    /// Constructor that accepts a custom base URL, used by tests to point
    /// at a local mock server instead of the real Graph API.
    pub fn with_base_url(auth: TokenProvider, base_url: &str) -> Self {
        GraphClient {
            client: build_api_client(),
            base_url: base_url.to_string(),
            auth: Mutex::new(auth),
        }
    }

    /// Returns a valid bearer token, refreshing if none is cached or if the
    /// current token has expired.
    ///
    /// The mutex is held only for the token check and optional refresh.
    /// If refresh itself fails, the error propagates to the caller.
    async fn bearer_token(&self) -> Result<String> {
        let mut auth = self.auth.lock().await;
        if auth.token().is_none() {
            auth.refresh_token().await?;
        }

        auth.token()
            .map(str::to_owned)
            .ok_or_else(|| CliError::Auth {
                message: "token missing after refresh".to_string(),
                source: None,
            })
    }

    /// Invalidates the current token and acquires a fresh one from Azure AD.
    ///
    /// Called when the API returns 401, indicating the token was rejected
    /// server-side (revocation, clock skew, etc.) before our local expiry
    /// tracking detected it.
    async fn force_refresh(&self) -> Result<String> {
        let mut auth = self.auth.lock().await;
        auth.invalidate();
        auth.refresh_token().await?;

        auth.token()
            .map(str::to_owned)
            .ok_or_else(|| CliError::Auth {
                message: "token missing after forced refresh".to_string(),
                source: None,
            })
    }

    /// Core HTTP method: sends an authenticated request and returns the
    /// response once it carries a success status. All verb-specific methods
    /// delegate here.
    ///
    /// `path` is relative to `base_url` (no leading slash needed).
    /// `query` pairs are URL-encoded by reqwest before sending.
    /// `body` is serialized as JSON when present; omitted for GET/DELETE.
    ///
    /// 401 retry behavior:
    /// - If the response is `401 Unauthorized`, the client assumes the token
    ///   was rejected server-side. It invalidates the cached token, acquires
    ///   a fresh one, and retries the request exactly once.
    /// - If the retry also returns 401, the error propagates to the caller.
    /// - Non-401 error statuses (403, 404, 500, …) are never retried; their
    ///   bodies are read and normalized via [`api_error`] so the upstream
    ///   error envelope's embedded message is preserved.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);

        // First attempt with current (possibly cached) token.
        let token = self.bearer_token().await?;
        let mut resp = self
            .build_request(method.clone(), &url, query, &token, body)
            .send()
            .await?;

        // On 401, force a token refresh and retry exactly once.
        // Any other status (success or non-401 error) skips the retry path.
        if resp.status() == StatusCode::UNAUTHORIZED {
            let fresh_token = self.force_refresh().await?;
            resp = self
                .build_request(method, &url, query, &fresh_token, body)
                .send()
                .await?;
        }

        let status = resp.status();
        if !status.is_success() {
            // Read the body before failing so the Graph error envelope
            // reaches the normalizer intact.
            let body = resp.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        Ok(resp)
    }

    /// Constructs an authenticated request builder with optional JSON body.
    ///
    /// Factored out of `send` so the first attempt and the 401 retry can
    /// both build requests without duplicating header/body attachment.
    /// Query pairs go through reqwest's `.query()`, which encodes reserved
    /// characters; an empty pair list leaves the URL untouched.
    fn build_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, &str)],
        token: &str,
        body: Option<&B>,
    ) -> reqwest::RequestBuilder {
        let mut req = self.client.request(method, url).bearer_auth(token);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(payload) = body {
            req = req.json(payload);
        }
        req
    }

    /// Sends an authenticated GET request and deserializes the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.send::<()>(Method::GET, path, &[], None).await?;
        Ok(resp.json::<T>().await?)
    }

    /// Sends an authenticated GET request with query parameters and
    /// deserializes the JSON response.
    ///
    /// `query` values are URL-encoded by reqwest, so OData expressions can
    /// carry spaces, quotes, and `&` safely.
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let resp = self.send::<()>(Method::GET, path, query, None).await?;
        Ok(resp.json::<T>().await?)
    }

    /// Sends an authenticated PATCH request and discards the (typically
    /// empty `204 No Content`) response body.
    pub async fn patch_no_content<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<()> {
        self.send(Method::PATCH, path, &[], Some(body)).await?;
        Ok(())
    }

    /// Sends an authenticated DELETE request. Graph answers pure deletes
    /// with `204 No Content`, so no body is parsed.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send::<()>(Method::DELETE, path, &[], None).await?;
        Ok(())
    }
}
