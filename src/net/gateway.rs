//! Request gateway: the single path every backend call takes.
//!
//! ARCHITECTURE
//! ============
//! One `reqwest::Client` per gateway, sharing a cookie jar with every clone.
//! The backend authenticates with an HTTP-only `token` cookie, so the jar is
//! the whole credential story: login fills it, logout expires it, and every
//! request carries it to the configured origin.
//!
//! ERROR HANDLING
//! ==============
//! Any non-success status becomes an [`ApiError`]; there is no retry, no
//! timeout and no caching at this layer.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use crate::config::{ClientConfig, ConfigError};

/// Name of the session cookie issued by the backend.
pub const SESSION_COOKIE: &str = "token";

// =============================================================================
// REQUEST OPTIONS
// =============================================================================

/// Per-call method, body and header overrides.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    method: Method,
    body: Option<Vec<u8>>,
    headers: HeaderMap,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::method(Method::GET)
    }
}

impl RequestOptions {
    #[must_use]
    pub fn method(method: Method) -> Self {
        Self { method, body: None, headers: HeaderMap::new() }
    }

    #[must_use]
    pub fn get() -> Self {
        Self::method(Method::GET)
    }

    #[must_use]
    pub fn post() -> Self {
        Self::method(Method::POST)
    }

    /// Attach `body` serialized as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] if serialization fails.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let bytes = serde_json::to_vec(body).map_err(|e| ApiError::Encode { message: e.to_string() })?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Set a header; it replaces any default header of the same name.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }
}

/// Default headers with every caller-supplied name replacing the default.
pub(crate) fn merge_headers(overrides: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for name in overrides.keys() {
        headers.remove(name);
    }
    for (name, value) in overrides {
        headers.append(name.clone(), value.clone());
    }
    headers
}

// =============================================================================
// GATEWAY
// =============================================================================

/// HTTP gateway bound to one backend origin. Clones share the cookie jar.
#[derive(Debug, Clone)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
    origin: Url,
    jar: Arc<Jar>,
}

impl Gateway {
    /// Build a gateway for `config`, seeding the jar with any preset session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the origin does not parse or the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let origin = config.origin()?;
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(|e| ConfigError::HttpClientBuild(e.to_string()))?;

        let gateway = Self { http, base_url: config.api_url.clone(), origin, jar };
        if let Some(token) = &config.session_token {
            gateway.set_session_token(token);
        }
        Ok(gateway)
    }

    /// Origin all endpoints are appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `endpoint`.
    #[must_use]
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    /// Store `token` as the session cookie for this origin.
    pub fn set_session_token(&self, token: &str) {
        self.jar.add_cookie_str(&format!("{SESSION_COOKIE}={token}; Path=/"), &self.origin);
    }

    /// Current session cookie value, if the jar holds one for this origin.
    #[must_use]
    pub fn session_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.origin)?;
        let raw = header.to_str().ok()?;
        raw.split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value.to_owned())
            .filter(|value| !value.is_empty())
    }

    /// Issue a request to `base_url + endpoint` and parse the JSON success body as `T`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Transport`] if no response could be read.
    /// - [`ApiError::Application`] / [`ApiError::UnreadableBody`] for non-success statuses.
    /// - [`ApiError::Decode`] if a success body does not parse as `T`.
    pub async fn request<T: DeserializeOwned>(&self, endpoint: &str, options: RequestOptions) -> Result<T, ApiError> {
        let RequestOptions { method, body, headers } = options;
        let url = self.url(endpoint);
        tracing::debug!(%method, endpoint, "api request");

        let mut builder = self.http.request(method, &url).headers(merge_headers(&headers));
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| ApiError::transport(&e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::transport(&e))?;

        if !status.is_success() {
            let err = ApiError::from_failed_response(status.as_u16(), &text);
            tracing::debug!(endpoint, status = status.as_u16(), error = %err, "api request failed");
            return Err(err);
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Decode { status: status.as_u16(), message: e.to_string() })
    }
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
