//! Client configuration parsed from environment variables.

use reqwest::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const API_URL_ENV: &str = "LINKVAULT_API_URL";
pub const SESSION_TOKEN_ENV: &str = "LINKVAULT_SESSION_TOKEN";

/// Errors produced while building a [`ClientConfig`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The base origin is not an absolute `http`/`https` URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Origin every API path is appended to, without a trailing `/`.
    pub api_url: String,
    /// Session cookie value to resume, if any.
    pub session_token: Option<String>,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `LINKVAULT_API_URL`: default `http://localhost:8080`
    /// - `LINKVAULT_SESSION_TOKEN`: preset `token` cookie value
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the base origin does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        let session_token = std::env::var(SESSION_TOKEN_ENV).ok();
        Self::new(&api_url, session_token)
    }

    /// Build config from explicit values, normalizing the base origin.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `api_url` does not parse.
    pub fn new(api_url: &str, session_token: Option<String>) -> Result<Self, ConfigError> {
        let api_url = normalize_api_url(api_url)?;
        let session_token = session_token.filter(|token| !token.trim().is_empty());
        Ok(Self { api_url, session_token })
    }

    /// Replace the origin and/or session token with explicitly supplied values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `api_url` does not parse.
    pub fn with_overrides(self, api_url: Option<&str>, session_token: Option<String>) -> Result<Self, ConfigError> {
        let api_url = api_url.unwrap_or(&self.api_url).to_owned();
        Self::new(&api_url, session_token.or(self.session_token))
    }

    /// Parsed form of [`Self::api_url`], used for cookie scoping.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the stored origin no longer parses.
    pub fn origin(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.api_url).map_err(|e| ConfigError::InvalidBaseUrl(format!("{}: {e}", self.api_url)))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_API_URL.to_owned(), session_token: None }
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl(format!("{trimmed}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_owned()),
        other => Err(ConfigError::InvalidBaseUrl(format!("unsupported scheme '{other}' in {trimmed}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
