//! Typed auth endpoints on top of the [`Gateway`].
//!
//! Stateless: each call maps one request body to one response body and
//! passes gateway failures through untouched.

use super::error::ApiError;
use super::gateway::{Gateway, RequestOptions};
use super::types::{AuthResponse, HealthStatus, LoginRequest, MeResponse, MessageResponse, RegisterRequest};

pub const REGISTER_ENDPOINT: &str = "/api/auth/register";
pub const LOGIN_ENDPOINT: &str = "/api/auth/login";
pub const LOGOUT_ENDPOINT: &str = "/api/auth/logout";
pub const ME_ENDPOINT: &str = "/api/me";
pub const HEALTH_ENDPOINT: &str = "/health";

#[derive(Debug, Clone)]
pub struct AuthClient {
    gateway: Gateway,
}

impl AuthClient {
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// `POST /api/auth/register`.
    ///
    /// # Errors
    ///
    /// Returns any gateway failure unchanged.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let options = RequestOptions::post().json(request)?;
        self.gateway.request(REGISTER_ENDPOINT, options).await
    }

    /// `POST /api/auth/login`.
    ///
    /// # Errors
    ///
    /// Returns any gateway failure unchanged.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let options = RequestOptions::post().json(request)?;
        self.gateway.request(LOGIN_ENDPOINT, options).await
    }

    /// `POST /api/auth/logout`, no body.
    ///
    /// # Errors
    ///
    /// Returns any gateway failure unchanged.
    pub async fn logout(&self) -> Result<MessageResponse, ApiError> {
        self.gateway.request(LOGOUT_ENDPOINT, RequestOptions::post()).await
    }

    /// `GET /api/me`. Fails with a 401 when no valid session cookie is held.
    ///
    /// # Errors
    ///
    /// Returns any gateway failure unchanged.
    pub async fn current_user(&self) -> Result<MeResponse, ApiError> {
        self.gateway.request(ME_ENDPOINT, RequestOptions::get()).await
    }

    /// `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns any gateway failure unchanged.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.gateway.request(HEALTH_ENDPOINT, RequestOptions::get()).await
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
