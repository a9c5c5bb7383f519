//! Admin authentication for the write endpoints.
//!
//! With credentials configured, a successful login hands out the process's
//! bearer token and every write endpoint demands it. Without credentials,
//! login answers 404 and writes are open.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Checks credentials and bearer tokens.
#[derive(Debug, Clone)]
pub struct Authenticator {
    credentials: Option<(String, String)>,
    token: Uuid,
}

impl Authenticator {
    /// Build from config. Authentication is enabled only when both the
    /// username and the password are set.
    pub fn new(config: &AuthConfig) -> Self {
        let credentials = config
            .username
            .clone()
            .zip(config.password.clone());
        Self {
            credentials,
            token: Uuid::new_v4(),
        }
    }

    /// Whether write endpoints require a token.
    pub const fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    /// Exchange credentials for the bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when authentication is disabled and
    /// [`ApiError::Unauthorized`] when the credentials do not match.
    pub fn login(&self, username: &str, password: &str) -> Result<Uuid, ApiError> {
        let Some((expected_user, expected_password)) = &self.credentials else {
            return Err(ApiError::NotFound(String::from(
                "authentication is not configured",
            )));
        };
        if username == expected_user && password == expected_password {
            Ok(self.token)
        } else {
            Err(ApiError::Unauthorized(String::from("invalid credentials")))
        }
    }

    /// Check the `Authorization: Bearer <token>` header.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when authentication is enabled and
    /// the header is missing or carries the wrong token.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        if !self.is_enabled() {
            return Ok(());
        }
        let presented = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .and_then(|token| Uuid::parse_str(token.trim()).ok());
        match presented {
            Some(token) if token == self.token => Ok(()),
            Some(_) => Err(ApiError::Unauthorized(String::from("invalid token"))),
            None => Err(ApiError::Unauthorized(String::from("missing bearer token"))),
        }
    }
}

/// Extractor guarding a handler behind [`Authenticator::authorize`].
#[derive(Debug, Clone, Copy)]
pub struct Admin;

impl FromRequestParts<Arc<AppState>> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        state.auth.authorize(&parts.headers)?;
        Ok(Self)
    }
}
