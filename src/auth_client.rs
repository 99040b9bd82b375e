use failsafe::futures::CircuitBreaker as _;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use crate::circuit_breaker::{create_auth_circuit_breaker, AuthCircuitBreaker};
use crate::errors::AppError;
use crate::session::{token_expiry, Session};

/// User payload returned by `GET /auth/v1/user`.
#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Uuid,
    email: Option<String>,
}

/// Client for the hosted backend's auth endpoints.
///
/// Only session lookup is needed here; sign-in and sign-up stay with the
/// front-end.
#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    breaker: AuthCircuitBreaker,
}

impl AuthClient {
    /// Creates a new `AuthClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the backend (without `/auth/v1`).
    /// * `api_key` - Public API key sent as the `apikey` header.
    pub fn new(base_url: String, api_key: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create auth client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            breaker: create_auth_circuit_breaker(),
        })
    }

    /// Looks up the session behind an access token.
    ///
    /// Rejected tokens come back as `Unauthorized` and do not count against
    /// the circuit breaker; transport and server failures do. The session
    /// expires with the token's `exp` claim when it has one.
    pub async fn fetch_session(&self, access_token: &str) -> Result<Session, AppError> {
        let access_token = access_token.trim();
        if access_token.is_empty() {
            return Err(AppError::Unauthorized("Empty access token".to_string()));
        }

        let result = self
            .breaker
            .call_with(
                |e: &AppError| !e.is_unauthorized(),
                self.request_user(access_token),
            )
            .await;

        match result {
            Ok(user) => {
                tracing::debug!("Session resolved for user {}", user.id);
                Ok(Session {
                    user_id: user.id,
                    email: user.email,
                    access_token: access_token.to_string(),
                    expires_at: token_expiry(access_token),
                })
            }
            Err(failsafe::Error::Inner(e)) => Err(e),
            Err(failsafe::Error::Rejected) => {
                tracing::warn!("Auth circuit open, rejecting session lookup");
                Err(AppError::ExternalApiError(
                    "Auth service temporarily unavailable".to_string(),
                ))
            }
        }
    }

    async fn request_user(&self, access_token: &str) -> Result<AuthUser, AppError> {
        let url = format!("{}/auth/v1/user", self.base_url);
        tracing::debug!("Fetching session user: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Auth request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::Unauthorized(format!(
                "Auth service rejected token ({})",
                status
            )));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Auth service returned {}: {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse auth user response: {}", e))
        })
    }
}
