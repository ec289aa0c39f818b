//! JWT authentication
//!
//! Bearer tokens signed with HS256. The `AuthUser` extractor resolves the
//! caller's identity and role for every protected endpoint; with
//! authentication disabled (`--no-auth`) every request runs as an
//! anonymous admin.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::server::AppState;
use super::types::ApiError;
use crate::core::config::AuthConfig;
use crate::data::filters::Role;

/// Token validation error
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("access token has expired")]
    Expired,
    #[error("invalid access token signature")]
    InvalidSignature,
    #[error("invalid access token: {0}")]
    Invalid(String),
}

/// JWT claims for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// `client` or `admin`
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates access tokens
pub struct AuthManager {
    enabled: bool,
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: u32,
}

impl AuthManager {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            enabled: config.enabled,
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl_hours: config.token_ttl_hours,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn token_ttl_secs(&self) -> u64 {
        u64::from(self.ttl_hours) * 3600
    }

    /// Create a signed access token for a user
    pub fn issue(&self, user_id: Uuid, role: &str) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(i64::from(self.ttl_hours))).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| anyhow::anyhow!("failed to create access token: {e}"))
    }

    /// Validate a token and return its claims
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Invalid(e.to_string()),
            }
        })?;
        Ok(data.claims)
    }
}

/// Authenticated caller
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// Absent in no-auth mode
    pub user_id: Option<Uuid>,
    pub role: Role,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !state.auth.is_enabled() {
            return Ok(Self {
                user_id: None,
                role: Role::Admin,
            });
        }

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ApiError::unauthorized("MISSING_TOKEN", "Missing bearer access token")
            })?;

        let claims = state
            .auth
            .validate(token)
            .map_err(|e| ApiError::unauthorized("INVALID_TOKEN", e.to_string()))?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
            ApiError::unauthorized("INVALID_TOKEN", "Malformed subject in access token")
        })?;
        let role = match claims.role.as_str() {
            "admin" => Role::Admin,
            _ => Role::Client,
        };

        Ok(Self {
            user_id: Some(user_id),
            role,
        })
    }
}
