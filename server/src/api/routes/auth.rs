//! Token issuance endpoint
//!
//! Development login: checks a login/password pair against the users table
//! and returns a signed access token carrying the account's role.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::server::AppState;
use crate::api::types::ApiError;
use crate::data::sqlite::{find_user_by_login, verify_password};

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

pub async fn issue_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = find_user_by_login(&state.pool, &req.login)
        .await
        .map_err(ApiError::from_data)?;

    let user = match user {
        Some(user) if verify_password(&req.password, &user.password_hash) => user,
        _ => {
            // same response for unknown login and wrong password
            return Err(ApiError::unauthorized(
                "INVALID_CREDENTIALS",
                "Invalid login or password",
            ));
        }
    };

    let user_id = Uuid::parse_str(&user.id)
        .map_err(|_| ApiError::internal("Stored user id is not a valid UUID"))?;
    let access_token = state
        .auth
        .issue(user_id, &user.role)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::debug!(login = %user.login, role = %user.role, "issued access token");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in: state.auth.token_ttl_secs(),
    }))
}
