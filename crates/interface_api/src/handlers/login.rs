//! Login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{create_token, verify_credentials, ADMIN_ROLE};
use crate::{error::ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Exchanges the administrator's credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    let config = &state.config;

    if let Err(e) = verify_credentials(
        &request.username,
        &request.password,
        &config.admin_username,
        &config.admin_password,
    ) {
        warn!(username = %request.username, "Rejected login");
        return Err(e.into());
    }

    let token = create_token(
        &request.username,
        vec![ADMIN_ROLE.to_string()],
        &config.jwt_secret,
        config.jwt_expiration_secs,
    )?;
    info!(username = %request.username, "Administrator logged in");

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: config.jwt_expiration_secs,
    }))
}
