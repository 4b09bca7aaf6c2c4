use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::{fail, success, ApiError, ApiJson, AppState, Success};
use crate::auth::AdminSession;
use crate::error::Error;

#[derive(Debug, Deserialize)]
pub(super) struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LogoutRequest {
    token: Option<String>,
}

pub(super) async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AdminSession>, ApiError> {
    let (Some(username), Some(password)) = (
        body.username.filter(|u| !u.is_empty()),
        body.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(Error::validation("Username and password required").into());
    };

    let session = state
        .sessions
        .issue(&username, &password)
        .await
        .map_err(fail("Login failed"))?;
    Ok(Json(session))
}

pub(super) async fn logout(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LogoutRequest>,
) -> Result<Json<Success>, ApiError> {
    let token = body
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::validation("Token required"))?;

    state
        .sessions
        .revoke(&token)
        .await
        .map_err(fail("Logout failed"))?;
    Ok(success())
}
