//! Login and logout.
//!
//! - `POST /api/session`: start a session, returns a bearer token
//! - `DELETE /api/session`: revoke the presented bearer token

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::middleware::auth::bearer_token;
use crate::api::types::{ApiContext, LoginRequest, TokenResponse};
use crate::session::UserIdentity;

pub async fn login(
    State(ctx): State<ApiContext>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let user_id = req.user_id.trim();
    if user_id.is_empty() {
        return Err(ApiError::BadRequest("userId is required".into()));
    }

    let token = ctx.sessions.login(UserIdentity {
        id: user_id.to_string(),
        email: req.email.trim().to_string(),
        name: req.name.trim().to_string(),
    });
    Ok(Json(TokenResponse { token }))
}

pub async fn logout(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = bearer_token(&headers).ok_or(ApiError::Unauthorized)?;
    if ctx.sessions.logout(token) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::Unauthorized)
    }
}
