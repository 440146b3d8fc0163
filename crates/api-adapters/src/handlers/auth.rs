use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use domains::errors::DomainError;
use domains::models::{Account, LoginRequest, RefreshRequest, RefreshResult, RegisterRequest};

use crate::extract::{refresh_cookie, AuthUser, Body};
use crate::response::{ApiError, ApiResponse, ApiResult};
use crate::state::AppState;

/// Issues both tokens. The refresh token also goes out as an HTTP-only
/// cookie.
pub async fn login(
    State(state): State<AppState>,
    Body(req): Body<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.services.auth.login(req).await?;
    let cookie = state.cookie.set(&result.refresh_token);
    Ok(([(SET_COOKIE, cookie)], ApiResponse::ok(result)))
}

pub async fn register(
    State(state): State<AppState>,
    Body(req): Body<RegisterRequest>,
) -> ApiResult<Account> {
    Ok(ApiResponse::ok(state.services.auth.register(req).await?))
}

/// Reads the refresh token from the cookie, falling back to the body.
/// Answers with the bare `{data, status}` shape the web client expects.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RefreshResult>, ApiError> {
    let token = refresh_cookie(&headers)
        .or_else(|| body_token(&body))
        .ok_or_else(|| DomainError::Unauthorized("missing refresh token".into()))?;
    Ok(Json(state.services.auth.refresh(&token).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let token = refresh_cookie(&headers).or_else(|| body_token(&body));
    state.services.auth.logout(token.as_deref()).await?;
    Ok(([(SET_COOKIE, state.cookie.clear())], ApiResponse::ok(())))
}

pub async fn codes(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Vec<String>> {
    Ok(ApiResponse::ok(state.services.auth.access_codes(&caller)))
}

pub async fn user_info(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Account> {
    Ok(ApiResponse::ok(state.services.auth.user_info(&caller).await?))
}

fn body_token(body: &Bytes) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice::<RefreshRequest>(body)
        .ok()
        .and_then(|r| r.refresh_token)
        .filter(|t| !t.is_empty())
}
