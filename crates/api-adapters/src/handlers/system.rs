use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domains::errors::DomainError;

use crate::response::ApiError;
use crate::state::AppState;

const OPENMETRICS: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

pub async fn health() -> &'static str {
    "OK"
}

pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state
        .metrics
        .render()
        .map_err(|e| DomainError::Internal(format!("metrics encoding failed: {e}")))?;
    Ok((StatusCode::OK, [(CONTENT_TYPE, OPENMETRICS)], body).into_response())
}
