//! The `{code, msg, data}` envelope and the error side of every handler.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::errors::DomainError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub msg: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            msg: "ok".into(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The request could not be decoded (bad JSON, query or path).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Domain(err) => match err {
                DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
                DomainError::Validation(_) => StatusCode::BAD_REQUEST,
                DomainError::InvalidTransition { .. } | DomainError::Conflict(_) => {
                    StatusCode::CONFLICT
                }
                DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
                DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Rejected { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
            "internal server error".to_owned()
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
            self.to_string()
        };
        let body = ApiResponse {
            code: status.as_u16(),
            msg,
            data: serde_json::Value::Null,
        };
        (status, Json(body)).into_response()
    }
}

macro_rules! rejected_from {
    ($($rejection:ty),+) => {
        $(impl From<$rejection> for ApiError {
            fn from(rejection: $rejection) -> Self {
                Self::Rejected {
                    status: rejection.status(),
                    message: rejection.body_text(),
                }
            }
        })+
    };
}

rejected_from!(JsonRejection, QueryRejection, PathRejection);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::not_found("Meetup", "m9"), StatusCode::NOT_FOUND),
            (DomainError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::transition("completed", "pending"), StatusCode::CONFLICT),
            (DomainError::Conflict("full".into()), StatusCode::CONFLICT),
            (DomainError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (DomainError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (DomainError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[tokio::test]
    async fn errors_use_the_envelope() {
        let resp = ApiError::from(DomainError::not_found("Meetup", "m9")).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body(resp).await;
        assert_eq!(json["code"], 404);
        assert_eq!(json["msg"], "Meetup not found with ID m9");
        assert!(json["data"].is_null());
    }

    #[tokio::test]
    async fn internal_details_stay_in_the_logs() {
        let resp = ApiError::from(DomainError::Internal("disk on fire".into())).into_response();
        let json = body(resp).await;
        assert_eq!(json["code"], 500);
        assert_eq!(json["msg"], "internal server error");
    }

    #[tokio::test]
    async fn success_wraps_data() {
        let json = body(ApiResponse::ok(vec![1, 2]).into_response()).await;
        assert_eq!(json, serde_json::json!({"code": 200, "msg": "ok", "data": [1, 2]}));
    }
}
