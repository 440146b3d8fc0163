//! Request extractors: callers resolved from the bearer token, plus JSON
//! and query wrappers whose rejections use the response envelope.

use std::convert::Infallible;

use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use domains::errors::DomainError;
use domains::models::{Actor, Principal};
use serde::de::DeserializeOwned;

use crate::response::ApiError;
use crate::state::{AppState, REFRESH_COOKIE};

/// A signed-in caller. Rejects with 401.
pub struct AuthUser(pub Principal);

/// The caller when a valid token is present. Bad tokens read as anonymous.
pub struct MaybeUser(pub Option<Principal>);

/// A signed-in admin. Rejects with 401, or 403 for members.
pub struct AdminUser(pub Principal);

/// A signed-in caller with their public profile loaded.
pub struct CurrentActor(pub Actor);

/// JSON body.
pub struct Body<T>(pub T);

/// Query string.
pub struct Params<T>(pub T);

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The refresh token carried in the `refresh_token` cookie.
pub fn refresh_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == REFRESH_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_owned())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer(&parts.headers)
            .ok_or_else(|| DomainError::Unauthorized("missing bearer token".into()))?;
        match state.services.auth.authenticate(token) {
            Ok(principal) => Ok(Self(principal)),
            Err(err) => {
                tracing::warn!(error = %err, path = %parts.uri.path(), "bearer token rejected");
                Err(err.into())
            }
        }
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let principal = bearer(&parts.headers).and_then(|token| {
            state
                .services
                .auth
                .authenticate(token)
                .inspect_err(|err| tracing::debug!(error = %err, "ignoring bad token on read"))
                .ok()
        });
        Ok(Self(principal))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(principal) = AuthUser::from_request_parts(parts, state).await?;
        if !principal.is_admin() {
            tracing::warn!(user_id = %principal.user_id, path = %parts.uri.path(), "admin route refused");
            return Err(DomainError::Forbidden("admin role required".into()).into());
        }
        Ok(Self(principal))
    }
}

impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(principal) = AuthUser::from_request_parts(parts, state).await?;
        Ok(Self(state.services.auth.actor(&principal).await?))
    }
}

impl<S, T> FromRequest<S> for Body<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl<S, T> FromRequestParts<S> for Params<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_needs_the_scheme_and_a_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer(&headers), Some("abc.def"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer(&headers), None);
    }

    #[test]
    fn refresh_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; refresh_token=r1; lang=zh"));
        assert_eq!(refresh_cookie(&headers).as_deref(), Some("r1"));
        headers.insert(COOKIE, HeaderValue::from_static("refresh_token="));
        assert_eq!(refresh_cookie(&headers), None);
    }
}
