mod common;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{TestApp, ADMIN, ADMIN_PASSWORD};
use serde_json::json;

fn refresh_with_cookie(cookie: &str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri("/api/auth/refresh")
        .header(header::COOKIE, cookie)
        .body(Body::empty())?)
}

/// `refresh_token=abc; Path=...` -> `refresh_token=abc`
fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap_or_default().to_owned()
}

#[tokio::test]
async fn login_sets_refresh_cookie_that_refresh_accepts() -> Result<()> {
    let app = TestApp::spawn().await?;
    let reply = app.login(ADMIN, ADMIN_PASSWORD).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["code"], 200);
    assert_eq!(reply.data()["userInfo"]["username"], ADMIN);
    assert!(reply.data()["userInfo"].get("passwordHash").is_none());

    let set_cookie = reply.cookie().context("login sets a cookie")?;
    assert!(set_cookie.contains("HttpOnly"));
    let pair = cookie_pair(&set_cookie);
    assert_eq!(
        pair,
        format!("refresh_token={}", reply.data()["refreshToken"].as_str().unwrap_or_default())
    );

    let refreshed = app.call(refresh_with_cookie(&pair)?).await?;
    assert_eq!(refreshed.status, StatusCode::OK);
    assert_eq!(refreshed.body["status"], 200);
    let access = refreshed.body["data"].as_str().context("bare access token")?;
    let me = app.get("/api/user/info", Some(access)).await?;
    assert_eq!(me.data()["username"], ADMIN);
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    let app = TestApp::spawn().await?;
    let reply = app.login(ADMIN, "not-the-password").await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["code"], 401);
    assert!(reply.data().is_null());
    assert!(reply.cookie().is_none());
    Ok(())
}

#[tokio::test]
async fn access_codes_follow_the_role() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin_token().await?;
    let member = app.member_token("grace").await?;

    let codes = app.get("/api/auth/codes", Some(&admin)).await?;
    assert_eq!(codes.data(), &json!(["AC_100010", "AC_100020", "AC_100030"]));
    let codes = app.get("/api/auth/codes", Some(&member)).await?;
    assert_eq!(codes.data(), &json!(["AC_1000001", "AC_1000002"]));

    let anonymous = app.get("/api/auth/codes", None).await?;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn duplicate_username_conflicts() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.member_token("grace").await?;
    let again = app
        .post(
            "/api/auth/register",
            None,
            json!({ "username": "grace", "password": "another-password" }),
        )
        .await?;
    assert_eq!(again.status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie_and_kills_the_session() -> Result<()> {
    let app = TestApp::spawn().await?;
    let login = app.login(ADMIN, ADMIN_PASSWORD).await?;
    let pair = cookie_pair(&login.cookie().context("login sets a cookie")?);

    let logout = app
        .call(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(header::COOKIE, &pair)
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(logout.status, StatusCode::OK);
    let cleared = logout.cookie().context("logout resets the cookie")?;
    assert!(cleared.starts_with("refresh_token=;"));
    assert!(cleared.contains("Max-Age=0"));

    let refreshed = app.call(refresh_with_cookie(&pair)?).await?;
    assert_eq!(refreshed.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn refresh_without_any_token_is_unauthorized() -> Result<()> {
    let app = TestApp::spawn().await?;
    let reply = app.send("POST", "/api/auth/refresh", None, None).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn members_cannot_manage_categories() -> Result<()> {
    let app = TestApp::spawn().await?;
    let member = app.member_token("grace").await?;
    let reply = app
        .post("/api/market/category", Some(&member), json!({ "name": "新分类" }))
        .await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let admin = app.admin_token().await?;
    let reply = app
        .post("/api/market/category", Some(&admin), json!({ "name": "新分类" }))
        .await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.data()["name"], "新分类");
    Ok(())
}

#[tokio::test]
async fn garbage_bearer_token_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;
    let reply = app.get("/api/user/info", Some("not.a.jwt")).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn malformed_json_gets_an_envelope() -> Result<()> {
    let app = TestApp::spawn().await?;
    let reply = app
        .call(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"username":"#))?,
        )
        .await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["code"], 400);
    assert!(reply.data().is_null());
    Ok(())
}

#[tokio::test]
async fn health_and_metrics_are_public() -> Result<()> {
    let app = TestApp::spawn().await?;
    let health = app.get("/health", None).await?;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body, json!("OK"));

    app.get("/api/collision/hot-tags", None).await?;
    let metrics = app.get("/metrics", None).await?;
    assert_eq!(metrics.status, StatusCode::OK);
    let text = metrics.body.as_str().context("metrics are plain text")?;
    assert!(text.contains("thinking_models_http_requests_total"));
    assert!(text.contains("hot-tags"));
    Ok(())
}
