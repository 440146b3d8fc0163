//! Shared harness: the real router over seeded in-memory storage, with a
//! plain-text password hasher so logins stay fast.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use api_adapters::{router, AppState, CookiePolicy, Metrics};
use auth_adapters::JwtIssuer;
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use domains::ports::MockPasswordHasher;
use serde_json::{json, Value};
use services::{AuthPorts, ServiceOptions, Services};
use storage_adapters::fixtures::DEMO_OWNER_ID;
use storage_adapters::{MemoryBackend, MemorySessionStore};
use tower::ServiceExt;

pub const ADMIN: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const MAX_PAGE_SIZE: u32 = 100;
const SECRET: &[u8] = b"integration-secret-0123456789abcdef";

pub struct TestApp {
    pub router: Router,
    pub backend: MemoryBackend,
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Reply {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// `id` of every row in a `{list, ...}` page.
    pub fn ids(&self) -> Vec<String> {
        self.data()["list"]
            .as_array()
            .map(|rows| {
                rows.iter()
                    .filter_map(|r| r["id"].as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)?
            .to_str()
            .ok()
            .map(str::to_owned)
    }
}

fn plain_hasher() -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|password| Ok(format!("plain:{password}")));
    hasher
        .expect_verify()
        .returning(|password, hash| Ok(hash == format!("plain:{password}")));
    hasher
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let backend = MemoryBackend::with_fixtures(Utc::now());
        let tokens = JwtIssuer::new(SECRET, "thinking-models-test", Duration::from_secs(900))?;
        let services = Services::new(
            backend.repositories(),
            AuthPorts {
                hasher: Arc::new(plain_hasher()),
                tokens: Arc::new(tokens),
                sessions: Arc::new(MemorySessionStore::new(chrono::Duration::days(7))),
            },
            ServiceOptions {
                max_page_size: MAX_PAGE_SIZE,
            },
        );
        services
            .auth
            .bootstrap_admin(DEMO_OWNER_ID, ADMIN, ADMIN_PASSWORD)
            .await?;
        let state = AppState {
            services,
            metrics: Arc::new(Metrics::new()),
            cookie: CookiePolicy {
                secure: false,
                max_age_secs: 7 * 24 * 60 * 60,
            },
        };
        Ok(Self {
            router: router(state, &[]),
            backend,
        })
    }

    pub async fn call(&self, req: Request<Body>) -> Result<Reply> {
        let resp = self.router.clone().oneshot(req).await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok(Reply { status, headers, body })
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<Reply> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };
        self.call(req).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<Reply> {
        self.send("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<Reply> {
        self.send("POST", uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Result<Reply> {
        self.send("PUT", uri, token, Some(body)).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Reply> {
        self.post(
            "/api/auth/login",
            None,
            json!({ "username": username, "password": password }),
        )
        .await
    }

    pub async fn token_for(&self, username: &str, password: &str) -> Result<String> {
        let reply = self.login(username, password).await?;
        ensure!(reply.status == StatusCode::OK, "login failed: {}", reply.body);
        Ok(reply.data()["accessToken"]
            .as_str()
            .context("login reply has no accessToken")?
            .to_owned())
    }

    pub async fn admin_token(&self) -> Result<String> {
        self.token_for(ADMIN, ADMIN_PASSWORD).await
    }

    /// Registers a fresh member and signs them in.
    pub async fn member_token(&self, username: &str) -> Result<String> {
        let reply = self
            .post(
                "/api/auth/register",
                None,
                json!({ "username": username, "password": "member-password" }),
            )
            .await?;
        ensure!(reply.status == StatusCode::OK, "register failed: {}", reply.body);
        self.token_for(username, "member-password").await
    }
}
