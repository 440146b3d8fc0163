//! # Thinking Models Binary
//!
//! The entry point that assembles the application based on compile-time features
//! and the layered configuration in `./config`.

#[cfg(not(all(feature = "web-axum", feature = "auth-jwt")))]
compile_error!("thinking-models needs the `web-axum` and `auth-jwt` features");

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use api_adapters::{router, AppState, CookiePolicy, Metrics};
use auth_adapters::{Argon2Hasher, JwtIssuer};
use configs::{LogFormat, LogSettings, Settings};
use secrecy::ExposeSecret;
use services::{AuthPorts, ServiceOptions, Services};
use storage_adapters::{MemoryBackend, MemorySessionStore};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "fixtures")]
use storage_adapters::fixtures::DEMO_OWNER_ID as ADMIN_ID;
#[cfg(not(feature = "fixtures"))]
const ADMIN_ID: &str = "1";

const SESSION_SWEEP_EVERY: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(&settings.log);

    // 1. Storage
    let backend = storage(settings.storage.seed_fixtures);

    // 2. Credentials
    let tokens = JwtIssuer::new(
        settings.auth.jwt_secret.expose_secret().as_bytes(),
        settings.auth.issuer.clone(),
        Duration::from_secs(settings.auth.access_ttl_secs),
    )?;
    let refresh_ttl = chrono::Duration::seconds(
        i64::try_from(settings.auth.refresh_ttl_secs).context("auth.refresh_ttl_secs is too large")?,
    );
    let sessions = Arc::new(MemorySessionStore::new(refresh_ttl));
    spawn_session_sweeper(sessions.clone());

    // 3. Services
    let services = Services::new(
        backend.repositories(),
        AuthPorts {
            hasher: Arc::new(Argon2Hasher::new()),
            tokens: Arc::new(tokens),
            sessions,
        },
        ServiceOptions {
            max_page_size: settings.pagination.max_page_size,
        },
    );

    let admin_password = settings.auth.admin_password.expose_secret();
    if admin_password.is_empty() {
        tracing::warn!("auth.admin_password is empty; no admin account was created");
    } else {
        services
            .auth
            .bootstrap_admin(
                ADMIN_ID,
                &settings.auth.admin_username,
                admin_password,
            )
            .await
            .context("creating the admin account")?;
    }

    // 4. HTTP
    let state = AppState {
        services,
        metrics: Arc::new(Metrics::new()),
        cookie: CookiePolicy {
            secure: settings.auth.cookie_secure,
            max_age_secs: settings.auth.refresh_ttl_secs,
        },
    };
    let app = router(state, &settings.server.cors_origins);

    let addr = settings.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "thinking-models listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[cfg(feature = "fixtures")]
fn storage(seed: bool) -> MemoryBackend {
    if seed {
        MemoryBackend::with_fixtures(chrono::Utc::now())
    } else {
        MemoryBackend::new()
    }
}

#[cfg(not(feature = "fixtures"))]
fn storage(seed: bool) -> MemoryBackend {
    if seed {
        tracing::warn!("storage.seed_fixtures is on but the binary was built without fixtures");
    }
    MemoryBackend::new()
}

fn spawn_session_sweeper(sessions: Arc<MemorySessionStore>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_EVERY);
        loop {
            ticker.tick().await;
            let purged = sessions.purge_expired(chrono::Utc::now());
            if purged > 0 {
                tracing::debug!(purged, "expired refresh sessions dropped");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
