//! # configs
//!
//! Layered runtime settings. Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. `config/default.toml`
//! 3. `config/{APP_ENV}.toml`
//! 4. `APP__SECTION__KEY` environment variables (after `.env` is loaded)
//!
//! Both files are optional.

use config::{Config, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "APP";
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub pagination: PaginationSettings,
    pub storage: StorageSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5320,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    pub issuer: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
    /// Sets `Secure` on the refresh cookie. Off for plain-HTTP development.
    pub cookie_secure: bool,
    pub admin_username: String,
    /// Leave empty to skip creating the admin account.
    pub admin_password: SecretString,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::from(""),
            issuer: "thinking-models".into(),
            access_ttl_secs: 2 * 60 * 60,
            refresh_ttl_secs: 7 * 24 * 60 * 60,
            cookie_secure: false,
            admin_username: "admin".into(),
            admin_password: SecretString::from(""),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    pub max_page_size: u32,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self { max_page_size: 100 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub seed_fixtures: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            seed_fixtures: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// An `EnvFilter` directive such as `info` or `api_adapters=debug,info`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

impl Settings {
    /// Loads `.env`, then every layer from `./config` for the current
    /// `APP_ENV` (default `development`).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        Self::load_from("config", &env, Self::environment())
    }

    /// Loads from an explicit directory and environment-variable source.
    pub fn load_from(dir: &str, env: &str, vars: Environment) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::with_name(&format!("{dir}/default")).required(false))
            .add_source(File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(vars)
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// `APP__AUTH__JWT_SECRET` maps to `auth.jwt_secret`.
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("server.cors_origins")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.expose_secret().len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "auth.jwt_secret must be at least {MIN_JWT_SECRET_LEN} bytes"
            )));
        }
        if self.auth.access_ttl_secs == 0 || self.auth.refresh_ttl_secs == 0 {
            return Err(ConfigError::Invalid("auth token lifetimes must be positive".into()));
        }
        if self.pagination.max_page_size == 0 {
            return Err(ConfigError::Invalid("pagination.max_page_size must be positive".into()));
        }
        Ok(())
    }
}
