//! configs/src/lib.rs
//!
//! Layered application configuration. Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. `config/default.{toml,json,yaml}` (optional)
//! 3. `config/{APP_ENV}.{toml,json,yaml}` (optional, `APP_ENV` defaults to `development`)
//! 4. environment variables `DENUNCIAS__SECTION__KEY`, after loading `.env`
//!
//! Secrets are wrapped in [`SecretString`] so they never reach a log line.

use std::path::Path;

use config::{Config, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const ENV_PREFIX: &str = "DENUNCIAS";
pub const DEFAULT_PROJECT_ID: &str = "proyectou-c9e45";
const MIN_JWT_SECRET_BYTES: usize = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The illustrative `/api/denuncias` service on its own port.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyConfig {
    pub enabled: bool,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    #[serde(default)]
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityMode {
    Demo,
    Credentials,
}

#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    pub identity: IdentityMode,
    pub jwt_secret: SecretString,
    pub token_ttl_hours: i64,
}

/// Hosted-backend project identifiers. Only `api_key` is secret.
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    pub project_id: String,
    #[serde(default)]
    pub api_key: Option<SecretString>,
    #[serde(default)]
    pub auth_domain: Option<String>,
    #[serde(default)]
    pub storage_bucket: Option<String>,
    #[serde(default)]
    pub messaging_sender_id: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
}

impl BackendConfig {
    pub fn auth_domain(&self) -> String {
        self.auth_domain
            .clone()
            .unwrap_or_else(|| format!("{}.firebaseapp.com", self.project_id))
    }

    pub fn storage_bucket(&self) -> String {
        self.storage_bucket
            .clone()
            .unwrap_or_else(|| format!("{}.appspot.com", self.project_id))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub legacy: LegacyConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
    pub seed_demo: bool,
}

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

fn defaults() -> std::result::Result<Builder, config::ConfigError> {
    Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("legacy.enabled", true)?
        .set_default("legacy.port", 4000)?
        .set_default("database.backend", "memory")?
        .set_default("database.max_connections", 5)?
        .set_default("auth.identity", "demo")?
        .set_default("auth.jwt_secret", "denuncias-development-secret")?
        .set_default("auth.token_ttl_hours", 24)?
        .set_default("backend.project_id", DEFAULT_PROJECT_ID)?
        .set_default("logging.format", "pretty")?
        .set_default("logging.level", "info")?
        .set_default("seed_demo", true)
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

impl AppConfig {
    /// Loads `.env`, then every layer from `./config`, then validates.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), ".env loaded");
        }
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        Self::build(Path::new("config"), &app_env, Some(environment()))
    }

    /// File and default layers only; no environment lookup.
    pub fn load_from(dir: &Path, app_env: &str) -> Result<Self> {
        Self::build(dir, app_env, None)
    }

    fn build(dir: &Path, app_env: &str, env: Option<Environment>) -> Result<Self> {
        let base = dir.join("default");
        let layered = dir.join(app_env);
        let mut builder = defaults()?
            .add_source(File::with_name(&base.to_string_lossy()).required(false))
            .add_source(File::with_name(&layered.to_string_lossy()).required(false));
        if let Some(env) = env {
            builder = builder.add_source(env);
        }

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.server.port == 0 {
            problems.push("server.port must be non-zero".to_string());
        }
        if self.legacy.enabled {
            if self.legacy.port == 0 {
                problems.push("legacy.port must be non-zero".to_string());
            } else if self.legacy.port == self.server.port {
                problems.push("legacy.port must differ from server.port".to_string());
            }
        }
        if self.database.backend == DatabaseBackend::Postgres
            && self.database.url.as_deref().map_or(true, str::is_empty)
        {
            problems.push("database.url is required for the postgres backend".to_string());
        }
        if self.database.max_connections == 0 {
            problems.push("database.max_connections must be positive".to_string());
        }
        if self.auth.identity != IdentityMode::Demo
            && self.auth.jwt_secret.expose_secret().len() < MIN_JWT_SECRET_BYTES
        {
            problems.push(format!(
                "auth.jwt_secret must be at least {MIN_JWT_SECRET_BYTES} bytes"
            ));
        }
        if self.auth.token_ttl_hours <= 0 {
            problems.push("auth.token_ttl_hours must be positive".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_valid() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(dir.path(), "test").unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.legacy.port, 4000);
        assert_eq!(config.database.backend, DatabaseBackend::Memory);
        assert_eq!(config.auth.identity, IdentityMode::Demo);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.seed_demo);
        assert_eq!(config.backend.project_id, DEFAULT_PROJECT_ID);
        assert_eq!(config.backend.auth_domain(), "proyectou-c9e45.firebaseapp.com");
        assert_eq!(config.backend.storage_bucket(), "proyectou-c9e45.appspot.com");
        assert!(!config.backend.has_api_key());
    }

    #[test]
    fn environment_file_overrides_default_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[server]\nport = 9000\n[logging]\nformat = \"json\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("production.toml"), "[server]\nport = 9100\n").unwrap();

        let config = AppConfig::load_from(dir.path(), "production").unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.server.bind_address(), "0.0.0.0:9100");
    }

    #[test]
    fn postgres_requires_url() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[database]\nbackend = \"postgres\"\n").unwrap();

        match AppConfig::load_from(dir.path(), "test") {
            Err(ConfigError::Invalid(problems)) => {
                assert!(problems[0].contains("database.url"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn credentials_mode_needs_a_real_secret() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[auth]\nidentity = \"credentials\"\njwt_secret = \"short\"\n",
        )
        .unwrap();
        assert!(matches!(
            AppConfig::load_from(dir.path(), "test"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn ports_must_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[legacy]\nport = 8080\n").unwrap();
        assert!(AppConfig::load_from(dir.path(), "test").is_err());
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(dir.path(), "test").unwrap();
        let rendered = format!("{:?}", config.auth);
        assert!(!rendered.contains("denuncias-development-secret"));
    }
}
