//! Process configuration read from the environment.
//!
//! `DATABASE_URL` is mandatory. `SESSION_SECRET` is mandatory in production
//! and falls back to a development value elsewhere.

use chrono::Duration;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

const DEFAULT_PORT: u16 = 5002;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_STATIC_DIR: &str = "public";
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const DEVELOPMENT_SESSION_SECRET: &str = "development-only-session-secret";

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("{0} is not set")]
    ConfigurationMissing(&'static str),
    #[error("{name} is invalid: {reason}")]
    InvalidConfiguration { name: &'static str, reason: String },
    #[error("Storage connection failed: {0}")]
    ConnectionFailure(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub session_secret: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub static_dir: PathBuf,
    pub session_ttl: Duration,
}

// Hand-written so the secret never reaches the logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("static_dir", &self.static_dir)
            .field("session_ttl_hours", &self.session_ttl.num_hours())
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Reads the process environment. `.env` is loaded by the binary first.
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url =
            read("DATABASE_URL").ok_or(StartupError::ConfigurationMissing("DATABASE_URL"))?;

        let environment = read("APP_ENV")
            .map(|raw| Environment::parse(&raw))
            .unwrap_or(Environment::Development);

        let session_secret = match read("SESSION_SECRET") {
            Some(secret) => secret,
            None if environment.is_production() => {
                return Err(StartupError::ConfigurationMissing("SESSION_SECRET"));
            }
            None => {
                warn!("SESSION_SECRET is not set, using the development secret");
                DEVELOPMENT_SESSION_SECRET.to_string()
            }
        };

        let port = match read("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| StartupError::InvalidConfiguration {
                    name: "PORT",
                    reason: e.to_string(),
                })?,
            None => DEFAULT_PORT,
        };

        let ttl_hours = match read("SESSION_TTL_HOURS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|hours| *hours > 0)
                .ok_or_else(|| StartupError::InvalidConfiguration {
                    name: "SESSION_TTL_HOURS",
                    reason: format!("expected a positive number of hours, got {raw:?}"),
                })?,
            None => DEFAULT_SESSION_TTL_HOURS,
        };

        Ok(Self {
            database_url,
            session_secret,
            host: read("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            environment,
            static_dir: PathBuf::from(
                read("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            ),
            session_ttl: Duration::hours(ttl_hours),
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
