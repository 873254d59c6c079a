use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds
    pub access_token_ttl: usize,

    /// MySQL connection string; in-memory stores are used when absent
    pub database_url: Option<String>,

    // Bootstrap admin
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub admin_full_name: String,

    /// Answer errors with 4xx/5xx instead of the legacy `200 {"error": ..}`
    pub strict_status_codes: bool,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

impl Config {
    /// Reads the process environment; `main` loads `.env` beforehand.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: parse_or("ACCESS_TOKEN_TTL", 86_400)?, // default 24h
            database_url: non_empty("DATABASE_URL"),

            admin_email: non_empty("ADMIN_EMAIL"),
            admin_password: non_empty("ADMIN_PASSWORD"),
            admin_full_name: env::var("ADMIN_FULL_NAME")
                .unwrap_or_else(|_| "Administrator".to_string()),

            strict_status_codes: parse_or("STRICT_STATUS_CODES", false)?,

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: parse_or("LOG_LEVEL", tracing::Level::DEBUG)?,
        })
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has an invalid value {raw:?}: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by the HTTP tests
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            jwt_secret: "test-secret".to_string(),
            access_token_ttl: 86_400,
            database_url: None,
            admin_email: None,
            admin_password: None,
            admin_full_name: "Administrator".to_string(),
            strict_status_codes: false,
            log_dir: "logs".to_string(),
            log_level: tracing::Level::DEBUG,
        }
    }
}
