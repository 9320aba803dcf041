//! Database configuration.
//!
//! Loaded either from the environment (a `.env` file is honoured via `dotenvy`)
//! or from a TOML file with a `[database]` table:
//!
//! ```toml
//! [database]
//! url = "postgres://${DB_USER}@localhost/jobly"
//! pool_max_size = 8
//! slow_query_threshold_ms = 250
//! ```
//!
//! `${VAR}` references inside `url` are expanded from the environment.

use crate::error::{JoblyError, JoblyResult};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the connection URL.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Environment variable overriding [`DatabaseConfig::pool_max_size`].
pub const POOL_MAX_SIZE_ENV: &str = "JOBLY_POOL_MAX_SIZE";
/// Environment variable overriding [`DatabaseConfig::pool_wait_timeout_ms`].
pub const POOL_WAIT_TIMEOUT_ENV: &str = "JOBLY_POOL_WAIT_TIMEOUT_MS";
/// Environment variable overriding [`DatabaseConfig::slow_query_threshold_ms`].
pub const SLOW_QUERY_ENV: &str = "JOBLY_SLOW_QUERY_MS";

const DEFAULT_POOL_MAX_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: usize,
    /// How long a caller waits for a pooled connection. `None` waits forever.
    #[serde(default)]
    pub pool_wait_timeout_ms: Option<u64>,
    /// Statements slower than this are logged at WARN.
    #[serde(default)]
    pub slow_query_threshold_ms: Option<u64>,
}

fn default_pool_max_size() -> usize {
    DEFAULT_POOL_MAX_SIZE
}

#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    database: DatabaseConfig,
}

impl DatabaseConfig {
    /// Config with defaults for everything but the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            pool_wait_timeout_ms: None,
            slow_query_threshold_ms: None,
        }
    }

    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> JoblyResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (used by [`DatabaseConfig::from_env`]).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<Self> {
        let url = lookup(DATABASE_URL_ENV)
            .ok_or_else(|| JoblyError::config(format!("{DATABASE_URL_ENV} is not set")))?;

        let mut config = Self::new(url);
        if let Some(raw) = lookup(POOL_MAX_SIZE_ENV) {
            config.pool_max_size = parse_number(POOL_MAX_SIZE_ENV, &raw)?;
        }
        if let Some(raw) = lookup(POOL_WAIT_TIMEOUT_ENV) {
            config.pool_wait_timeout_ms = Some(parse_number(POOL_WAIT_TIMEOUT_ENV, &raw)?);
        }
        if let Some(raw) = lookup(SLOW_QUERY_ENV) {
            config.slow_query_threshold_ms = Some(parse_number(SLOW_QUERY_ENV, &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load the `[database]` table of a TOML file.
    pub fn load(path: impl AsRef<Path>) -> JoblyResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            JoblyError::config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse the `[database]` table from TOML text.
    pub fn from_toml_str(raw: &str) -> JoblyResult<Self> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| JoblyError::config(format!("failed to parse config: {e}")))?;

        let mut config = file.database;
        config.url = expand_env_vars(&config.url, |key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn pool_wait_timeout(&self) -> Option<Duration> {
        self.pool_wait_timeout_ms.map(Duration::from_millis)
    }

    pub fn slow_query_threshold(&self) -> Option<Duration> {
        self.slow_query_threshold_ms.map(Duration::from_millis)
    }

    fn validate(&self) -> JoblyResult<()> {
        if self.url.trim().is_empty() {
            return Err(JoblyError::config("database.url must not be empty"));
        }
        if self.pool_max_size == 0 {
            return Err(JoblyError::config("database.pool_max_size must be at least 1"));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> JoblyResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| JoblyError::config(format!("{key} must be a non-negative integer, got '{raw}'")))
}

fn expand_env_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            while let Some(&ch) = chars.peek() {
                chars.next();
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(JoblyError::config(format!(
                    "unterminated env var reference: ${{{key}}}"
                )));
            }
            if key.is_empty() {
                return Err(JoblyError::config("invalid env var reference: ${}"));
            }

            let v = lookup(&key).ok_or_else(|| {
                JoblyError::config(format!("missing env var for config expansion: {key}"))
            })?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
