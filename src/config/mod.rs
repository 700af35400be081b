//! Configuration handling for the application.
//!
//! Everything is read from environment variables with development defaults.
//! `Config::from_env` parses and validates the numeric settings so a bad
//! deployment fails at startup instead of on the first request.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Environment variable names. Public so tests and binaries can refer to them.
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_GENERATION_TIMEOUT_SECS: &str = "GENERATION_TIMEOUT_SECS";
pub const ENV_RETRY_MAX_ATTEMPTS: &str = "RETRY_MAX_ATTEMPTS";
pub const ENV_RETRY_BASE_DELAY_MS: &str = "RETRY_BASE_DELAY_MS";
pub const ENV_RATE_LIMIT_MAX_REQUESTS: &str = "RATE_LIMIT_MAX_REQUESTS";
pub const ENV_RATE_LIMIT_WINDOW_SECS: &str = "RATE_LIMIT_WINDOW_SECS";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 1;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 30;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: i64 = 60;

/// Upper bound on attempts per backend call.
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    bind_addr: String,
    gemini_api_key: String,
    gemini_base_url: String,
    gemini_model: String,
    fetch_timeout: Duration,
    generation_timeout: Duration,
    retry_max_attempts: u32,
    retry_base_delay: Duration,
    rate_limit_max_requests: u32,
    rate_limit_window_secs: i64,
    log_format: LogFormat,
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let fetch_timeout_secs = parse_var(ENV_FETCH_TIMEOUT_SECS, DEFAULT_FETCH_TIMEOUT_SECS)?;
        if fetch_timeout_secs == 0 {
            return Err(ConfigError::invalid(ENV_FETCH_TIMEOUT_SECS, "must be positive"));
        }
        let generation_timeout_secs =
            parse_var(ENV_GENERATION_TIMEOUT_SECS, DEFAULT_GENERATION_TIMEOUT_SECS)?;
        if generation_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                ENV_GENERATION_TIMEOUT_SECS,
                "must be positive",
            ));
        }

        let retry_max_attempts = parse_var(ENV_RETRY_MAX_ATTEMPTS, DEFAULT_RETRY_MAX_ATTEMPTS)?;
        if !(1..=MAX_RETRY_ATTEMPTS).contains(&retry_max_attempts) {
            return Err(ConfigError::invalid(
                ENV_RETRY_MAX_ATTEMPTS,
                format!("must be between 1 and {MAX_RETRY_ATTEMPTS}"),
            ));
        }

        let rate_limit_window_secs =
            parse_var(ENV_RATE_LIMIT_WINDOW_SECS, DEFAULT_RATE_LIMIT_WINDOW_SECS)?;
        if rate_limit_window_secs <= 0 {
            return Err(ConfigError::invalid(
                ENV_RATE_LIMIT_WINDOW_SECS,
                "must be positive",
            ));
        }

        let log_format = match env::var(ENV_LOG_FORMAT).ok().as_deref() {
            None | Some("") | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::invalid(
                    ENV_LOG_FORMAT,
                    format!("unknown format '{other}', expected 'pretty' or 'json'"),
                ));
            }
        };

        Ok(Self {
            bind_addr: env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            gemini_api_key: env::var(ENV_GEMINI_API_KEY).unwrap_or_default(),
            gemini_base_url: env::var(ENV_GEMINI_BASE_URL)
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            gemini_model: env::var(ENV_GEMINI_MODEL)
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            generation_timeout: Duration::from_secs(generation_timeout_secs),
            retry_max_attempts,
            retry_base_delay: Duration::from_millis(parse_var(
                ENV_RETRY_BASE_DELAY_MS,
                DEFAULT_RETRY_BASE_DELAY_MS,
            )?),
            rate_limit_max_requests: parse_var(
                ENV_RATE_LIMIT_MAX_REQUESTS,
                DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            )?,
            rate_limit_window_secs,
            log_format,
        })
    }

    /// Fails unless a backend API key is present. The binaries call this;
    /// tests that point the backend at a mock server do not need a key.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        if self.gemini_api_key.trim().is_empty() {
            return Err(ConfigError::invalid(ENV_GEMINI_API_KEY, "must be set"));
        }
        Ok(&self.gemini_api_key)
    }

    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    pub fn gemini_api_key(&self) -> &str {
        &self.gemini_api_key
    }
    pub fn gemini_base_url(&self) -> &str {
        &self.gemini_base_url
    }
    pub fn gemini_model(&self) -> &str {
        &self.gemini_model
    }
    /// Timeout applied to the article page request.
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
    /// Timeout applied to each generative backend call.
    pub fn generation_timeout(&self) -> Duration {
        self.generation_timeout
    }
    /// Total attempts per backend call, 1 meaning no retry.
    pub fn retry_max_attempts(&self) -> u32 {
        self.retry_max_attempts
    }
    pub fn retry_base_delay(&self) -> Duration {
        self.retry_base_delay
    }
    pub fn rate_limit_max_requests(&self) -> u32 {
        self.rate_limit_max_requests
    }
    pub fn rate_limit_window_secs(&self) -> i64 {
        self.rate_limit_window_secs
    }
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

fn parse_var<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(key, e.to_string())),
        _ => Ok(default),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
