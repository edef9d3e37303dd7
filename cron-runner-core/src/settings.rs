use std::time::Duration;

use secrecy::SecretString;

use crate::duration::parse_duration;
use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 8082;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Unknown names fall back to `info` so a typo never silences the runner.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Everything the runner reads from its environment.
#[derive(Debug)]
pub struct Settings {
    pub backend_url: String,
    pub api_token: SecretString,
    pub port: u16,

    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_factor: f64,

    pub request_timeout: Duration,

    pub poll_initial_interval: Duration,
    pub poll_max_interval: Duration,
    pub poll_max_wait_time: Duration,

    pub shutdown_timeout: Duration,

    pub log_level: LogLevel,
    pub log_json: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend_url = get("BACKEND_URL").ok_or(ConfigError::Missing("BACKEND_URL"))?;
        let api_token = get("PIPELINE_API_TOKEN")
            .map(SecretString::from)
            .ok_or(ConfigError::Missing("PIPELINE_API_TOKEN"))?;

        let settings = Self {
            backend_url: backend_url.trim().trim_end_matches('/').to_string(),
            api_token,
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT, |v| v.parse().ok())?,
            max_retries: parse_or("MAX_RETRIES", get("MAX_RETRIES"), 3, |v| v.parse().ok())?,
            initial_backoff: duration_or(
                "INITIAL_BACKOFF",
                get("INITIAL_BACKOFF"),
                Duration::from_secs(2),
            )?,
            max_backoff: duration_or("MAX_BACKOFF", get("MAX_BACKOFF"), Duration::from_secs(30))?,
            backoff_factor: parse_or("BACKOFF_FACTOR", get("BACKOFF_FACTOR"), 2.0, |v| {
                v.parse().ok()
            })?,
            request_timeout: duration_or(
                "REQUEST_TIMEOUT",
                get("REQUEST_TIMEOUT"),
                Duration::from_secs(180),
            )?,
            poll_initial_interval: duration_or(
                "POLL_INITIAL_INTERVAL",
                get("POLL_INITIAL_INTERVAL"),
                Duration::from_secs(5),
            )?,
            poll_max_interval: duration_or(
                "POLL_MAX_INTERVAL",
                get("POLL_MAX_INTERVAL"),
                Duration::from_secs(30),
            )?,
            poll_max_wait_time: duration_or(
                "POLL_MAX_WAIT_TIME",
                get("POLL_MAX_WAIT_TIME"),
                Duration::from_secs(3600),
            )?,
            shutdown_timeout: duration_or(
                "SHUTDOWN_TIMEOUT",
                get("SHUTDOWN_TIMEOUT"),
                Duration::from_secs(10),
            )?,
            log_level: get("LOG_LEVEL")
                .map(|v| LogLevel::parse_lenient(&v))
                .unwrap_or_default(),
            log_json: parse_or("LOG_JSON", get("LOG_JSON"), true, parse_bool)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.backend_url)
            .map_err(|e| ConfigError::invalid("BACKEND_URL", e.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::invalid(
                "BACKEND_URL",
                format!("unsupported scheme {:?}", url.scheme()),
            ));
        }

        if self.initial_backoff.is_zero() {
            return Err(ConfigError::invalid("INITIAL_BACKOFF", "must be greater than 0"));
        }
        if self.max_backoff < self.initial_backoff {
            return Err(ConfigError::invalid(
                "MAX_BACKOFF",
                "must be greater than or equal to INITIAL_BACKOFF",
            ));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 1.0 {
            return Err(ConfigError::invalid("BACKOFF_FACTOR", "must be a number >= 1"));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::invalid("REQUEST_TIMEOUT", "must be greater than 0"));
        }
        if self.poll_initial_interval.is_zero() {
            return Err(ConfigError::invalid(
                "POLL_INITIAL_INTERVAL",
                "must be greater than 0",
            ));
        }
        if self.poll_max_interval < self.poll_initial_interval {
            return Err(ConfigError::invalid(
                "POLL_MAX_INTERVAL",
                "must be greater than or equal to POLL_INITIAL_INTERVAL",
            ));
        }
        if self.poll_max_wait_time.is_zero() {
            return Err(ConfigError::invalid("POLL_MAX_WAIT_TIME", "must be greater than 0"));
        }
        Ok(())
    }
}

fn parse_or<T>(
    var: &'static str,
    raw: Option<String>,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => parse(v.trim()).ok_or_else(|| ConfigError::invalid(var, format!("{v:?}"))),
    }
}

fn duration_or(
    var: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => parse_duration(&v).map_err(|e| ConfigError::invalid(var, e.to_string())),
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
