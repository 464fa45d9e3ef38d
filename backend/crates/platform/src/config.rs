//! Environment Configuration Helpers
//!
//! Typed access to configuration variables. The lookup is injected so
//! parsing can be tested without touching the process environment.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    pub fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Reads configuration values through a lookup function
pub struct EnvReader<F> {
    lookup: F,
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

impl EnvReader<fn(&str) -> Option<String>> {
    /// Reader over the process environment
    pub fn from_process_env() -> Self {
        Self::new(process_env)
    }
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }

    /// Trimmed value; blank counts as unset
    pub fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    pub fn string_or(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse with `FromStr`, falling back to `default` when unset
    pub fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .parse()
                .map_err(|e: T::Err| ConfigError::invalid(key, e.to_string())),
            None => Ok(default),
        }
    }

    /// Accepts `true/false`, `1/0`, `yes/no`, `on/off`
    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.optional(key) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::invalid(key, "expected a boolean")),
            None => Ok(default),
        }
    }

    /// Parse with [`parse_duration`], falling back to `default` when unset
    pub fn duration_or(&self, key: &str, default: Duration) -> Result<Duration, ConfigError> {
        match self.optional(key) {
            Some(raw) => parse_duration(&raw).map_err(|reason| ConfigError::invalid(key, reason)),
            None => Ok(default),
        }
    }

    /// Comma separated list, blanks dropped
    pub fn list_or(&self, key: &str, default: &str) -> Vec<String> {
        self.string_or(key, default)
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a positive duration
///
/// Accepted forms: bare seconds (`3600`) or a number with a unit suffix
/// `s`, `m`, `h`, `d` (`30s`, `15m`, `1h`, `7d`).
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let (digits, multiplier) = match raw.char_indices().last() {
        Some((idx, 's')) => (&raw[..idx], 1),
        Some((idx, 'm')) => (&raw[..idx], 60),
        Some((idx, 'h')) => (&raw[..idx], 60 * 60),
        Some((idx, 'd')) => (&raw[..idx], 24 * 60 * 60),
        Some(_) => (raw, 1),
        None => return Err("empty duration".to_string()),
    };

    let value: u64 = digits
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a duration (use 3600, 30s, 15m, 1h or 7d)"))?;

    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    value
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("'{raw}' is too large"))
}
