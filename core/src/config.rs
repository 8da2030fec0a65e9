//! Client configuration, read from the environment.

use std::time::Duration;

use chrono::Weekday;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// Applied to connect and response together.
    pub timeout: Duration,
    /// First day of the agenda week.
    pub week_starts_on: Weekday,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            week_starts_on: Weekday::Sun,
        }
    }
}

impl ClientConfig {
    /// Reads `ODONTO_API_URL`, `ODONTO_API_TIMEOUT_MS` and
    /// `ODONTO_WEEK_START`. A `.env` file is honored outside of tests.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, with variables resolved by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_base_url = match value("ODONTO_API_URL") {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                url.trim().trim_end_matches('/').to_string()
            }
            Some(url) => {
                return Err(ConfigError::InvalidValue(
                    "ODONTO_API_URL".to_string(),
                    format!("'{url}' is not an http(s) URL"),
                ))
            }
            None => defaults.api_base_url,
        };

        let timeout = match value("ODONTO_API_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "ODONTO_API_TIMEOUT_MS".to_string(),
                        format!("'{raw}' is not a positive number of milliseconds"),
                    )
                })?,
            None => defaults.timeout,
        };

        let week_starts_on = match value("ODONTO_WEEK_START") {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "sunday" | "sun" => Weekday::Sun,
                "monday" | "mon" => Weekday::Mon,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "ODONTO_WEEK_START".to_string(),
                        format!("'{raw}' must be sunday or monday"),
                    ))
                }
            },
            None => defaults.week_starts_on,
        };

        Ok(Self {
            api_base_url,
            timeout,
            week_starts_on,
        })
    }
}
