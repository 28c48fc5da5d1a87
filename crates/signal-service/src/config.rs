//! Signaling orchestrator configuration.
//!
//! Loaded from environment variables; `from_vars` exists so tests can
//! construct configs without touching the process environment.

use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default HTTP/WebSocket bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default base URL of the media-engine control API.
pub const DEFAULT_MEDIA_API_URL: &str = "http://localhost:8081";

/// Default timeout for media control API calls, in seconds.
pub const DEFAULT_MEDIA_API_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid media API timeout: {0}")]
    InvalidMediaApiTimeout(String),
}

/// Signaling orchestrator configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP/WebSocket bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Base URL of the media-engine control API.
    pub media_api_url: String,

    /// Timeout for media control API calls, in seconds.
    pub media_api_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("SIGNAL_BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let media_api_url = vars
            .get("MEDIA_API_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_MEDIA_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let media_api_timeout_seconds =
            if let Some(value_str) = vars.get("MEDIA_API_TIMEOUT_SECONDS") {
                let value: u64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidMediaApiTimeout(format!(
                        "MEDIA_API_TIMEOUT_SECONDS must be a valid positive integer, got '{}': {}",
                        value_str, e
                    ))
                })?;

                if value == 0 {
                    return Err(ConfigError::InvalidMediaApiTimeout(
                        "MEDIA_API_TIMEOUT_SECONDS must be greater than 0".to_string(),
                    ));
                }

                value
            } else {
                DEFAULT_MEDIA_API_TIMEOUT_SECONDS
            };

        Ok(Config {
            bind_address,
            media_api_url,
            media_api_timeout_seconds,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars_defaults() {
        let config = Config::from_vars(&HashMap::new()).expect("Config should load");

        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.media_api_url, DEFAULT_MEDIA_API_URL);
        assert_eq!(
            config.media_api_timeout_seconds,
            DEFAULT_MEDIA_API_TIMEOUT_SECONDS
        );
    }

    #[test]
    fn test_media_api_url_trailing_slash_stripped() {
        let vars = HashMap::from([(
            "MEDIA_API_URL".to_string(),
            "http://media:8081/".to_string(),
        )]);

        let config = Config::from_vars(&vars).expect("Config should load");
        assert_eq!(config.media_api_url, "http://media:8081");
    }

    #[test]
    fn test_media_api_timeout_rejects_zero() {
        let vars = HashMap::from([("MEDIA_API_TIMEOUT_SECONDS".to_string(), "0".to_string())]);

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidMediaApiTimeout(msg)) if msg.contains("greater than 0"))
        );
    }

    #[test]
    fn test_media_api_timeout_rejects_non_numeric() {
        let vars = HashMap::from([("MEDIA_API_TIMEOUT_SECONDS".to_string(), "soon".to_string())]);

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidMediaApiTimeout(_))));
    }
}
