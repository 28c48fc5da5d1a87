//! Media control plane configuration.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults; `from_vars` exists so tests can construct configs without
//! touching the process environment.

use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default HTTP bind address for the control API.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8081";

/// Default IP announced in ICE candidates.
pub const DEFAULT_ANNOUNCED_IP: &str = "127.0.0.1";

/// First UDP port handed out for transport ICE candidates.
pub const DEFAULT_RTC_PORT_BASE: u16 = 40_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid worker pool size: {0}")]
    InvalidWorkerPoolSize(String),

    #[error("Invalid RTC port base: {0}")]
    InvalidRtcPortBase(String),
}

/// Media control plane configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind address (default: "0.0.0.0:8081").
    pub bind_address: String,

    /// Number of media workers in the fixed pool.
    /// Defaults to the available parallelism of the host; never resized
    /// at runtime.
    pub worker_pool_size: usize,

    /// IP address announced to clients in ICE candidates.
    pub announced_ip: String,

    /// Base UDP port for minted ICE candidates.
    pub rtc_port_base: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("MEDIA_BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let worker_pool_size = if let Some(value_str) = vars.get("MEDIA_WORKER_POOL_SIZE") {
            let value: usize = value_str.parse().map_err(|e| {
                ConfigError::InvalidWorkerPoolSize(format!(
                    "MEDIA_WORKER_POOL_SIZE must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidWorkerPoolSize(
                    "MEDIA_WORKER_POOL_SIZE must be greater than 0".to_string(),
                ));
            }

            value
        } else {
            default_worker_pool_size()
        };

        let announced_ip = vars
            .get("MEDIA_ANNOUNCED_IP")
            .cloned()
            .unwrap_or_else(|| DEFAULT_ANNOUNCED_IP.to_string());

        let rtc_port_base = if let Some(value_str) = vars.get("MEDIA_RTC_PORT_BASE") {
            value_str.parse().map_err(|e| {
                ConfigError::InvalidRtcPortBase(format!(
                    "MEDIA_RTC_PORT_BASE must be a valid port number, got '{}': {}",
                    value_str, e
                ))
            })?
        } else {
            DEFAULT_RTC_PORT_BASE
        };

        Ok(Config {
            bind_address,
            worker_pool_size,
            announced_ip,
            rtc_port_base,
        })
    }
}

/// One worker per available processing unit by default.
fn default_worker_pool_size() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}
