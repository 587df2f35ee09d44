// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.
//!
//! The configuration is resolved once at startup and handed to the
//! components that need it. Nothing reads the environment after that.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default maximum size of a single wire frame (32 MiB).
pub const DEFAULT_MAX_FRAME_BYTES: usize = 32 * 1024 * 1024;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Computation server ---
    /// Host of the master node that computes activity stats
    pub master_ip: String,
    /// Port of the master node
    pub master_port: u16,

    // --- Upload hardening ---
    /// Upper bound on establishing the TCP connection
    pub connect_timeout: Duration,
    /// Upper bound on waiting for the single response frame
    pub read_timeout: Duration,
    /// Largest frame accepted or produced on the wire
    pub max_frame_bytes: usize,

    // --- Session cache ---
    /// Directory holding the session cache record
    pub cache_dir: PathBuf,
    /// Namespace (file stem) of the session cache record
    pub cache_namespace: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let master_ip = env::var("MASTER_IP")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("MASTER_IP"))?;
        if master_ip.is_empty() {
            return Err(ConfigError::Invalid {
                key: "MASTER_IP",
                reason: "must not be empty".to_string(),
            });
        }

        let master_port = env::var("MASTER_PORT")
            .map_err(|_| ConfigError::Missing("MASTER_PORT"))?
            .trim()
            .parse::<u16>()
            .map_err(|e| ConfigError::Invalid {
                key: "MASTER_PORT",
                reason: e.to_string(),
            })?;

        Ok(Self {
            master_ip,
            master_port,
            connect_timeout: Duration::from_secs(positive_or("CONNECT_TIMEOUT_SECS", 10)?),
            read_timeout: Duration::from_secs(positive_or("READ_TIMEOUT_SECS", 60)?),
            max_frame_bytes: positive_or("MAX_FRAME_BYTES", DEFAULT_MAX_FRAME_BYTES)?,
            cache_dir: env::var("CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            cache_namespace: env::var("CACHE_NAMESPACE")
                .unwrap_or_else(|_| "Preferences".to_string()),
        })
    }

    /// Config pointing at a local test server. Not for production use.
    pub fn test_default() -> Self {
        Self {
            master_ip: "127.0.0.1".to_string(),
            master_port: 4321,
            connect_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_secs(5),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            cache_dir: env::temp_dir(),
            cache_namespace: "Preferences".to_string(),
        }
    }

    /// Key/value lookup for the server address settings.
    ///
    /// Recognised keys are `master_ip` and `master_port`.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "master_ip" => Some(self.master_ip.clone()),
            "master_port" => Some(self.master_port.to_string()),
            _ => None,
        }
    }

    /// `host:port` of the computation server.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.master_ip, self.master_port)
    }
}

/// Read an optional positive integer, using `default` when unset.
fn positive_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
    T::Err: std::fmt::Display,
{
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };
    let value = raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })?;
    if value == T::default() {
        return Err(ConfigError::Invalid {
            key,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
