// ABOUTME: Environment-based configuration for the Nutria companion
// ABOUTME: Resolves the API credential, data directory, remote store URL and log level
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

//! Environment-only configuration (no configuration files).
//!
//! The only required setting is the generative-AI credential; everything else
//! has a sensible default. Settings:
//!
//! - `GEMINI_API_KEY`: credential for the completion endpoint (required for
//!   live use; the library itself can run against a fake provider in tests).
//! - `NUTRIA_DATA_DIR`: directory for local persistence (defaults to the
//!   platform data dir).
//! - `NUTRIA_REMOTE_URL`: base URL of the remote document store; when unset
//!   the app runs local-only.
//! - `NUTRIA_LOG_LEVEL`: error/warn/info/debug/trace, defaults to info.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult, ErrorCode};

/// Environment variable holding the Gemini API key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding the local data directory
pub const DATA_DIR_ENV: &str = "NUTRIA_DATA_DIR";

/// Environment variable with the remote document store base URL
pub const REMOTE_URL_ENV: &str = "NUTRIA_REMOTE_URL";

/// Environment variable selecting the log level
pub const LOG_LEVEL_ENV: &str = "NUTRIA_LOG_LEVEL";

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Default level
    #[default]
    Info,
    /// Verbose diagnostics
    Debug,
    /// Full tracing
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback to the default level
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }

    /// String form accepted by `tracing_subscriber::EnvFilter`
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Runtime configuration resolved from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Credential for the generative completion endpoint
    pub gemini_api_key: String,
    /// Directory holding the local profile document
    pub data_dir: PathBuf,
    /// Remote document store base URL; `None` means local-only persistence
    pub remote_base_url: Option<String>,
    /// Log verbosity
    pub log_level: LogLevel,
}

impl AppConfig {
    /// Load configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if `GEMINI_API_KEY` is unset or if no data directory
    /// can be resolved on this platform.
    pub fn from_env() -> AppResult<Self> {
        let gemini_api_key = env::var(GEMINI_API_KEY_ENV).map_err(|_| {
            AppError::new(
                ErrorCode::ConfigMissing,
                format!("{GEMINI_API_KEY_ENV} environment variable not set"),
            )
        })?;

        let data_dir = match env::var(DATA_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => default_data_dir()?,
        };

        let remote_base_url = env::var(REMOTE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty());

        let log_level = env::var(LOG_LEVEL_ENV)
            .map(|s| LogLevel::from_str_or_default(&s))
            .unwrap_or_default();

        Ok(Self {
            gemini_api_key,
            data_dir,
            remote_base_url,
            log_level,
        })
    }
}

/// Platform data directory for Nutria (`<data_dir>/nutria`)
fn default_data_dir() -> AppResult<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("nutria"))
        .ok_or_else(|| AppError::config("could not resolve a platform data directory"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_from_env_requires_the_api_key() {
        env::remove_var(GEMINI_API_KEY_ENV);
        let err = AppConfig::from_env().unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigMissing);
    }

    #[test]
    #[serial]
    fn test_from_env_reads_overrides() {
        env::set_var(GEMINI_API_KEY_ENV, "test-key");
        env::set_var(DATA_DIR_ENV, "/tmp/nutria-test");
        env::set_var(REMOTE_URL_ENV, "https://store.example");
        env::set_var(LOG_LEVEL_ENV, "debug");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.gemini_api_key, "test-key");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/nutria-test"));
        assert_eq!(config.remote_base_url.as_deref(), Some("https://store.example"));
        assert_eq!(config.log_level, LogLevel::Debug);

        env::remove_var(GEMINI_API_KEY_ENV);
        env::remove_var(DATA_DIR_ENV);
        env::remove_var(REMOTE_URL_ENV);
        env::remove_var(LOG_LEVEL_ENV);
    }

    #[test]
    fn test_log_level_parsing_falls_back_to_info() {
        assert_eq!(LogLevel::from_str_or_default("warn"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str_or_default("WARN"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str_or_default("nonsense"), LogLevel::Info);
    }

    #[test]
    fn test_log_level_round_trips_as_str() {
        for level in [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ] {
            assert_eq!(LogLevel::from_str_or_default(level.as_str()), level);
        }
    }
}
