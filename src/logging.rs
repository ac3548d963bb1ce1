// ABOUTME: Tracing subscriber setup for structured logging
// ABOUTME: Initializes the global subscriber from the configured log level
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

//! Logging initialization built on `tracing` / `tracing-subscriber`.
//!
//! `RUST_LOG` takes precedence over the configured level so operators can
//! raise verbosity per module without touching application settings.

use tracing_subscriber::EnvFilter;

use crate::config::LogLevel;

/// Initialize the global tracing subscriber
///
/// Safe to call more than once; later calls are no-ops (useful in tests).
pub fn init(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nutria={}", level.as_str())));

    // try_init so test binaries that initialize twice do not panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
