// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use crate::services::location::PositionOptions;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default one-shot location timeout.
pub const DEFAULT_LOCATION_TIMEOUT_MS: u64 = 15_000;
/// Default per-sample timeout for the continuous watch.
pub const DEFAULT_WATCH_TIMEOUT_MS: u64 = 10_000;
/// Default staleness tolerated for watch samples.
pub const DEFAULT_WATCH_MAXIMUM_AGE_MS: u64 = 3_000;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID hosting the `runs` collection
    pub gcp_project_id: String,
    /// Owner identifier stamped on saved runs
    pub owner_id: String,
    /// Recorded track replayed by the headless recorder
    pub track_file: PathBuf,
    /// Delay between replayed watch samples
    pub replay_interval: Duration,
    /// Timeout for the one-shot position request
    pub location_timeout_ms: u64,
    /// Per-sample timeout for the continuous watch
    pub watch_timeout_ms: u64,
    /// Maximum age of a cached watch sample
    pub watch_maximum_age_ms: u64,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            owner_id: "test-runner".to_string(),
            track_file: PathBuf::from("data/sample_track.json"),
            replay_interval: Duration::from_millis(1000),
            location_timeout_ms: DEFAULT_LOCATION_TIMEOUT_MS,
            watch_timeout_ms: DEFAULT_WATCH_TIMEOUT_MS,
            watch_maximum_age_ms: DEFAULT_WATCH_MAXIMUM_AGE_MS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID")
                .map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?,
            owner_id: env::var("RUN_OWNER_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("RUN_OWNER_ID"))?,
            track_file: env::var("TRACK_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/sample_track.json")),
            replay_interval: Duration::from_millis(parse_millis("REPLAY_INTERVAL_MS", 1000)?),
            location_timeout_ms: parse_millis("LOCATION_TIMEOUT_MS", DEFAULT_LOCATION_TIMEOUT_MS)?,
            watch_timeout_ms: parse_millis("WATCH_TIMEOUT_MS", DEFAULT_WATCH_TIMEOUT_MS)?,
            watch_maximum_age_ms: parse_millis(
                "WATCH_MAXIMUM_AGE_MS",
                DEFAULT_WATCH_MAXIMUM_AGE_MS,
            )?,
        })
    }

    /// Options for the one-shot position request (never served from cache).
    pub fn current_position_options(&self) -> PositionOptions {
        PositionOptions {
            enable_high_accuracy: true,
            timeout_ms: self.location_timeout_ms,
            maximum_age_ms: 0,
        }
    }

    /// Options for the continuous watch while a run is recording.
    pub fn watch_options(&self) -> PositionOptions {
        PositionOptions {
            enable_high_accuracy: true,
            timeout_ms: self.watch_timeout_ms,
            maximum_age_ms: self.watch_maximum_age_ms,
        }
    }
}

/// Read an optional millisecond value, rejecting garbage instead of silently defaulting.
fn parse_millis(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
