// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Location provider that replays a recorded track file.
//!
//! The track is a JSON array. Each entry is either a fix
//! (`{"lat": 59.9, "lng": 10.75}`) or a failed sample
//! (`{"error": "timeout", "message": "..."}`). Fixes are stamped with the
//! wall-clock time at which they are delivered.
//!
//! A watch resumes from where the previous one was cancelled, so pausing a
//! run does not replay the same stretch twice.

use super::{
    LocationError, LocationErrorKind, LocationProvider, LocationReading, PositionOptions,
    WatchHandle, WatchSink,
};
use crate::models::GeoPoint;
use crate::time_utils::now_millis;
use dashmap::DashMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// One line of a recorded track.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TrackEntry {
    Fix {
        lat: f64,
        lng: f64,
    },
    Failure {
        error: LocationErrorKind,
        #[serde(default)]
        message: Option<String>,
    },
}

impl TrackEntry {
    fn to_reading(&self) -> LocationReading {
        match self {
            TrackEntry::Fix { lat, lng } => Ok(GeoPoint::new(*lat, *lng, now_millis())),
            TrackEntry::Failure { error, message } => Err(LocationError::new(
                *error,
                message
                    .clone()
                    .unwrap_or_else(|| format!("Replayed {:?}", error)),
            )),
        }
    }
}

/// Replays a track at a fixed interval.
pub struct ReplayLocationProvider {
    entries: Arc<Vec<TrackEntry>>,
    interval: Duration,
    /// Index of the next entry a watch will deliver
    cursor: Arc<AtomicUsize>,
    tasks: DashMap<WatchHandle, JoinHandle<()>>,
    next_handle: AtomicU64,
    finished_tx: Arc<watch::Sender<bool>>,
}

impl ReplayLocationProvider {
    /// Load a track from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P, interval: Duration) -> Result<Self, ReplayError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| ReplayError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data, interval)
    }

    /// Load a track from a JSON string.
    pub fn load_from_json(json_data: &str, interval: Duration) -> Result<Self, ReplayError> {
        let entries: Vec<TrackEntry> =
            serde_json::from_str(json_data).map_err(|e| ReplayError::ParseError(e.to_string()))?;

        if !entries.iter().any(|e| matches!(e, TrackEntry::Fix { .. })) {
            return Err(ReplayError::NoFixes);
        }

        tracing::info!(entries = entries.len(), "Loaded replay track");
        Ok(Self::new(entries, interval))
    }

    pub fn new(entries: Vec<TrackEntry>, interval: Duration) -> Self {
        let (finished_tx, _) = watch::channel(false);
        Self {
            entries: Arc::new(entries),
            interval,
            cursor: Arc::new(AtomicUsize::new(0)),
            tasks: DashMap::new(),
            next_handle: AtomicU64::new(0),
            finished_tx: Arc::new(finished_tx),
        }
    }

    /// Number of entries in the track.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves once every entry has been delivered.
    pub async fn finished(&self) {
        let mut rx = self.finished_tx.subscribe();
        // The sender lives in self, so the channel cannot close while we wait.
        let _ = rx.wait_for(|done| *done).await;
    }
}

impl LocationProvider for ReplayLocationProvider {
    /// The start position is the first fix in the track.
    async fn request_once(&self, _options: &PositionOptions) -> LocationReading {
        self.entries
            .iter()
            .find_map(|entry| match entry {
                TrackEntry::Fix { .. } => Some(entry.to_reading()),
                TrackEntry::Failure { .. } => None,
            })
            .unwrap_or_else(|| Err(LocationError::unavailable()))
    }

    fn watch(
        &self,
        _options: &PositionOptions,
        sink: WatchSink,
    ) -> Result<WatchHandle, LocationError> {
        let handle = WatchHandle(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1);
        let entries = Arc::clone(&self.entries);
        let cursor = Arc::clone(&self.cursor);
        let finished_tx = Arc::clone(&self.finished_tx);
        let interval = self.interval;

        let task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let index = cursor.fetch_add(1, Ordering::SeqCst);
                match entries.get(index) {
                    Some(entry) => sink.deliver(entry.to_reading()),
                    None => {
                        finished_tx.send_replace(true);
                        break;
                    }
                }
            }
        });

        tracing::debug!(handle = handle.0, "Replay watch started");
        self.tasks.insert(handle, task);
        Ok(handle)
    }

    fn cancel(&self, handle: WatchHandle) {
        if let Some((_, task)) = self.tasks.remove(&handle) {
            task.abort();
            tracing::debug!(handle = handle.0, "Replay watch cancelled");
        }
    }
}

impl Drop for ReplayLocationProvider {
    fn drop(&mut self) {
        for entry in self.tasks.iter() {
            entry.value().abort();
        }
    }
}

/// Errors from loading a replay track.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Failed to read track file: {0}")]
    IoError(String),

    #[error("Failed to parse track: {0}")]
    ParseError(String),

    #[error("Track contains no position fixes")]
    NoFixes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const TRACK: &str = r#"[
        {"lat": 59.90, "lng": 10.75},
        {"error": "timeout"},
        {"lat": 59.91, "lng": 10.76}
    ]"#;

    fn options() -> PositionOptions {
        PositionOptions {
            enable_high_accuracy: true,
            timeout_ms: 10_000,
            maximum_age_ms: 3_000,
        }
    }

    #[test]
    fn test_parses_fixes_and_failures() {
        let provider = ReplayLocationProvider::load_from_json(TRACK, Duration::from_secs(1))
            .expect("track should parse");
        assert_eq!(provider.len(), 3);
    }

    #[test]
    fn test_rejects_track_without_fixes() {
        let result =
            ReplayLocationProvider::load_from_json(r#"[{"error": "timeout"}]"#, Duration::ZERO);
        assert!(matches!(result, Err(ReplayError::NoFixes)));
    }

    #[test]
    fn test_rejects_malformed_track() {
        let result = ReplayLocationProvider::load_from_json("{not json", Duration::ZERO);
        assert!(matches!(result, Err(ReplayError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_request_once_returns_first_fix() {
        let provider = ReplayLocationProvider::load_from_json(TRACK, Duration::ZERO).unwrap();
        let point = provider.request_once(&options()).await.unwrap();
        assert_eq!((point.lat, point.lng), (59.90, 10.75));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_replays_every_entry_then_finishes() {
        let provider =
            ReplayLocationProvider::load_from_json(TRACK, Duration::from_secs(1)).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        provider
            .watch(
                &options(),
                WatchSink::new(move |r| seen_clone.lock().unwrap().push(r)),
            )
            .unwrap();

        provider.finished().await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].is_ok());
        assert_eq!(seen[1].as_ref().unwrap_err().kind, LocationErrorKind::Timeout);
        assert!(seen[2].is_ok());
    }
}
