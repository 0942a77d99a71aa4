// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Device location capability.
//!
//! The session driver never talks to a platform API directly. It is handed a
//! [`LocationProvider`], which answers one-shot requests and pushes samples
//! from a continuous watch into a [`WatchSink`] until the watch is cancelled.

pub mod replay;
pub mod scripted;

pub use replay::ReplayLocationProvider;
pub use scripted::ScriptedLocationProvider;

use crate::models::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Accuracy and freshness requirements for a position request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    /// Give up on a fix after this long
    pub timeout_ms: u64,
    /// Accept a cached fix up to this old (0 = always fresh)
    pub maximum_age_ms: u64,
}

/// Why a position could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationErrorKind {
    /// The device has no location capability at all
    Unsupported,
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

/// Failed position request or watch sample.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LocationError {
    pub kind: LocationErrorKind,
    pub message: String,
}

impl LocationError {
    pub fn new(kind: LocationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn permission_denied() -> Self {
        Self::new(LocationErrorKind::PermissionDenied, "User denied Geolocation")
    }

    pub fn timeout() -> Self {
        Self::new(LocationErrorKind::Timeout, "Timeout expired")
    }

    pub fn unavailable() -> Self {
        Self::new(
            LocationErrorKind::PositionUnavailable,
            "Position unavailable",
        )
    }
}

/// Outcome of a single location sample.
pub type LocationReading = Result<GeoPoint, LocationError>;

/// Opaque identifier of an active watch, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchHandle(pub u64);

/// Callback target for watch samples.
#[derive(Clone)]
pub struct WatchSink {
    deliver: Arc<dyn Fn(LocationReading) + Send + Sync>,
}

impl WatchSink {
    pub fn new(deliver: impl Fn(LocationReading) + Send + Sync + 'static) -> Self {
        Self {
            deliver: Arc::new(deliver),
        }
    }

    /// Hand one sample to the subscriber.
    pub fn deliver(&self, reading: LocationReading) {
        (self.deliver)(reading)
    }
}

impl fmt::Debug for WatchSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchSink").finish_non_exhaustive()
    }
}

/// Source of device positions.
pub trait LocationProvider: Send + Sync {
    /// Whether the device can produce positions at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Resolve the current position once.
    fn request_once(
        &self,
        options: &PositionOptions,
    ) -> impl Future<Output = LocationReading> + Send;

    /// Start pushing samples into `sink` until [`cancel`](Self::cancel) is called.
    fn watch(
        &self,
        options: &PositionOptions,
        sink: WatchSink,
    ) -> Result<WatchHandle, LocationError>;

    /// Stop a watch. Unknown handles are ignored.
    fn cancel(&self, handle: WatchHandle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_sink_delivers_to_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let sink = WatchSink::new(move |reading| seen_clone.lock().unwrap().push(reading));

        sink.deliver(Ok(GeoPoint::new(1.0, 2.0, 3)));
        sink.deliver(Err(LocationError::timeout()));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[1].is_err());
    }

    #[test]
    fn test_error_kind_deserializes_snake_case() {
        let kind: LocationErrorKind = serde_json::from_str("\"permission_denied\"").unwrap();
        assert_eq!(kind, LocationErrorKind::PermissionDenied);
    }

    #[test]
    fn test_error_displays_message() {
        assert_eq!(LocationError::timeout().to_string(), "Timeout expired");
    }
}
