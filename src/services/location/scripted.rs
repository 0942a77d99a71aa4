// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Location provider driven by hand, for deterministic tests and demos.
//!
//! One-shot answers are queued up front with [`push_once`]. Watch samples
//! are pushed on demand with [`emit`] to every watch that is still active.
//!
//! [`push_once`]: ScriptedLocationProvider::push_once
//! [`emit`]: ScriptedLocationProvider::emit

use super::{
    LocationError, LocationErrorKind, LocationProvider, LocationReading, PositionOptions,
    WatchHandle, WatchSink,
};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
pub struct ScriptedLocationProvider {
    unsupported: AtomicBool,
    once_results: Mutex<VecDeque<LocationReading>>,
    once_requests: Mutex<Vec<PositionOptions>>,
    watches: DashMap<WatchHandle, WatchSink>,
    watch_requests: Mutex<Vec<PositionOptions>>,
    cancelled: Mutex<Vec<WatchHandle>>,
    next_handle: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedLocationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A device with no location capability.
    pub fn unsupported() -> Self {
        let provider = Self::default();
        provider.unsupported.store(true, Ordering::SeqCst);
        provider
    }

    /// Queue the answer for the next one-shot request.
    pub fn push_once(&self, reading: LocationReading) {
        lock(&self.once_results).push_back(reading);
    }

    /// Deliver a sample to every active watch. Returns how many received it.
    pub fn emit(&self, reading: LocationReading) -> usize {
        // Collect first so no map shard is locked while subscribers run.
        let sinks: Vec<WatchSink> = self.watches.iter().map(|e| e.value().clone()).collect();
        for sink in &sinks {
            sink.deliver(reading.clone());
        }
        sinks.len()
    }

    /// Handles of watches that have not been cancelled.
    pub fn active_watches(&self) -> Vec<WatchHandle> {
        self.watches.iter().map(|e| *e.key()).collect()
    }

    /// Handles passed to `cancel`, in order.
    pub fn cancelled(&self) -> Vec<WatchHandle> {
        lock(&self.cancelled).clone()
    }

    /// Options of every one-shot request made so far.
    pub fn once_requests(&self) -> Vec<PositionOptions> {
        lock(&self.once_requests).clone()
    }

    /// Options of every watch started so far.
    pub fn watch_requests(&self) -> Vec<PositionOptions> {
        lock(&self.watch_requests).clone()
    }
}

impl LocationProvider for ScriptedLocationProvider {
    fn is_available(&self) -> bool {
        !self.unsupported.load(Ordering::SeqCst)
    }

    async fn request_once(&self, options: &PositionOptions) -> LocationReading {
        lock(&self.once_requests).push(options.clone());
        // An empty script behaves like a request that never got a fix.
        lock(&self.once_results)
            .pop_front()
            .unwrap_or_else(|| Err(LocationError::timeout()))
    }

    fn watch(
        &self,
        options: &PositionOptions,
        sink: WatchSink,
    ) -> Result<WatchHandle, LocationError> {
        if !self.is_available() {
            return Err(LocationError::new(
                LocationErrorKind::Unsupported,
                "Geolocation not supported",
            ));
        }
        lock(&self.watch_requests).push(options.clone());
        let handle = WatchHandle(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1);
        self.watches.insert(handle, sink);
        Ok(handle)
    }

    fn cancel(&self, handle: WatchHandle) {
        if self.watches.remove(&handle).is_some() {
            lock(&self.cancelled).push(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;
    use std::sync::Arc;

    fn options() -> PositionOptions {
        PositionOptions {
            enable_high_accuracy: true,
            timeout_ms: 10_000,
            maximum_age_ms: 3_000,
        }
    }

    #[tokio::test]
    async fn test_once_results_are_served_in_order() {
        let provider = ScriptedLocationProvider::new();
        provider.push_once(Ok(GeoPoint::new(1.0, 1.0, 0)));
        provider.push_once(Err(LocationError::permission_denied()));

        assert!(provider.request_once(&options()).await.is_ok());
        assert!(provider.request_once(&options()).await.is_err());
        // Exhausted script times out
        let err = provider.request_once(&options()).await.unwrap_err();
        assert_eq!(err.kind, LocationErrorKind::Timeout);
        assert_eq!(provider.once_requests().len(), 3);
    }

    #[test]
    fn test_cancelled_watch_stops_receiving() {
        let provider = ScriptedLocationProvider::new();
        let received = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&received);
        let handle = provider
            .watch(
                &options(),
                WatchSink::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        assert_eq!(provider.emit(Ok(GeoPoint::new(1.0, 1.0, 0))), 1);
        provider.cancel(handle);
        assert_eq!(provider.emit(Ok(GeoPoint::new(1.0, 1.0, 0))), 0);

        assert_eq!(received.load(Ordering::SeqCst), 1);
        assert_eq!(provider.cancelled(), vec![handle]);
        assert!(provider.active_watches().is_empty());
    }

    #[test]
    fn test_unsupported_device_refuses_watch() {
        let provider = ScriptedLocationProvider::unsupported();
        assert!(!provider.is_available());
        assert!(provider.watch(&options(), WatchSink::new(|_| {})).is_err());
    }
}
