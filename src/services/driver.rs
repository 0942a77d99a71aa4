// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session driver: the async control loop around the session reducer.
//!
//! The driver owns the [`SessionState`] and is the only caller of
//! [`reduce`]. While a run is recording it keeps exactly one 1-second
//! ticker and one location watch alive. Both feed a single channel that
//! [`SessionDriver::step`] drains, so ticks and samples are applied one at a
//! time in arrival order.
//!
//! Every ticker/watch pair is tagged with a generation number. Leaving
//! `Running` bumps the generation before the new state is stored, which
//! makes anything still in flight from the old pair fall on the floor.

use crate::config::Config;
use crate::db::RunStore;
use crate::error::AppError;
use crate::geometry::route_distance_km;
use crate::models::{
    reduce, RunRecord, SessionEvent, SessionState, SessionStatus, MIN_ROUTE_POINTS,
};
use crate::services::identity::Identity;
use crate::services::location::{
    LocationErrorKind, LocationProvider, LocationReading, PositionOptions, WatchHandle, WatchSink,
};
use crate::services::notifier::{NotificationId, NotificationLevel, Notifier, NotifyOptions};
use crate::time_utils::{format_utc_rfc3339, now_millis};
use crate::views::{LiveStats, MapView, Screen};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use validator::Validate;

/// Timing and accuracy settings for the driver.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// One-shot request used on mount and before starting
    pub current_position: PositionOptions,
    /// Continuous watch while recording
    pub watch: PositionOptions,
    /// Duration tick period
    pub tick_interval: Duration,
}

impl From<&Config> for DriverOptions {
    fn from(config: &Config) -> Self {
        Self {
            current_position: config.current_position_options(),
            watch: config.watch_options(),
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Result of [`SessionDriver::handle_save_run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nobody is signed in; the session is left as it was
    Unauthenticated,
    /// Not enough data to be worth saving; the session was reset
    Rejected,
    /// Persisted; the summary view is keyed by `run_id`
    Saved { run_id: String },
    /// The store refused the run; the session was reset
    Failed { reason: String },
}

impl SaveOutcome {
    pub fn run_id(&self) -> Option<&str> {
        match self {
            SaveOutcome::Saved { run_id } => Some(run_id),
            _ => None,
        }
    }
}

#[derive(Debug)]
enum DriverMessage {
    Tick {
        generation: u64,
    },
    Reading {
        generation: u64,
        reading: LocationReading,
    },
}

/// Drives one recording session.
pub struct SessionDriver<L, S, N, I>
where
    L: LocationProvider,
    S: RunStore,
    N: Notifier,
    I: Identity,
{
    state: SessionState,
    options: DriverOptions,
    provider: Arc<L>,
    store: Arc<S>,
    notifier: Arc<N>,
    identity: Arc<I>,
    tx: mpsc::UnboundedSender<DriverMessage>,
    rx: mpsc::UnboundedReceiver<DriverMessage>,
    /// Messages tagged with any other generation are stale
    generation: u64,
    ticker: Option<JoinHandle<()>>,
    watch: Option<WatchHandle>,
    /// Outstanding "signal lost" warning, dismissed on reacquire or teardown
    gps_notification: Option<NotificationId>,
    permission_overlay: bool,
}

impl<L, S, N, I> SessionDriver<L, S, N, I>
where
    L: LocationProvider,
    S: RunStore,
    N: Notifier,
    I: Identity,
{
    pub fn new(
        provider: Arc<L>,
        store: Arc<S>,
        notifier: Arc<N>,
        identity: Arc<I>,
        options: DriverOptions,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: SessionState::default(),
            options,
            provider,
            store,
            notifier,
            identity,
            tx,
            rx,
            generation: 0,
            ticker: None,
            watch: None,
            gps_notification: None,
            permission_overlay: false,
        }
    }

    // ─── Accessors ──────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn permission_overlay_visible(&self) -> bool {
        self.permission_overlay
    }

    pub fn live_stats(&self) -> Option<LiveStats> {
        LiveStats::from_state(&self.state)
    }

    pub fn map_view(&self) -> MapView {
        MapView::from_state(&self.state)
    }

    pub fn screen(&self) -> Screen {
        Screen::from_state(&self.state, self.permission_overlay)
    }

    pub fn has_active_ticker(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn active_watch(&self) -> Option<WatchHandle> {
        self.watch
    }

    // ─── User actions ───────────────────────────────────────────

    /// Initial location request when the run screen opens.
    pub async fn mount(&mut self) {
        self.request_location().await;
    }

    /// Resolve the current position once.
    pub async fn request_location(&mut self) {
        if !self.provider.is_available() {
            tracing::warn!("Location provider unavailable");
            self.notifier.notify(
                NotificationLevel::Error,
                "Geolocation not supported",
                NotifyOptions::default(),
            );
            return;
        }

        // A one-shot request would knock a recording run out of Running.
        if self.state.status.has_run_in_progress() {
            tracing::debug!(status = ?self.state.status, "Ignoring location request during run");
            return;
        }

        self.dispatch(SessionEvent::RequestLocation);

        match self
            .provider
            .request_once(&self.options.current_position)
            .await
        {
            Ok(point) => {
                tracing::info!(lat = point.lat, lng = point.lng, "Location acquired");
                self.permission_overlay = false;
                self.dispatch(SessionEvent::LocationSuccess(point));
            }
            Err(e) => {
                tracing::warn!(kind = ?e.kind, error = %e, "Location request failed");
                let permission_denied = e.kind == LocationErrorKind::PermissionDenied;
                self.dispatch(SessionEvent::LocationError(e.message.clone()));

                if permission_denied {
                    self.permission_overlay = true;
                } else {
                    self.notifier
                        .notify(NotificationLevel::Error, &e.message, NotifyOptions::default());
                }
            }
        }
    }

    /// Start recording from the current position, fetching one first if needed.
    pub async fn handle_start_run(&mut self) {
        match self.state.current_position {
            Some(origin) => self.dispatch(SessionEvent::StartRun {
                origin,
                started_at: now_millis(),
            }),
            None => {
                self.notifier.notify(
                    NotificationLevel::Info,
                    "Fetching location…",
                    NotifyOptions::default(),
                );
                self.request_location().await;
            }
        }
    }

    pub fn pause(&mut self) {
        self.dispatch(SessionEvent::PauseRun);
    }

    pub fn resume(&mut self) {
        self.dispatch(SessionEvent::ResumeRun);
    }

    /// Discard the current run without saving it.
    pub fn abandon(&mut self) {
        if self.state.status.has_run_in_progress() {
            tracing::info!(
                points = self.state.route.len(),
                duration = self.state.active_duration,
                "Run abandoned"
            );
        }
        self.dispatch(SessionEvent::ResetRun);
    }

    /// End the run and hand it to the store.
    ///
    /// A run without enough data is discarded whatever the sign-in state.
    /// A signed-out save of a complete run leaves the session untouched. A
    /// run that is still recording is paused before it is handed over.
    pub async fn handle_save_run(&mut self) -> SaveOutcome {
        let start_time = match self.state.start_time {
            Some(start_time)
                if matches!(
                    self.state.status,
                    SessionStatus::Running | SessionStatus::Paused
                ) && self.state.route.len() >= MIN_ROUTE_POINTS =>
            {
                start_time
            }
            _ => {
                tracing::info!(
                    status = ?self.state.status,
                    points = self.state.route.len(),
                    "Nothing to save"
                );
                self.notifier.notify(
                    NotificationLevel::Error,
                    "No data to save",
                    NotifyOptions::default(),
                );
                self.dispatch(SessionEvent::ResetRun);
                return SaveOutcome::Rejected;
            }
        };

        let Some(user_id) = self.identity.current_user() else {
            tracing::warn!("Save attempted without a signed-in user");
            self.notifier.notify(
                NotificationLevel::Error,
                "You must be signed in to save a run",
                NotifyOptions::default(),
            );
            return SaveOutcome::Unauthenticated;
        };

        if self.state.status == SessionStatus::Running {
            self.dispatch(SessionEvent::PauseRun);
        }

        self.dispatch(SessionEvent::PrepareSave);

        let record = RunRecord {
            user_id,
            start_time,
            duration: self.state.active_duration,
            route: self.state.route.clone(),
            distance: route_distance_km(&self.state.route),
            created_at: format_utc_rfc3339(Utc::now()),
        };

        let result = match record.validate() {
            Ok(()) => self.store.create_record(&record).await,
            Err(e) => Err(AppError::from(e)),
        };

        match result {
            Ok(run_id) => {
                tracing::info!(
                    run_id = %run_id,
                    user_id = %record.user_id,
                    points = record.route.len(),
                    distance_km = record.distance,
                    duration = record.duration,
                    "Run saved"
                );
                self.dispatch(SessionEvent::SaveSuccess);
                self.dispatch(SessionEvent::ResetRun);
                self.notifier.notify(
                    NotificationLevel::Success,
                    "Run saved",
                    NotifyOptions::default(),
                );
                SaveOutcome::Saved { run_id }
            }
            Err(e) => {
                if e.is_permanent() {
                    tracing::warn!(error = %e, "Run rejected by store");
                } else {
                    tracing::error!(error = %e, "Failed to save run");
                }
                self.notifier.notify(
                    NotificationLevel::Error,
                    &format!("Failed to save run: {}", e),
                    NotifyOptions::default(),
                );
                self.dispatch(SessionEvent::ResetRun);
                SaveOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    // ─── Event loop ─────────────────────────────────────────────

    /// Wait for one tick or location sample and apply it.
    pub async fn step(&mut self) {
        // The driver holds a sender, so the channel never closes.
        if let Some(message) = self.rx.recv().await {
            self.handle_message(message);
        }
    }

    /// Apply one already-queued message without waiting. Returns false if none was pending.
    pub fn try_step(&mut self) -> bool {
        match self.rx.try_recv() {
            Ok(message) => {
                self.handle_message(message);
                true
            }
            Err(_) => false,
        }
    }

    /// Process ticks and samples until the future is dropped.
    pub async fn run(&mut self) {
        loop {
            self.step().await;
        }
    }

    fn handle_message(&mut self, message: DriverMessage) {
        match message {
            DriverMessage::Tick { generation } if generation == self.generation => {
                self.dispatch(SessionEvent::IncrementDuration);
            }
            DriverMessage::Reading {
                generation,
                reading,
            } if generation == self.generation => self.handle_reading(reading),
            stale => tracing::trace!(?stale, current = self.generation, "Dropping stale message"),
        }
    }

    fn handle_reading(&mut self, reading: LocationReading) {
        match reading {
            Ok(point) => {
                if self.state.gps_signal_lost {
                    tracing::info!("GPS signal reacquired");
                    self.dispatch(SessionEvent::GpsSignalReacquired);
                    if let Some(id) = self.gps_notification.take() {
                        self.notifier.dismiss(&id);
                    }
                    self.notifier.notify(
                        NotificationLevel::Success,
                        "GPS signal restored",
                        NotifyOptions::default(),
                    );
                }
                self.dispatch(SessionEvent::AddRoutePoint(point));
            }
            Err(e) => {
                if !self.state.gps_signal_lost {
                    tracing::warn!(kind = ?e.kind, error = %e, "GPS signal lost");
                    self.dispatch(SessionEvent::GpsSignalLost);
                    let id = self.notifier.notify(
                        NotificationLevel::Warning,
                        "GPS signal lost. Trying to reconnect…",
                        NotifyOptions::persistent(),
                    );
                    self.gps_notification = Some(id);
                }
            }
        }
    }

    // ─── State transitions ──────────────────────────────────────

    fn dispatch(&mut self, event: SessionEvent) {
        let event_name = event.name();
        let restart = matches!(event, SessionEvent::StartRun { .. });
        let previous = self.state.status;
        let next = reduce(std::mem::take(&mut self.state), event);

        let was_running = previous == SessionStatus::Running;
        let is_running = next.status == SessionStatus::Running;
        if was_running && !is_running {
            self.stop_recording();
        } else if is_running && (restart || !was_running) {
            // A restart gets a fresh ticker/watch pair like any other start.
            self.start_recording();
        }

        if previous != next.status {
            tracing::debug!(
                event = event_name,
                from = ?previous,
                to = ?next.status,
                "Session status changed"
            );
        } else {
            tracing::trace!(event = event_name, status = ?next.status, "Session event");
        }

        self.state = next;
    }

    fn start_recording(&mut self) {
        self.stop_recording();
        let generation = self.generation;

        let tx = self.tx.clone();
        let period = self.options.tick_interval;
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(DriverMessage::Tick { generation }).is_err() {
                    break;
                }
            }
        }));

        let tx = self.tx.clone();
        let sink = WatchSink::new(move |reading| {
            let _ = tx.send(DriverMessage::Reading {
                generation,
                reading,
            });
        });

        match self.provider.watch(&self.options.watch, sink) {
            Ok(handle) => {
                tracing::debug!(generation, handle = handle.0, "Recording started");
                self.watch = Some(handle);
            }
            Err(e) => {
                // Surfaces as a lost signal through the normal sample path.
                tracing::warn!(error = %e, "Failed to start location watch");
                let _ = self.tx.send(DriverMessage::Reading {
                    generation,
                    reading: Err(e),
                });
            }
        }
    }

    fn stop_recording(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        if let Some(handle) = self.watch.take() {
            self.provider.cancel(handle);
        }
        self.generation += 1;

        if let Some(id) = self.gps_notification.take() {
            self.notifier.dismiss(&id);
        }
    }
}

impl<L, S, N, I> Drop for SessionDriver<L, S, N, I>
where
    L: LocationProvider,
    S: RunStore,
    N: Notifier,
    I: Identity,
{
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        if let Some(handle) = self.watch.take() {
            self.provider.cancel(handle);
        }
    }
}
