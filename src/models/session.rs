// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recording session state and its reducer.
//!
//! `reduce` is the only way a [`SessionState`] changes. It is a pure,
//! total function: every event either applies or, if its precondition does
//! not hold, leaves the state untouched. Timers, location callbacks and
//! persistence live in the session driver.

use crate::models::GeoPoint;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Lifecycle of a recording session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SessionStatus {
    #[default]
    Idle,
    Locating,
    Running,
    Paused,
    Saving,
    Ended,
}

impl SessionStatus {
    /// A run has been started and not yet finished or discarded.
    pub fn has_run_in_progress(self) -> bool {
        matches!(
            self,
            SessionStatus::Running | SessionStatus::Paused | SessionStatus::Saving
        )
    }
}

/// Single source of truth for the in-progress recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionState {
    pub status: SessionStatus,
    /// Set once when the run starts; pausing never changes it
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub start_time: Option<i64>,
    /// Seconds spent in `Running`
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub active_duration: u64,
    /// Recorded fixes, oldest first
    pub route: Vec<GeoPoint>,
    /// Most recent fix, also tracked outside of runs for map centering
    pub current_position: Option<GeoPoint>,
    /// Message from the last failed location request
    pub error: Option<String>,
    /// Consecutive watch failures during a run
    pub gps_signal_lost: bool,
}

/// Everything that can happen to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    RequestLocation,
    LocationSuccess(GeoPoint),
    LocationError(String),
    /// `started_at` is supplied by the caller so the reducer stays deterministic.
    StartRun {
        origin: GeoPoint,
        started_at: i64,
    },
    PauseRun,
    ResumeRun,
    AddRoutePoint(GeoPoint),
    IncrementDuration,
    PrepareSave,
    SaveSuccess,
    ResetRun,
    GpsSignalLost,
    GpsSignalReacquired,
}

impl SessionEvent {
    /// Short name for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::RequestLocation => "request_location",
            SessionEvent::LocationSuccess(_) => "location_success",
            SessionEvent::LocationError(_) => "location_error",
            SessionEvent::StartRun { .. } => "start_run",
            SessionEvent::PauseRun => "pause_run",
            SessionEvent::ResumeRun => "resume_run",
            SessionEvent::AddRoutePoint(_) => "add_route_point",
            SessionEvent::IncrementDuration => "increment_duration",
            SessionEvent::PrepareSave => "prepare_save",
            SessionEvent::SaveSuccess => "save_success",
            SessionEvent::ResetRun => "reset_run",
            SessionEvent::GpsSignalLost => "gps_signal_lost",
            SessionEvent::GpsSignalReacquired => "gps_signal_reacquired",
        }
    }
}

/// Apply one event to the session.
pub fn reduce(state: SessionState, event: SessionEvent) -> SessionState {
    use SessionEvent as E;
    use SessionStatus as S;

    match (state.status, event) {
        (_, E::RequestLocation) => SessionState {
            status: S::Locating,
            error: None,
            gps_signal_lost: false,
            ..state
        },
        (_, E::LocationSuccess(point)) => SessionState {
            status: S::Idle,
            current_position: Some(point),
            error: None,
            gps_signal_lost: false,
            ..state
        },
        // gps_signal_lost is left alone: the failure may belong to a run.
        (_, E::LocationError(message)) => SessionState {
            status: S::Idle,
            error: Some(message),
            ..state
        },
        // Starting again over a run in progress discards that run.
        (_, E::StartRun { origin, started_at }) if state.current_position.is_some() => {
            SessionState {
                status: S::Running,
                start_time: Some(started_at),
                active_duration: 0,
                route: vec![origin],
                current_position: Some(origin),
                error: None,
                gps_signal_lost: false,
            }
        }
        (S::Running, E::PauseRun) => SessionState {
            status: S::Paused,
            ..state
        },
        (S::Paused, E::ResumeRun) => SessionState {
            status: S::Running,
            ..state
        },
        (S::Running, E::AddRoutePoint(point)) => {
            let mut route = state.route;
            route.push(point);
            SessionState {
                route,
                current_position: Some(point),
                ..state
            }
        }
        (S::Running, E::IncrementDuration) => SessionState {
            active_duration: state.active_duration + 1,
            ..state
        },
        (S::Paused, E::PrepareSave) => SessionState {
            status: S::Saving,
            ..state
        },
        (S::Saving, E::SaveSuccess) => SessionState {
            status: S::Ended,
            ..state
        },
        (_, E::ResetRun) => SessionState {
            current_position: state.current_position,
            error: state.error,
            ..SessionState::default()
        },
        (S::Running | S::Paused, E::GpsSignalLost) => SessionState {
            gps_signal_lost: true,
            ..state
        },
        (S::Running | S::Paused, E::GpsSignalReacquired) => SessionState {
            gps_signal_lost: false,
            ..state
        },
        // Precondition not met
        _ => state,
    }
}
