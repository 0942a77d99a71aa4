// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! View models derived from session state and stored runs.
//!
//! Everything here is a pure projection. Rendering (map tiles, markers,
//! toasts) belongs to whatever front end consumes these structs.

use crate::error::{AppError, Result};
use crate::geometry::{
    encode_route, format_pace, pace_min_per_km, route_bounds, route_distance_km, route_feature,
};
use crate::models::{GeoPoint, SessionState, SessionStatus, StoredRun};
use crate::time_utils::{format_date, format_duration};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Map center used before the first location fix (Oslo).
pub const DEFAULT_MAP_CENTER: [f64; 2] = [59.9139, 10.7522];
/// Zoom level without a known position.
pub const DEFAULT_ZOOM: u8 = 15;
/// Zoom level once the runner's position is known.
pub const TRACKING_ZOOM: u8 = 16;

// ─── Shared pieces ──────────────────────────────────────────

/// South-west and north-east corners of a route, as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RouteBounds {
    pub south_west: [f64; 2],
    pub north_east: [f64; 2],
}

impl RouteBounds {
    pub fn of(route: &[GeoPoint]) -> Option<Self> {
        route_bounds(route).map(|rect| Self {
            south_west: [rect.min().y, rect.min().x],
            north_east: [rect.max().y, rect.max().x],
        })
    }
}

/// Polyline for the map hand-off. Encoding failures only cost the compact form.
fn encoded_polyline(route: &[GeoPoint]) -> Option<String> {
    match encode_route(route) {
        Ok(encoded) => Some(encoded),
        Err(e) => {
            tracing::warn!(error = %e, points = route.len(), "Failed to encode route");
            None
        }
    }
}

fn format_distance(distance_km: f64) -> String {
    format!("{:.2}", distance_km)
}

// ─── Live session ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum GpsStatus {
    #[serde(rename = "OK")]
    Ok,
    Poor,
}

impl GpsStatus {
    pub fn label(self) -> &'static str {
        match self {
            GpsStatus::Ok => "OK",
            GpsStatus::Poor => "Poor",
        }
    }
}

/// Header statistics shown while a run is recording or paused.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LiveStats {
    /// `MM:SS` or `HH:MM:SS`
    pub duration: String,
    /// Kilometers with two decimals
    pub distance: String,
    /// Minutes per kilometer with two decimals, or `--`
    pub pace: String,
    pub gps: GpsStatus,
}

impl LiveStats {
    /// `None` outside of running/paused.
    pub fn from_state(state: &SessionState) -> Option<Self> {
        if !matches!(state.status, SessionStatus::Running | SessionStatus::Paused) {
            return None;
        }

        let distance_km = route_distance_km(&state.route);
        Some(Self {
            duration: format_duration(state.active_duration),
            distance: format_distance(distance_km),
            pace: format_pace(pace_min_per_km(state.active_duration, distance_km)),
            gps: if state.gps_signal_lost {
                GpsStatus::Poor
            } else {
                GpsStatus::Ok
            },
        })
    }
}

/// What the live map should show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MapView {
    /// `[lat, lng]`
    pub center: [f64; 2],
    pub zoom: u8,
    /// Runner's position, if known
    pub marker: Option<[f64; 2]>,
    /// Route positions; empty until there is a line to draw
    pub polyline: Vec<[f64; 2]>,
    pub encoded_polyline: Option<String>,
    pub bounds: Option<RouteBounds>,
}

impl MapView {
    pub fn from_state(state: &SessionState) -> Self {
        let marker = state.current_position.map(|p| p.lat_lng());
        let has_line = state.route.len() > 1;

        Self {
            center: marker.unwrap_or(DEFAULT_MAP_CENTER),
            zoom: if marker.is_some() {
                TRACKING_ZOOM
            } else {
                DEFAULT_ZOOM
            },
            marker,
            polyline: if has_line {
                state.route.iter().map(GeoPoint::lat_lng).collect()
            } else {
                Vec::new()
            },
            encoded_polyline: if has_line {
                encoded_polyline(&state.route)
            } else {
                None
            },
            bounds: if has_line {
                RouteBounds::of(&state.route)
            } else {
                None
            },
        }
    }
}

/// Which session controls are offered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Controls {
    pub can_start: bool,
    pub can_pause: bool,
    pub can_resume: bool,
    pub can_end_and_save: bool,
}

impl Controls {
    pub fn from_state(state: &SessionState) -> Self {
        let paused = state.status == SessionStatus::Paused;
        Self {
            can_start: state.status == SessionStatus::Idle
                && state.error.is_none()
                && state.current_position.is_some(),
            can_pause: state.status == SessionStatus::Running,
            can_resume: paused,
            can_end_and_save: paused,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Spinner {
    Locating,
    Saving,
}

/// Complete run screen: overlays, header stats, controls and map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Screen {
    pub spinner: Option<Spinner>,
    pub permission_request: bool,
    pub error_banner: Option<String>,
    pub stats: Option<LiveStats>,
    pub controls: Controls,
    pub map: MapView,
}

impl Screen {
    pub fn from_state(state: &SessionState, permission_overlay: bool) -> Self {
        let spinner = match state.status {
            SessionStatus::Locating => Some(Spinner::Locating),
            SessionStatus::Saving => Some(Spinner::Saving),
            _ => None,
        };

        // The permission overlay already explains the failure.
        let error_banner = if permission_overlay || state.status == SessionStatus::Locating {
            None
        } else {
            state.error.clone()
        };

        Self {
            spinner,
            permission_request: permission_overlay,
            error_banner,
            stats: LiveStats::from_state(state),
            controls: Controls::from_state(state),
            map: MapView::from_state(state),
        }
    }
}

// ─── Stored runs ────────────────────────────────────────────

/// Summary page for one saved run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RunSummaryView {
    pub id: String,
    /// Long calendar date of the save, e.g. "January 15, 2024"
    pub date: String,
    pub duration: String,
    pub distance: String,
    pub pace: String,
    pub positions: Vec<[f64; 2]>,
    pub bounds: Option<RouteBounds>,
    pub encoded_polyline: String,
    /// Route as a GeoJSON `LineString` feature
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, unknown>"))]
    pub feature: geojson::Feature,
}

impl RunSummaryView {
    /// Fails only if the stored route holds coordinates outside the valid range.
    pub fn from_stored(run: &StoredRun) -> Result<Self> {
        let record = &run.record;
        let encoded_polyline = encode_route(&record.route)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Polyline error: {}", e)))?;

        Ok(Self {
            id: run.id.clone(),
            date: display_date(&record.created_at),
            duration: format_duration(record.duration),
            distance: format_distance(record.distance),
            pace: format_pace(pace_min_per_km(record.duration, record.distance)),
            positions: record.route.iter().map(GeoPoint::lat_lng).collect(),
            bounds: RouteBounds::of(&record.route),
            encoded_polyline,
            feature: route_feature(&record.route),
        })
    }
}

/// One row of the run history list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HistoryEntry {
    pub id: String,
    pub date: String,
    pub distance: String,
    pub duration: String,
    pub pace: String,
}

impl HistoryEntry {
    pub fn from_stored(run: &StoredRun) -> Self {
        let record = &run.record;
        Self {
            id: run.id.clone(),
            date: display_date(&record.created_at),
            distance: format_distance(record.distance),
            duration: format_duration(record.duration),
            pace: format_pace(pace_min_per_km(record.duration, record.distance)),
        }
    }
}

/// Stored timestamps that fail to parse are shown raw.
fn display_date(created_at: &str) -> String {
    format_date(created_at).unwrap_or_else(|| created_at.to_string())
}
