// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route geometry: great-circle distance, pace and map encodings.

use crate::models::GeoPoint;
use geo::{BoundingRect, LineString, Rect};

/// Mean Earth radius used for all distance math.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Polyline precision (5 decimal places, the common web-map encoding).
pub const POLYLINE_PRECISION: u32 = 5;

/// Great-circle (haversine) distance between two points, in kilometers.
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Total route length in kilometers: the sum of consecutive haversine legs.
///
/// Always recomputed from the full route, never accumulated.
pub fn route_distance_km(route: &[GeoPoint]) -> f64 {
    route
        .windows(2)
        .map(|leg| haversine_km(&leg[0], &leg[1]))
        .sum()
}

/// Average pace in minutes per kilometer.
///
/// Undefined (`None`) when nothing has been covered yet or no time has passed.
pub fn pace_min_per_km(duration_secs: u64, distance_km: f64) -> Option<f64> {
    if distance_km > 0.0 && duration_secs > 0 {
        Some((duration_secs as f64 / 60.0) / distance_km)
    } else {
        None
    }
}

/// Pace as shown to the user, with `--` as the placeholder.
pub fn format_pace(pace: Option<f64>) -> String {
    match pace {
        Some(p) if p.is_finite() => format!("{:.2}", p),
        _ => "--".to_string(),
    }
}

/// Route as a geo line string (x = longitude, y = latitude).
pub fn route_line_string(route: &[GeoPoint]) -> LineString<f64> {
    route.iter().copied().map(geo::Coord::from).collect()
}

/// Bounding box of the route, used to fit a map viewport.
pub fn route_bounds(route: &[GeoPoint]) -> Option<Rect<f64>> {
    route_line_string(route).bounding_rect()
}

/// Encode the route as a polyline string for compact map hand-off.
pub fn encode_route(route: &[GeoPoint]) -> Result<String, GeometryError> {
    polyline::encode_coordinates(route_line_string(route), POLYLINE_PRECISION)
        .map_err(|e| GeometryError::Polyline(e.to_string()))
}

/// Route as a GeoJSON `LineString` feature.
pub fn route_feature(route: &[GeoPoint]) -> geojson::Feature {
    let line = route_line_string(route);
    geojson::Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(&line))),
        id: None,
        properties: None,
        foreign_members: None,
    }
}

/// Errors from geometry encoding.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("Failed to encode polyline: {0}")]
    Polyline(String),
}
