// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Location sample model.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A single location fix as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GeoPoint {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
    /// Fix time in milliseconds since the Unix epoch
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub timestamp: i64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64, timestamp: i64) -> Self {
        Self {
            lat,
            lng,
            timestamp,
        }
    }

    /// `[lat, lng]` pair in the order map widgets expect.
    pub fn lat_lng(&self) -> [f64; 2] {
        [self.lat, self.lng]
    }
}

impl From<GeoPoint> for geo::Coord<f64> {
    /// geo uses x = longitude, y = latitude.
    fn from(point: GeoPoint) -> Self {
        geo::coord! { x: point.lng, y: point.lat }
    }
}
