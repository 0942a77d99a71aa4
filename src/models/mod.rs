// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod geo_point;
pub mod run;
pub mod session;

pub use geo_point::GeoPoint;
pub use run::{RunRecord, StoredRun, MIN_ROUTE_POINTS};
pub use session::{reduce, SessionEvent, SessionState, SessionStatus};
