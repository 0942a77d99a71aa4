// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Completed run record for storage.

use crate::models::GeoPoint;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Minimum number of route points for a run to be worth saving.
pub const MIN_ROUTE_POINTS: usize = 2;

/// Stored run record in Firestore (`runs` collection).
///
/// Written once at save time and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    /// Owner (identity provider user ID)
    #[validate(length(min = 1, message = "owner is required"))]
    pub user_id: String,
    /// When the user pressed start (ms since epoch)
    pub start_time: i64,
    /// Active duration in seconds (pauses excluded)
    pub duration: u64,
    /// Every recorded fix, in chronological order
    #[validate(length(min = 2, message = "a run needs at least two route points"))]
    pub route: Vec<GeoPoint>,
    /// Total distance in kilometers, computed from `route` at save time
    #[validate(range(min = 0.0, message = "distance cannot be negative"))]
    pub distance: f64,
    /// Save time (RFC3339, UTC)
    pub created_at: String,
}

/// A run read back from the store together with its document ID.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRun {
    pub id: String,
    pub record: RunRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(points: usize) -> RunRecord {
        RunRecord {
            user_id: "runner-1".to_string(),
            start_time: 1_700_000_000_000,
            duration: 600,
            route: (0..points)
                .map(|i| GeoPoint::new(59.9 + i as f64 * 0.001, 10.75, 1_700_000_000_000))
                .collect(),
            distance: 1.2,
            created_at: "2024-01-15T10:30:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = serde_json::to_value(make_record(2)).unwrap();

        for key in ["userId", "startTime", "duration", "route", "distance", "createdAt"] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn test_validation_rejects_single_point_route() {
        assert!(make_record(2).validate().is_ok());

        let err = make_record(1).validate().unwrap_err();
        assert!(err.field_errors().contains_key("route"));
    }

    #[test]
    fn test_validation_rejects_missing_owner() {
        let mut record = make_record(3);
        record.user_id.clear();
        assert!(record.validate().is_err());
    }
}
