// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Summary and history lookups over the in-memory store.

use run_tracker::db::{MemoryRunStore, RunStore};
use run_tracker::error::AppError;
use run_tracker::models::{GeoPoint, RunRecord};
use run_tracker::services::RunService;
use std::sync::Arc;

fn record(user_id: &str, created_at: &str, duration: u64, distance: f64) -> RunRecord {
    RunRecord {
        user_id: user_id.to_string(),
        start_time: 1_700_000_000_000,
        duration,
        route: vec![
            GeoPoint::new(59.9139, 10.7522, 1_700_000_000_000),
            GeoPoint::new(59.9230, 10.7522, 1_700_000_600_000),
        ],
        distance,
        created_at: created_at.to_string(),
    }
}

#[tokio::test]
async fn test_summary_of_saved_run() {
    let store = Arc::new(MemoryRunStore::new());
    let run_id = store
        .create_record(&record("alice", "2024-06-01T07:15:00.000Z", 1800, 6.0))
        .await
        .unwrap();

    let summary = RunService::new(Arc::clone(&store))
        .summary(&run_id)
        .await
        .unwrap();

    assert_eq!(summary.id, run_id);
    assert_eq!(summary.date, "June 1, 2024");
    assert_eq!(summary.duration, "30:00");
    assert_eq!(summary.distance, "6.00");
    assert_eq!(summary.pace, "5.00");
    assert_eq!(summary.positions[0], [59.9139, 10.7522]);
    assert!(summary.bounds.is_some());
    assert!(!summary.encoded_polyline.is_empty());
}

#[tokio::test]
async fn test_summary_of_unknown_run_is_not_found() {
    let service = RunService::new(Arc::new(MemoryRunStore::new()));

    let err = service.summary("nope").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(err.is_permanent());
}

#[tokio::test]
async fn test_summary_of_corrupt_route_is_internal_error() {
    let store = Arc::new(MemoryRunStore::new());
    let mut corrupt = record("alice", "2024-06-01T07:15:00.000Z", 1800, 6.0);
    corrupt.route[0].lat = -120.0;
    let run_id = store.create_record(&corrupt).await.unwrap();

    let err = RunService::new(store).summary(&run_id).await.unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));
}

#[tokio::test]
async fn test_summary_requires_run_id() {
    let service = RunService::new(Arc::new(MemoryRunStore::new()));

    let err = service.summary("  ").await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_history_lists_own_runs_newest_first() {
    let store = Arc::new(MemoryRunStore::new());
    store
        .create_record(&record("alice", "2024-05-01T07:00:00.000Z", 1200, 4.0))
        .await
        .unwrap();
    store
        .create_record(&record("alice", "2024-05-03T07:00:00.000Z", 3600, 10.0))
        .await
        .unwrap();
    store
        .create_record(&record("bob", "2024-05-02T07:00:00.000Z", 600, 2.0))
        .await
        .unwrap();

    let history = RunService::new(store).history("alice").await.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].date, "May 3, 2024");
    assert_eq!(history[0].duration, "01:00:00");
    assert_eq!(history[0].pace, "6.00");
    assert_eq!(history[1].date, "May 1, 2024");
}

#[tokio::test]
async fn test_history_empty_for_new_user() {
    let service = RunService::new(Arc::new(MemoryRunStore::new()));
    assert!(service.history("carol").await.unwrap().is_empty());
}
