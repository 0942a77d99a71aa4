// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use run_tracker::db::{FirestoreDb, MemoryRunStore};
use run_tracker::models::GeoPoint;
use run_tracker::services::{
    DriverOptions, NotificationId, NotificationLevel, Notifier, NotifyOptions,
    ScriptedLocationProvider, SessionDriver, StaticIdentity,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

// ─── Notifications ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub struct SentNotification {
    pub id: NotificationId,
    pub level: NotificationLevel,
    pub message: String,
    pub options: NotifyOptions,
}

/// Notifier that remembers everything it was asked to show or hide.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentNotification>>,
    dismissed: Mutex<Vec<NotificationId>>,
    next_id: AtomicU64,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn dismissed(&self) -> Vec<NotificationId> {
        self.dismissed.lock().unwrap().clone()
    }

    pub fn messages(&self, level: NotificationLevel) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(
        &self,
        level: NotificationLevel,
        message: &str,
        options: NotifyOptions,
    ) -> NotificationId {
        let id = NotificationId(format!(
            "test-{}",
            self.next_id.fetch_add(1, Ordering::SeqCst)
        ));
        self.sent.lock().unwrap().push(SentNotification {
            id: id.clone(),
            level,
            message: message.to_string(),
            options,
        });
        id
    }

    fn dismiss(&self, id: &NotificationId) {
        self.dismissed.lock().unwrap().push(id.clone());
    }
}

// ─── Driver harness ──────────────────────────────────────────

#[allow(dead_code)]
pub type TestDriver =
    SessionDriver<ScriptedLocationProvider, MemoryRunStore, RecordingNotifier, StaticIdentity>;

/// A driver wired to scripted collaborators, with handles to inspect them.
#[allow(dead_code)]
pub struct Harness {
    pub driver: TestDriver,
    pub provider: Arc<ScriptedLocationProvider>,
    pub store: Arc<MemoryRunStore>,
    pub notifier: Arc<RecordingNotifier>,
}

#[allow(dead_code)]
pub fn harness() -> Harness {
    harness_with(
        ScriptedLocationProvider::new(),
        StaticIdentity::signed_in("runner-1"),
    )
}

#[allow(dead_code)]
pub fn harness_with(provider: ScriptedLocationProvider, identity: StaticIdentity) -> Harness {
    let provider = Arc::new(provider);
    let store = Arc::new(MemoryRunStore::new());
    let notifier = Arc::new(RecordingNotifier::default());

    let driver = SessionDriver::new(
        Arc::clone(&provider),
        Arc::clone(&store),
        Arc::clone(&notifier),
        Arc::new(identity),
        DriverOptions::default(),
    );

    Harness {
        driver,
        provider,
        store,
        notifier,
    }
}

/// Test point near Oslo sentrum.
#[allow(dead_code)]
pub fn point(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint::new(lat, lng, 1_700_000_000_000)
}
