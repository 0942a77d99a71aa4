// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Runs live in the `runs` collection under generated document IDs. They
//! are written once and only ever read back afterwards.

use crate::db::{collections, RunStore};
use crate::error::AppError;
use crate::models::{GeoPoint, RunRecord, StoredRun};
use serde::Deserialize;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Run document as returned by a collection query, including its ID.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunDocument {
    #[serde(alias = "_firestore_id")]
    id: Option<String>,
    user_id: String,
    start_time: i64,
    duration: u64,
    route: Vec<GeoPoint>,
    distance: f64,
    created_at: String,
}

impl RunDocument {
    fn into_stored(self) -> Option<StoredRun> {
        let id = self.id?;
        Some(StoredRun {
            id,
            record: RunRecord {
                user_id: self.user_id,
                start_time: self.start_time,
                duration: self.duration,
                route: self.route,
                distance: self.distance,
                created_at: self.created_at,
            },
        })
    }
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // The emulator accepts any bearer token.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Run Operations ──────────────────────────────────────────

    /// Insert a run under a fresh document ID.
    pub async fn insert_run(&self, record: &RunRecord) -> Result<String, AppError> {
        let run_id = uuid::Uuid::new_v4().simple().to_string();

        let _: RunRecord = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::RUNS)
            .document_id(&run_id)
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(run_id = %run_id, user_id = %record.user_id, "Inserted run");
        Ok(run_id)
    }

    /// Get a run by document ID.
    pub async fn get_run(&self, run_id: &str) -> Result<Option<RunRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::RUNS)
            .obj()
            .one(run_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All runs for a user, newest first.
    pub async fn get_runs_for_user(&self, user_id: &str) -> Result<Vec<StoredRun>, AppError> {
        let user_id = user_id.to_string();
        let documents: Vec<RunDocument> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::RUNS)
            .filter(move |q| q.for_all([q.field("userId").eq(user_id.clone())]))
            .order_by([("createdAt", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let total = documents.len();
        let runs: Vec<StoredRun> = documents
            .into_iter()
            .filter_map(RunDocument::into_stored)
            .collect();

        if runs.len() != total {
            tracing::warn!(
                skipped = total - runs.len(),
                "Run documents returned without an ID"
            );
        }

        Ok(runs)
    }
}

impl RunStore for FirestoreDb {
    async fn create_record(&self, record: &RunRecord) -> Result<String, AppError> {
        self.insert_run(record).await
    }

    async fn get_record(&self, run_id: &str) -> Result<Option<RunRecord>, AppError> {
        self.get_run(run_id).await
    }

    async fn query_records_by_owner(&self, user_id: &str) -> Result<Vec<StoredRun>, AppError> {
        self.get_runs_for_user(user_id).await
    }
}
