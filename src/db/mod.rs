// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore, plus an in-memory store for tests and offline use).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryRunStore;

use crate::error::Result;
use crate::models::{RunRecord, StoredRun};
use std::future::Future;

/// Collection names as constants.
pub mod collections {
    pub const RUNS: &str = "runs";
}

/// Storage for completed runs.
pub trait RunStore: Send + Sync {
    /// Persist a new run and return its document ID.
    fn create_record(&self, record: &RunRecord) -> impl Future<Output = Result<String>> + Send;

    /// Fetch one run by document ID.
    fn get_record(&self, run_id: &str) -> impl Future<Output = Result<Option<RunRecord>>> + Send;

    /// All runs of one owner, newest first by `createdAt`.
    fn query_records_by_owner(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<StoredRun>>> + Send;
}
