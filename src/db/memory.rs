// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory run store.

use crate::db::RunStore;
use crate::error::{AppError, Result};
use crate::models::{RunRecord, StoredRun};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Run store kept in process memory. Contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryRunStore {
    runs: DashMap<String, RunRecord>,
    /// Number of `create_record` calls, successful or not
    create_calls: AtomicUsize,
    /// When set, every write fails with a database error
    fail_writes: AtomicBool,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail (simulates an unreachable backend).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

impl RunStore for MemoryRunStore {
    async fn create_record(&self, record: &RunRecord) -> Result<String> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database("Write rejected (offline)".to_string()));
        }

        let run_id = uuid::Uuid::new_v4().simple().to_string();
        self.runs.insert(run_id.clone(), record.clone());
        Ok(run_id)
    }

    async fn get_record(&self, run_id: &str) -> Result<Option<RunRecord>> {
        Ok(self.runs.get(run_id).map(|entry| entry.value().clone()))
    }

    async fn query_records_by_owner(&self, user_id: &str) -> Result<Vec<StoredRun>> {
        let mut runs: Vec<StoredRun> = self
            .runs
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| StoredRun {
                id: entry.key().clone(),
                record: entry.value().clone(),
            })
            .collect();

        // Newest first
        runs.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));
        Ok(runs)
    }
}
