// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read side for saved runs: the summary page and the history list.

use crate::db::RunStore;
use crate::error::{AppError, Result};
use crate::models::StoredRun;
use crate::views::{HistoryEntry, RunSummaryView};
use std::sync::Arc;

/// Looks up saved runs and projects them into view models.
pub struct RunService<S: RunStore> {
    store: Arc<S>,
}

impl<S: RunStore> Clone for RunService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: RunStore> RunService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Summary of the run saved under `run_id`.
    pub async fn summary(&self, run_id: &str) -> Result<RunSummaryView> {
        let run_id = run_id.trim();
        if run_id.is_empty() {
            return Err(AppError::BadRequest("Missing run ID".to_string()));
        }

        let record = self
            .store
            .get_record(run_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Run {}", run_id)))?;

        RunSummaryView::from_stored(&StoredRun {
            id: run_id.to_string(),
            record,
        })
    }

    /// Every run of `user_id`, newest first.
    pub async fn history(&self, user_id: &str) -> Result<Vec<HistoryEntry>> {
        let runs = self.store.query_records_by_owner(user_id).await?;
        tracing::debug!(user_id, count = runs.len(), "Loaded run history");
        Ok(runs.iter().map(HistoryEntry::from_stored).collect())
    }
}
