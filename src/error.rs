// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.

/// Application error type shared by the store, services and driver.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for failures the user cannot fix by retrying the same input.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            AppError::NotFound(_) | AppError::BadRequest(_) | AppError::Validation(_)
        )
    }
}

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, AppError>;
