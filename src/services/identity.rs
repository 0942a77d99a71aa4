// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed-in user lookup.

/// Source of the currently signed-in user.
pub trait Identity: Send + Sync {
    /// ID of the signed-in user, if any.
    fn current_user(&self) -> Option<String>;
}

/// Identity fixed at startup (from configuration).
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    user_id: Option<String>,
}

impl StaticIdentity {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }
}

impl Identity for StaticIdentity {
    fn current_user(&self) -> Option<String> {
        self.user_id.clone()
    }
}
