// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User notifications (toasts).
//!
//! Notifications are fire-and-forget, except that a caller can keep the
//! returned [`NotificationId`] and later [`dismiss`](Notifier::dismiss) it.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl NotificationLevel {
    /// How long a notification stays up when the caller does not say.
    pub fn default_duration(self) -> Duration {
        match self {
            NotificationLevel::Success | NotificationLevel::Info => Duration::from_secs(3),
            NotificationLevel::Warning | NotificationLevel::Error => Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationId(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyOptions {
    /// `None` uses the level's default duration
    pub duration: Option<Duration>,
    /// Stay up until explicitly dismissed
    pub persistent: bool,
}

impl NotifyOptions {
    pub fn persistent() -> Self {
        Self {
            duration: None,
            persistent: true,
        }
    }
}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(
        &self,
        level: NotificationLevel,
        message: &str,
        options: NotifyOptions,
    ) -> NotificationId;

    fn dismiss(&self, id: &NotificationId);
}

/// Notifier that writes notifications to the structured log.
#[derive(Debug, Default)]
pub struct TracingNotifier {
    next_id: AtomicU64,
}

impl TracingNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for TracingNotifier {
    fn notify(
        &self,
        level: NotificationLevel,
        message: &str,
        options: NotifyOptions,
    ) -> NotificationId {
        let id = format!("n{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let duration_ms = if options.persistent {
            None
        } else {
            Some(
                options
                    .duration
                    .unwrap_or_else(|| level.default_duration())
                    .as_millis() as u64,
            )
        };

        match level {
            NotificationLevel::Success | NotificationLevel::Info => {
                tracing::info!(id = %id, ?level, ?duration_ms, "{}", message)
            }
            NotificationLevel::Warning => {
                tracing::warn!(id = %id, ?level, ?duration_ms, "{}", message)
            }
            NotificationLevel::Error => {
                tracing::error!(id = %id, ?level, ?duration_ms, "{}", message)
            }
        }

        NotificationId(id)
    }

    fn dismiss(&self, id: &NotificationId) {
        tracing::debug!(id = %id.0, "Notification dismissed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_durations() {
        assert_eq!(
            NotificationLevel::Success.default_duration(),
            Duration::from_secs(3)
        );
        assert_eq!(
            NotificationLevel::Warning.default_duration(),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_tracing_notifier_issues_unique_ids() {
        let notifier = TracingNotifier::new();
        let a = notifier.notify(NotificationLevel::Info, "a", NotifyOptions::default());
        let b = notifier.notify(NotificationLevel::Warning, "b", NotifyOptions::persistent());
        assert_ne!(a, b);
    }
}
