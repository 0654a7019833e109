//! Leveled messages reported alongside workflow results.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    /// The operation completed.
    Success,
    /// The operation failed.
    Error,
    /// The operation completed with a degraded side effect.
    Warning,
    /// Informational detail.
    Info,
}

impl NotificationLevel {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Message for the notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    level: NotificationLevel,
    message: String,
    emitted_at: DateTime<Utc>,
}

impl Notification {
    /// Creates a notification stamped with the clock's current time.
    #[must_use]
    pub fn new(level: NotificationLevel, message: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            level,
            message: message.into(),
            emitted_at: clock.utc(),
        }
    }

    /// Returns the severity.
    #[must_use]
    pub const fn level(&self) -> NotificationLevel {
        self.level
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns when the notification was produced.
    #[must_use]
    pub const fn emitted_at(&self) -> DateTime<Utc> {
        self.emitted_at
    }
}
