//! Workflow results paired with the notifications they produced.

use super::SyncError;
use crate::work_item::domain::{Notification, NotificationLevel};
use mockable::Clock;

/// Result of a user-initiated workflow plus its leveled notifications.
#[derive(Debug)]
#[must_use]
pub struct SyncOutcome<T> {
    result: Result<T, SyncError>,
    notifications: Vec<Notification>,
}

impl<T> SyncOutcome<T> {
    /// Returns the workflow result by reference.
    ///
    /// # Errors
    ///
    /// Returns the [`SyncError`] the workflow ended with.
    pub const fn result(&self) -> Result<&T, &SyncError> {
        self.result.as_ref()
    }

    /// Returns the notifications in the order they were raised.
    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Returns whether the workflow succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns whether any notification has `level`.
    #[must_use]
    pub fn has_notification(&self, level: NotificationLevel) -> bool {
        self.notifications
            .iter()
            .any(|notification| notification.level() == level)
    }

    /// Consumes the outcome, returning the result.
    ///
    /// # Errors
    ///
    /// Returns the [`SyncError`] the workflow ended with.
    pub fn into_result(self) -> Result<T, SyncError> {
        self.result
    }

    /// Consumes the outcome, returning result and notifications.
    pub fn into_parts(self) -> (Result<T, SyncError>, Vec<Notification>) {
        (self.result, self.notifications)
    }
}

/// Collects notifications while a workflow runs.
pub(crate) struct Notices<'c, C: Clock> {
    clock: &'c C,
    raised: Vec<Notification>,
}

impl<'c, C: Clock> Notices<'c, C> {
    pub(crate) const fn new(clock: &'c C) -> Self {
        Self {
            clock,
            raised: Vec::new(),
        }
    }

    pub(crate) fn raise(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.raised
            .push(Notification::new(level, message, self.clock));
    }

    pub(crate) fn success(&mut self, message: impl Into<String>) {
        self.raise(NotificationLevel::Success, message);
    }

    pub(crate) fn info(&mut self, message: impl Into<String>) {
        self.raise(NotificationLevel::Info, message);
    }

    pub(crate) fn warning(&mut self, message: impl Into<String>) {
        self.raise(NotificationLevel::Warning, message);
    }

    /// Closes the workflow; failures gain a trailing error notification.
    pub(crate) fn finish<T>(mut self, result: Result<T, SyncError>) -> SyncOutcome<T> {
        if let Err(error) = &result {
            self.raise(NotificationLevel::Error, error.to_string());
        }
        SyncOutcome {
            result,
            notifications: self.raised,
        }
    }
}
