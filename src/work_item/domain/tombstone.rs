//! Locally known deletions that external reads may not reflect yet.

use super::IssueNumber;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Set of issue numbers deleted locally, with the time each was marked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TombstoneSet {
    entries: BTreeMap<IssueNumber, DateTime<Utc>>,
}

impl TombstoneSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `number` as deleted.
    ///
    /// Returns `true` when the marker is new; an existing marker keeps its
    /// original timestamp.
    pub fn mark(&mut self, number: IssueNumber, marked_at: DateTime<Utc>) -> bool {
        if self.entries.contains_key(&number) {
            return false;
        }
        self.entries.insert(number, marked_at);
        true
    }

    /// Removes the marker for `number`, returning whether it existed.
    pub fn unmark(&mut self, number: IssueNumber) -> bool {
        self.entries.remove(&number).is_some()
    }

    /// Returns whether `number` is marked.
    #[must_use]
    pub fn contains(&self, number: IssueNumber) -> bool {
        self.entries.contains_key(&number)
    }

    /// Returns when `number` was marked.
    #[must_use]
    pub fn marked_at(&self, number: IssueNumber) -> Option<DateTime<Utc>> {
        self.entries.get(&number).copied()
    }

    /// Returns the marked issue numbers in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = IssueNumber> + '_ {
        self.entries.keys().copied()
    }

    /// Returns the number of markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
