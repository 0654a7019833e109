//! Identifier and validated scalar types for the work-item domain.

use super::WorkItemDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Positive issue number assigned by the external tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueNumber(u64);

impl IssueNumber {
    /// Creates a validated issue number.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemDomainError::InvalidIssueNumber`] when the value is
    /// zero.
    pub const fn new(value: u64) -> Result<Self, WorkItemDomainError> {
        if value == 0 {
            return Err(WorkItemDomainError::InvalidIssueNumber(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IssueNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a work item in the local tree.
///
/// Items confirmed by the tracker carry the issue number it assigned. Items
/// still being created carry a locally minted placeholder that is swapped
/// for the confirmed identifier once creation succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum WorkItemId {
    /// Identifier assigned by the external tracker.
    Issue(IssueNumber),
    /// Temporary identifier for an item awaiting external creation.
    Placeholder(Uuid),
}

impl WorkItemId {
    /// Mints a fresh placeholder identifier.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::Placeholder(Uuid::new_v4())
    }

    /// Returns the tracker issue number for confirmed items.
    #[must_use]
    pub const fn issue_number(self) -> Option<IssueNumber> {
        match self {
            Self::Issue(number) => Some(number),
            Self::Placeholder(_) => None,
        }
    }

    /// Returns whether the identifier is a local placeholder.
    #[must_use]
    pub const fn is_placeholder(self) -> bool {
        matches!(self, Self::Placeholder(_))
    }
}

impl From<IssueNumber> for WorkItemId {
    fn from(value: IssueNumber) -> Self {
        Self::Issue(value)
    }
}

impl fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issue(number) => write!(f, "#{number}"),
            Self::Placeholder(uuid) => write!(f, "tmp-{uuid}"),
        }
    }
}

/// Normalized external repository identifier in `owner/repo` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryFullName(String);

impl RepositoryFullName {
    /// Creates a validated repository name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemDomainError::InvalidRepository`] if the value does not
    /// contain exactly one slash-delimited owner and repository segment.
    pub fn new(value: impl Into<String>) -> Result<Self, WorkItemDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let mut segments = normalized.split('/');
        let owner = segments.next().unwrap_or_default();
        let repo = segments.next().unwrap_or_default();
        let has_more_segments = segments.next().is_some();
        let is_valid = !owner.is_empty()
            && !repo.is_empty()
            && !has_more_segments
            && !normalized.chars().any(char::is_whitespace);

        if !is_valid {
            return Err(WorkItemDomainError::InvalidRepository(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the repository name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RepositoryFullName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RepositoryFullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
