//! Branch value objects tied to leaf work items.

use super::{IssueNumber, RepositoryFullName, WorkItemDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a validated branch name.
const MAX_BRANCH_NAME_LENGTH: usize = 200;

/// Validated Git branch name.
///
/// Branch names must be non-empty after trimming, must not contain colon
/// characters or whitespace, and must not exceed `MAX_BRANCH_NAME_LENGTH`
/// characters.
///
/// # Examples
///
///     use canopy::work_item::domain::BranchName;
///
///     let name = BranchName::new("main").expect("valid");
///     assert_eq!(name.as_str(), "main");
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Creates a validated branch name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemDomainError::InvalidBranchName`] when the value is
    /// empty, contains a colon or whitespace, or exceeds the length limit.
    pub fn new(value: impl Into<String>) -> Result<Self, WorkItemDomainError> {
        let raw = value.into();
        let normalized = raw.trim();

        if Self::is_invalid_branch_name(normalized) {
            return Err(WorkItemDomainError::InvalidBranchName(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the conventional `main` integration branch.
    #[must_use]
    pub fn main() -> Self {
        Self(String::from("main"))
    }

    fn is_invalid_branch_name(name: &str) -> bool {
        let is_empty = name.is_empty();
        let contains_forbidden_char = name.contains(':') || name.chars().any(char::is_whitespace);
        let exceeds_length_limit = name.len() > MAX_BRANCH_NAME_LENGTH;

        is_empty || contains_forbidden_char || exceeds_length_limit
    }

    /// Returns the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for BranchName {
    type Error = WorkItemDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BranchName> for String {
    fn from(value: BranchName) -> Self {
        value.0
    }
}

/// Branch owned by exactly one leaf item in one repository.
///
/// Named `<prefix><issue number>`, `item-42` with the default prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchHandle {
    repository: RepositoryFullName,
    issue_number: IssueNumber,
    name: BranchName,
}

impl BranchHandle {
    /// Builds the handle for a leaf's branch.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemDomainError::InvalidBranchName`] when the prefix
    /// produces an invalid branch name.
    pub fn for_item(
        repository: RepositoryFullName,
        issue_number: IssueNumber,
        prefix: &str,
    ) -> Result<Self, WorkItemDomainError> {
        let name = BranchName::new(format!("{prefix}{issue_number}"))?;
        Ok(Self {
            repository,
            issue_number,
            name,
        })
    }

    /// Returns the repository the branch lives in.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryFullName {
        &self.repository
    }

    /// Returns the issue number of the owning leaf.
    #[must_use]
    pub const fn issue_number(&self) -> IssueNumber {
        self.issue_number
    }

    /// Returns the branch name.
    #[must_use]
    pub const fn name(&self) -> &BranchName {
        &self.name
    }
}

impl fmt::Display for BranchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.name)
    }
}

/// Lifecycle position of a leaf's branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchLifecycleState {
    /// No branch exists for the leaf.
    NoBranch,
    /// The branch exists and carries in-flight work.
    BranchActive,
    /// The branch was merged and/or deleted.
    Resolved,
}

impl BranchLifecycleState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoBranch => "no_branch",
            Self::BranchActive => "branch_active",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for BranchLifecycleState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
