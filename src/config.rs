//! Synchronisation settings.

use crate::work_item::domain::{BranchName, WorkItemDomainError};
use chrono::TimeDelta;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned while loading or validating [`SyncConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("invalid sync configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A label or prefix is empty after trimming.
    #[error("sync configuration field '{0}' must not be empty")]
    EmptyField(&'static str),

    /// The in-progress and tombstone labels collide.
    #[error("in-progress and tombstone labels must differ, both are '{0}'")]
    DuplicateLabel(String),

    /// The integration branch name is invalid.
    #[error(transparent)]
    Branch(#[from] WorkItemDomainError),
}

/// Settings shared by the synchronisation services.
///
/// # Examples
///
/// ```
/// use canopy::config::SyncConfig;
///
/// let config = SyncConfig::default();
/// assert_eq!(config.integration_branch.as_str(), "main");
/// assert_eq!(config.tombstone_label, "deleted");
///
/// let custom = SyncConfig::from_json_str(r#"{"integration_branch": "trunk"}"#)
///     .expect("valid configuration");
/// assert_eq!(custom.integration_branch.as_str(), "trunk");
/// assert_eq!(custom.branch_prefix, "item-");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Branch that leaf branches are cut from and merged back into.
    pub integration_branch: BranchName,
    /// Prefix of per-leaf branch names.
    pub branch_prefix: String,
    /// Label applied to issues of in-progress leaves.
    pub in_progress_label: String,
    /// Label marking logically deleted issues.
    pub tombstone_label: String,
    /// Category label used when a create request names none.
    pub default_category: String,
    /// Seconds a deletion marker is kept while the tracker's listing does
    /// not yet show the issue as deleted.
    pub tombstone_grace_seconds: u32,
}

impl SyncConfig {
    /// Parses overrides from a JSON document; absent fields keep defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the document is malformed or the merged
    /// settings fail [`Self::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the integration branch.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Branch`] when the name is invalid.
    pub fn with_integration_branch(mut self, name: impl Into<String>) -> Result<Self, ConfigError> {
        self.integration_branch = BranchName::new(name)?;
        Ok(self)
    }

    /// Sets the branch prefix.
    #[must_use]
    pub fn with_branch_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.branch_prefix = prefix.into();
        self
    }

    /// Sets the tombstone label.
    #[must_use]
    pub fn with_tombstone_label(mut self, label: impl Into<String>) -> Self {
        self.tombstone_label = label.into();
        self
    }

    /// Sets the in-progress label.
    #[must_use]
    pub fn with_in_progress_label(mut self, label: impl Into<String>) -> Self {
        self.in_progress_label = label.into();
        self
    }

    /// Sets how long unconfirmed deletion markers are kept.
    #[must_use]
    pub const fn with_tombstone_grace_seconds(mut self, seconds: u32) -> Self {
        self.tombstone_grace_seconds = seconds;
        self
    }

    /// Returns the deletion-marker grace period.
    #[must_use]
    pub fn tombstone_grace(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.tombstone_grace_seconds))
    }

    /// Checks that labels and prefix are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyField`] for blank values and
    /// [`ConfigError::DuplicateLabel`] when the two reserved labels collide.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("branch_prefix", &self.branch_prefix),
            ("in_progress_label", &self.in_progress_label),
            ("tombstone_label", &self.tombstone_label),
            ("default_category", &self.default_category),
        ];
        if let Some((name, _)) = fields.into_iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::EmptyField(name));
        }
        if self.in_progress_label == self.tombstone_label {
            return Err(ConfigError::DuplicateLabel(self.tombstone_label.clone()));
        }
        Ok(())
    }

    /// Labels with workflow meaning that never count as a category.
    #[must_use]
    pub fn reserved_labels(&self) -> [&str; 2] {
        [self.in_progress_label.as_str(), self.tombstone_label.as_str()]
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            integration_branch: BranchName::main(),
            branch_prefix: String::from("item-"),
            in_progress_label: String::from("in-progress"),
            tombstone_label: String::from("deleted"),
            default_category: String::from("task"),
            tombstone_grace_seconds: 300,
        }
    }
}
