//! Common types for parsers

use std::fmt;

use crate::version::semver::VersionConstraint;

/// Identifies a third-party action (e.g., `actions/checkout`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionRef {
    pub owner: String,
    pub repo: String,
}

impl ActionRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// An action reference together with the constraint derived from its pinned version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsesSpec {
    pub action: ActionRef,
    pub constraint: VersionConstraint,
}

/// One `uses:` occurrence within a workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDependency {
    /// Key of the job the step belongs to
    pub job: String,
    /// Display name of the step, if it declares one
    pub step_name: Option<String>,
    pub uses: UsesSpec,
}
