//! Release and report types

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use semver::Version;

use crate::parser::types::JobDependency;

/// A published upstream release of an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: Version,
    /// Tag name as published (e.g., "v4.1.0")
    pub tag_name: String,
    pub published: DateTime<Utc>,
    pub url: String,
}

/// A dependency whose constraint excludes the latest release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutdatedFinding {
    pub dependency: JobDependency,
    pub latest: Release,
}

/// Outdated findings keyed by workflow name, in the caller's workflow order
///
/// Workflows without findings are omitted.
pub type OutdatedReport = IndexMap<String, Vec<OutdatedFinding>>;
