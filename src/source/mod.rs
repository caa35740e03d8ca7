//! Workflow sources
//!
//! A source yields `<filename>: <file contents>` for every workflow file it
//! can see, either from a local directory ([`LocalSource`]) or from a
//! repository on GitHub ([`RemoteSource`]).

pub mod local;
pub mod remote;

use std::path::PathBuf;

use indexmap::IndexMap;
use thiserror::Error;

use crate::version::error::RegistryError;

pub use local::LocalSource;
pub use remote::RemoteSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch remote workflows: {0}")]
    Remote(#[from] RegistryError),
}

/// Trait for loading workflow definitions
#[async_trait::async_trait]
pub trait WorkflowSource: Send + Sync {
    /// Load all workflow files, keyed by file name
    async fn fetch_workflows(&self) -> Result<IndexMap<String, String>, SourceError>;
}

/// Check whether a file name looks like a workflow definition
pub fn is_workflow_file(name: &str) -> bool {
    name.ends_with(".yml") || name.ends_with(".yaml")
}
