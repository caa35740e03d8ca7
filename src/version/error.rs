use thiserror::Error;

use crate::parser::error::ParseError;
use crate::parser::types::ActionRef;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Unauthorized: check the configured GitHub token")]
    Unauthorized,

    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("No releases published for {0}")]
    NoReleases(String),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Failed to read dependencies of {workflow}: {source}")]
    Workflow {
        workflow: String,
        #[source]
        source: ParseError,
    },

    #[error("Failed to look up the latest release of {action}: {source}")]
    Lookup {
        action: ActionRef,
        #[source]
        source: RegistryError,
    },
}
