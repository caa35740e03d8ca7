//! Workflows fetched from a GitHub repository

use indexmap::IndexMap;

use crate::config::{DEFAULT_REMOTE_REF, DEFAULT_WORKFLOW_ROOT};
use crate::github::GitHubClient;
use crate::source::{SourceError, WorkflowSource};

/// Reads workflow files from a repository tree at a given ref and path
pub struct RemoteSource<'a> {
    client: &'a GitHubClient,
    owner: String,
    repo: String,
    reference: String,
    root: String,
}

impl<'a> RemoteSource<'a> {
    /// Targets the default workflow directory on the default branch
    pub fn new(client: &'a GitHubClient, owner: &str, repo: &str) -> Self {
        Self {
            client,
            owner: owner.to_string(),
            repo: repo.to_string(),
            reference: DEFAULT_REMOTE_REF.to_string(),
            root: DEFAULT_WORKFLOW_ROOT.to_string(),
        }
    }

    pub fn with_reference(mut self, reference: &str) -> Self {
        self.reference = reference.to_string();
        self
    }

    pub fn with_root(mut self, root: &str) -> Self {
        self.root = root.to_string();
        self
    }
}

#[async_trait::async_trait]
impl WorkflowSource for RemoteSource<'_> {
    async fn fetch_workflows(&self) -> Result<IndexMap<String, String>, SourceError> {
        let workflows = self
            .client
            .fetch_workflows(&self.owner, &self.repo, &self.reference, &self.root)
            .await?;
        Ok(workflows)
    }
}
