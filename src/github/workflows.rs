//! Workflow directory listing through the GraphQL API

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::github::GitHubClient;
use crate::source::is_workflow_file;
use crate::version::error::RegistryError;

const WORKFLOW_QUERY: &str = r#"
query GetWorkflows($owner: String!, $repo: String!, $target: String!) {
    repository(owner: $owner, name: $repo) {
        object(expression: $target) {
            ... on Tree {
                entries {
                    name
                    object {
                        ... on Blob {
                            text
                        }
                    }
                }
            }
        }
    }
}
"#;

#[derive(Debug, Deserialize)]
struct WorkflowData {
    repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    object: Option<TreeObject>,
}

#[derive(Debug, Deserialize)]
struct TreeObject {
    entries: Option<Vec<TreeEntry>>,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    name: String,
    object: Option<BlobObject>,
}

#[derive(Debug, Deserialize)]
struct BlobObject {
    text: Option<String>,
}

impl GitHubClient {
    /// Fetch all workflow files under `root` at `reference`
    ///
    /// Returns `<filename>: <file contents>` in the order the API lists them.
    /// Subdirectories, binary blobs and non-workflow files are skipped.
    pub async fn fetch_workflows(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        root: &str,
    ) -> Result<IndexMap<String, String>, RegistryError> {
        let target = format!("{}:{}", reference, root.trim_end_matches('/'));
        let data: WorkflowData = self
            .query(
                WORKFLOW_QUERY,
                json!({ "owner": owner, "repo": repo, "target": target }),
            )
            .await?;

        let entries = data
            .repository
            .ok_or_else(|| RegistryError::NotFound(format!("{}/{}", owner, repo)))?
            .object
            .ok_or_else(|| RegistryError::NotFound(format!("{}/{} {}", owner, repo, target)))?
            .entries
            .ok_or_else(|| {
                RegistryError::InvalidResponse(format!("{} is not a directory", target))
            })?;

        let workflows: IndexMap<String, String> = entries
            .into_iter()
            .filter(|entry| is_workflow_file(&entry.name))
            .filter_map(|entry| {
                let text = entry.object.and_then(|blob| blob.text)?;
                Some((entry.name, text))
            })
            .collect();

        debug!("Fetched {} workflows from {}/{} {}", workflows.len(), owner, repo, target);
        Ok(workflows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn fetch_workflows_returns_workflow_files_only() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({
                "variables": {
                    "owner": "sco1",
                    "repo": "flake8-annotations",
                    "target": "main:.github/workflows"
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data": {"repository": {"object": {"entries": [
                    {"name": "lint_test.yml", "object": {"text": "jobs: {}\n"}},
                    {"name": "pypi_release.yml", "object": {"text": "jobs: {}\n"}},
                    {"name": "README.md", "object": {"text": "docs"}},
                    {"name": "templates.yml", "object": {}}
                ]}}}}"#,
            )
            .create_async()
            .await;

        let client = GitHubClient::with_endpoint(&format!("{}/graphql", server.url())).unwrap();
        let workflows = client
            .fetch_workflows("sco1", "flake8-annotations", "main", ".github/workflows/")
            .await
            .unwrap();

        mock.assert_async().await;
        let names: Vec<&str> = workflows.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["lint_test.yml", "pypi_release.yml"]);
    }

    #[tokio::test]
    async fn fetch_workflows_returns_not_found_for_missing_path() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"repository": {"object": null}}}"#)
            .create_async()
            .await;

        let client = GitHubClient::with_endpoint(&format!("{}/graphql", server.url())).unwrap();
        let result = client
            .fetch_workflows("owner", "repo", "HEAD", ".github/workflows")
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(RegistryError::NotFound(_))));
    }
}
