//! Latest release lookup through the GraphQL API

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::github::GitHubClient;
use crate::parser::types::ActionRef;
use crate::version::error::RegistryError;
use crate::version::registry::ReleaseRegistry;
use crate::version::semver::parse_release_version;
use crate::version::types::Release;

const RELEASE_QUERY: &str = r#"
query GetLatestReleases($owner: String!, $repo: String!, $n_latest: Int!) {
    repository(owner: $owner, name: $repo) {
        releases(orderBy: {field: CREATED_AT, direction: DESC}, first: $n_latest) {
            nodes {
                tagName
                publishedAt
                url
            }
        }
    }
}
"#;

#[derive(Debug, Deserialize)]
struct ReleaseData {
    repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    releases: ReleaseConnection,
}

#[derive(Debug, Deserialize)]
struct ReleaseConnection {
    nodes: Vec<ReleaseNode>,
}

/// A release node as returned by the API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReleaseNode {
    tag_name: String,
    published_at: Option<String>,
    url: String,
}

impl TryFrom<ReleaseNode> for Release {
    type Error = RegistryError;

    fn try_from(node: ReleaseNode) -> Result<Self, Self::Error> {
        let version = parse_release_version(&node.tag_name).ok_or_else(|| {
            RegistryError::InvalidResponse(format!("Unsupported release tag: {}", node.tag_name))
        })?;

        let published = node
            .published_at
            .as_deref()
            .ok_or_else(|| {
                RegistryError::InvalidResponse(format!("Release {} is unpublished", node.tag_name))
            })
            .and_then(|raw| {
                DateTime::parse_from_rfc3339(raw).map_err(|e| {
                    RegistryError::InvalidResponse(format!("Invalid publishedAt {}: {}", raw, e))
                })
            })?
            .with_timezone(&Utc);

        Ok(Release {
            version,
            tag_name: node.tag_name,
            published,
            url: node.url,
        })
    }
}

#[async_trait::async_trait]
impl ReleaseRegistry for GitHubClient {
    async fn fetch_latest_releases(
        &self,
        action: &ActionRef,
        count: usize,
    ) -> Result<Vec<Release>, RegistryError> {
        let data: ReleaseData = self
            .query(
                RELEASE_QUERY,
                json!({
                    "owner": action.owner,
                    "repo": action.repo,
                    "n_latest": count,
                }),
            )
            .await?;

        let repository = data.repository.ok_or_else(|| {
            warn!("Repository {} not found", action);
            RegistryError::NotFound(action.to_string())
        })?;

        repository
            .releases
            .nodes
            .into_iter()
            .map(Release::try_from)
            .collect()
    }
}
