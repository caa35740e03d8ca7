//! GitHub GraphQL API client
//!
//! Two query shapes are used: a directory listing of workflow files
//! ([`workflows`]) and the most recent releases of a repository ([`releases`]).

pub mod releases;
pub mod workflows;

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::GitHubConfig;
use crate::version::error::RegistryError;

const USER_AGENT: &str = concat!(
    "check-workflow/",
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CARGO_PKG_REPOSITORY"),
    ")"
);

/// GraphQL response envelope
#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Client for the GitHub GraphQL API
pub struct GitHubClient {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Creates a new GitHubClient from configuration
    pub fn new(config: &GitHubConfig) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_millis(config.connect_timeout))
            .read_timeout(Duration::from_millis(config.read_timeout))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
        })
    }

    /// Creates a client for a custom endpoint without a token
    pub fn with_endpoint(endpoint: &str) -> Result<Self, RegistryError> {
        Self::new(&GitHubConfig {
            endpoint: endpoint.to_string(),
            ..GitHubConfig::default()
        })
    }

    /// Execute a GraphQL query and decode its `data` field
    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, RegistryError> {
        debug!("POST {} variables={}", self.endpoint, variables);

        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(RegistryError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::FORBIDDEN
        {
            let headers = response.headers();
            let retry_after = headers
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let exhausted = headers
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == "0");

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS
                || retry_after.is_some()
                || exhausted
            {
                return Err(RegistryError::RateLimited {
                    retry_after_secs: retry_after,
                });
            }
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, self.endpoint);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let body: GraphQlResponse<T> = response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub GraphQL response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        if let Some(error) = body.errors.into_iter().next() {
            return Err(match error.kind.as_deref() {
                Some("NOT_FOUND") => RegistryError::NotFound(error.message),
                Some("RATE_LIMITED") => RegistryError::RateLimited {
                    retry_after_secs: None,
                },
                _ => RegistryError::GraphQl(error.message),
            });
        }

        body.data
            .ok_or_else(|| RegistryError::InvalidResponse("response has no data".to_string()))
    }
}
