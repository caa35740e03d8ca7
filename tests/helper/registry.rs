//! Registry test utilities

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use check_workflow::parser::types::ActionRef;
use check_workflow::version::error::RegistryError;
use check_workflow::version::registry::ReleaseRegistry;
use check_workflow::version::semver::parse_release_version;
use check_workflow::version::types::Release;

/// Mock registry for testing
///
/// Serves releases from memory and records how often each action was requested.
#[derive(Default)]
pub struct MockRegistry {
    releases: HashMap<String, Vec<String>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register release tags for `owner/repo`, newest first
    pub fn with_releases(mut self, action: &str, tags: Vec<&str>) -> Self {
        self.releases.insert(
            action.to_string(),
            tags.into_iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    /// Number of lookups issued for `owner/repo`
    pub fn calls(&self, action: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(action)
            .copied()
            .unwrap_or_default()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl ReleaseRegistry for MockRegistry {
    async fn fetch_latest_releases(
        &self,
        action: &ActionRef,
        count: usize,
    ) -> Result<Vec<Release>, RegistryError> {
        let name = action.to_string();
        *self.calls.lock().unwrap().entry(name.clone()).or_default() += 1;

        let tags = self
            .releases
            .get(&name)
            .ok_or_else(|| RegistryError::NotFound(name.clone()))?;

        Ok(tags
            .iter()
            .take(count)
            .map(|tag| Release {
                version: parse_release_version(tag).unwrap(),
                tag_name: tag.clone(),
                published: DateTime::parse_from_rfc3339("2024-05-17T14:07:20Z")
                    .unwrap()
                    .with_timezone(&Utc),
                url: format!("https://github.com/{}/releases/tag/{}", name, tag),
            })
            .collect())
    }
}
