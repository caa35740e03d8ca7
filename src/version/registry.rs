//! Registry trait for fetching action releases from a remote source

#[cfg(test)]
use mockall::automock;

use crate::parser::types::ActionRef;
use crate::version::error::RegistryError;
use crate::version::types::Release;

/// Trait for fetching releases of an action
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseRegistry: Send + Sync {
    /// Fetches the most recent releases of an action
    ///
    /// # Arguments
    /// * `action` - The action repository (e.g., `actions/checkout`)
    /// * `count` - Maximum number of releases to return
    ///
    /// # Returns
    /// * `Ok(Vec<Release>)` - Releases ordered from newest to oldest
    /// * `Err(RegistryError)` - If the fetch fails
    async fn fetch_latest_releases(
        &self,
        action: &ActionRef,
        count: usize,
    ) -> Result<Vec<Release>, RegistryError>;
}

/// Fetch the newest release of an action
///
/// Fails with `RegistryError::NoReleases` instead of returning a default when
/// the action has never published a release.
pub async fn fetch_latest<R: ReleaseRegistry + ?Sized>(
    registry: &R,
    action: &ActionRef,
) -> Result<Release, RegistryError> {
    registry
        .fetch_latest_releases(action, 1)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| RegistryError::NoReleases(action.to_string()))
}
