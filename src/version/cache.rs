//! Per-evaluation release cache
//!
//! Holds at most one latest release per action. A cache lives for a single
//! evaluation call, so every call starts empty and calls never share state.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use futures::{StreamExt, TryStreamExt, stream};
use indexmap::IndexSet;
use tracing::{debug, info};

use crate::parser::types::ActionRef;
use crate::version::error::CheckError;
use crate::version::registry::{ReleaseRegistry, fetch_latest};
use crate::version::types::Release;

#[derive(Debug, Default)]
pub struct ReleaseCache {
    releases: HashMap<ActionRef, Release>,
}

impl ReleaseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    pub fn get(&self, action: &ActionRef) -> Option<&Release> {
        self.releases.get(action)
    }

    /// Fetch the latest release of every distinct action not yet cached
    ///
    /// Actions are deduplicated before any request is issued, so each one is
    /// fetched exactly once no matter how often it appears. Up to `concurrency`
    /// lookups run at a time. The first failure aborts the prefetch.
    pub async fn prefetch<'a, R, I>(
        &mut self,
        registry: &R,
        actions: I,
        concurrency: usize,
    ) -> Result<(), CheckError>
    where
        R: ReleaseRegistry + ?Sized,
        I: IntoIterator<Item = &'a ActionRef>,
    {
        let missing: IndexSet<&ActionRef> = actions
            .into_iter()
            .filter(|action| !self.releases.contains_key(*action))
            .collect();

        if missing.is_empty() {
            debug!("All actions are already cached");
            return Ok(());
        }

        debug!("Fetching latest releases for: {:?}", missing);
        let fetched: Vec<(ActionRef, Release)> = stream::iter(missing)
            .map(|action| async move {
                lookup(registry, action)
                    .await
                    .map(|release| (action.clone(), release))
            })
            .buffer_unordered(concurrency.max(1))
            .try_collect()
            .await?;

        info!("Fetched latest releases for {} actions", fetched.len());
        self.releases.extend(fetched);

        Ok(())
    }

    /// Return the cached release for `action`, fetching it on a miss
    pub async fn get_or_fetch<R: ReleaseRegistry + ?Sized>(
        &mut self,
        registry: &R,
        action: &ActionRef,
    ) -> Result<&Release, CheckError> {
        match self.releases.entry(action.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let release = lookup(registry, action).await?;
                Ok(entry.insert(release))
            }
        }
    }
}

async fn lookup<R: ReleaseRegistry + ?Sized>(
    registry: &R,
    action: &ActionRef,
) -> Result<Release, CheckError> {
    debug!("Looking up latest release of {}", action);
    fetch_latest(registry, action)
        .await
        .map_err(|source| CheckError::Lookup {
            action: action.clone(),
            source,
        })
}
