//! Staleness evaluation for workflow dependencies

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::config::DEFAULT_FETCH_CONCURRENCY;
use crate::parser::types::JobDependency;
use crate::parser::workflow::WorkflowParser;
use crate::version::cache::ReleaseCache;
use crate::version::error::CheckError;
use crate::version::registry::ReleaseRegistry;
use crate::version::types::{OutdatedFinding, OutdatedReport};

/// Options for a single evaluation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOptions {
    /// Maximum number of release lookups in flight at once
    pub fetch_concurrency: usize,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }
}

/// Report dependencies whose pinned constraint excludes the latest release
///
/// Every workflow is parsed before any lookup is issued, so a malformed
/// workflow aborts the whole evaluation without touching the network. Each
/// distinct action is then looked up once through a cache scoped to this call.
/// Lookup failures abort the evaluation as well; no partial report is returned.
///
/// Workflows without findings are omitted from the report.
pub async fn check_workflows<R: ReleaseRegistry + ?Sized>(
    workflows: &IndexMap<String, String>,
    registry: &R,
    options: &CheckOptions,
) -> Result<OutdatedReport, CheckError> {
    let parser = WorkflowParser::new();

    let extracted = workflows
        .iter()
        .map(|(name, raw)| {
            parser
                .parse(raw)
                .map(|dependencies| (name, dependencies))
                .map_err(|source| CheckError::Workflow {
                    workflow: name.clone(),
                    source,
                })
        })
        .collect::<Result<Vec<(&String, Vec<JobDependency>)>, _>>()?;

    let mut cache = ReleaseCache::new();
    cache
        .prefetch(
            registry,
            extracted
                .iter()
                .flat_map(|(_, dependencies)| dependencies.iter().map(|d| &d.uses.action)),
            options.fetch_concurrency,
        )
        .await?;

    let mut report = OutdatedReport::new();
    for (name, dependencies) in extracted {
        let mut findings = Vec::new();

        for dependency in dependencies {
            let latest = cache
                .get_or_fetch(registry, &dependency.uses.action)
                .await?;

            if dependency.uses.constraint.matches(&latest.version) {
                debug!(
                    "{} {} satisfies {}",
                    dependency.uses.action, latest.version, dependency.uses.constraint
                );
                continue;
            }

            debug!(
                "{} {} is outside {} in {}",
                dependency.uses.action, latest.version, dependency.uses.constraint, name
            );
            let latest = latest.clone();
            findings.push(OutdatedFinding { dependency, latest });
        }

        if !findings.is_empty() {
            report.insert(name.clone(), findings);
        }
    }

    info!(
        "Checked {} workflows against {} actions: {} with outdated dependencies",
        workflows.len(),
        cache.len(),
        report.len()
    );

    Ok(report)
}
