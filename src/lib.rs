//! Report GitHub Actions dependencies whose pinned version no longer admits
//! the latest upstream release.
//!
//! # Modules
//!
//! - [`parser`]: Extracts `uses:` dependencies from workflow YAML
//! - [`version`]: Version constraints, release lookup and staleness evaluation
//! - [`github`]: GitHub GraphQL client (releases and workflow listings)
//! - [`source`]: Local and remote workflow sources
//! - [`report`]: Plain text and markdown report rendering
//! - [`config`]: Configuration file, environment overrides and constants
//! - [`logging`]: Tracing subscriber setup

pub mod config;
pub mod github;
pub mod logging;
pub mod parser;
pub mod report;
pub mod source;
pub mod version;
