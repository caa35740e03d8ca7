//! Version management layer for workflow dependency checking
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registry   │────▶│    Cache    │◀────│   Checker   │
//! │  (fetch)    │     │ (per call)  │     │  (compare)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                                ▼
//!                                         ┌─────────────┐
//!                                         │   Semver    │
//!                                         │ (constraint)│
//!                                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: Release cache scoped to one evaluation call
//! - [`checker`]: Staleness evaluation across workflows
//! - [`registry`]: Registry trait for fetching releases from remote sources
//! - [`error`]: Error types for lookups and evaluation
//! - [`semver`]: Version parsing and compatible release constraints
//! - [`types`]: Release and report types

pub mod cache;
pub mod checker;
pub mod error;
pub mod registry;
pub mod semver;
pub mod types;
