//! Parser layer
//! - types.rs: Common types (ActionRef, UsesSpec, JobDependency)
//! - uses.rs: Resolution of `uses:` references into version constraints
//! - workflow.rs: GitHub Actions workflow parser
//! - error.rs: Parse error taxonomy

pub mod error;
pub mod types;
pub mod uses;
pub mod workflow;

pub use error::ParseError;
pub use types::{ActionRef, JobDependency, UsesSpec};
pub use workflow::WorkflowParser;
