//! Error type for parsing operations

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    /// A `uses:` value does not have the `<owner>/<repo>@<ref>` shape
    #[error("Malformed action reference: {0}")]
    MalformedReference(String),

    /// The pinned version token is not a dotted numeric version
    #[error("Invalid version in {reference}: {token}")]
    InvalidVersion { reference: String, token: String },

    /// The document lacks the expected jobs/steps structure
    #[error("Malformed workflow: {0}")]
    MalformedWorkflow(String),

    /// Failed to build a syntax tree for the file
    #[error("Failed to parse YAML")]
    ParseFailed,

    /// Tree-sitter related error
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),
}
