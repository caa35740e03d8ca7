//! Resolution of `uses:` references into action + version constraint

use crate::parser::error::ParseError;
use crate::parser::types::{ActionRef, UsesSpec};
use crate::version::semver::VersionConstraint;

impl UsesSpec {
    /// Build a `UsesSpec` from a workflow dependency reference
    ///
    /// References are expected to be of the form `<owner>/<repo>@<ref>`:
    /// - `actions/setup-python@v6` -> `actions/setup-python`, `~=6.0`
    /// - `deadsnakes/action@v3.2.0` -> `deadsnakes/action`, `~=3.2.0`
    ///
    /// Only the last `/`-separated segment of the ref is used as the version,
    /// so branch-qualified refs are not resolved.
    pub fn from_raw(raw: &str) -> Result<Self, ParseError> {
        let malformed = || ParseError::MalformedReference(raw.to_string());

        let (action, reference) = raw.split_once('@').ok_or_else(malformed)?;
        if reference.contains('@') {
            return Err(malformed());
        }

        let token = reference.rsplit('/').next().unwrap_or(reference);
        let token = token.strip_prefix('v').unwrap_or(token);

        let mut parts = action.split('/');
        let (Some(owner), Some(repo), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };
        if owner.trim().is_empty() || repo.trim().is_empty() {
            return Err(malformed());
        }

        let constraint =
            VersionConstraint::compatible(token).ok_or_else(|| ParseError::InvalidVersion {
                reference: raw.to_string(),
                token: token.to_string(),
            })?;

        Ok(Self {
            action: ActionRef::new(owner, repo),
            constraint,
        })
    }
}
