use std::fmt;

use semver::{Prerelease, Version};

/// Parse a dotted numeric version into a semver::Version, padding partial versions.
///
/// Returns the parsed version together with the number of components that were
/// written in the input. Only ASCII digits are accepted in each component, so
/// pre-release and build suffixes are rejected.
/// Does NOT strip 'v' prefix.
///
/// Examples:
/// - "1" -> (Version(1, 0, 0), 1)
/// - "1.2" -> (Version(1, 2, 0), 2)
/// - "1.2.3" -> (Version(1, 2, 3), 3)
pub fn parse_numeric_version(version: &str) -> Option<(Version, usize)> {
    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() > 3 {
        return None;
    }

    let mut numbers = [0u64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }

    Some((
        Version::new(numbers[0], numbers[1], numbers[2]),
        parts.len(),
    ))
}

/// Parse a release tag name into a semver::Version
///
/// Strips a leading 'v' and accepts an optional `-prerelease` suffix:
/// - "v3.1.1" -> 3.1.1
/// - "5.0" -> 5.0.0
/// - "v4-beta.1" -> 4.0.0-beta.1
pub fn parse_release_version(tag: &str) -> Option<Version> {
    let tag = tag.strip_prefix('v').unwrap_or(tag);
    let (numeric, pre) = match tag.split_once('-') {
        Some((numeric, pre)) => (numeric, Some(pre)),
        None => (tag, None),
    };

    let (mut version, _) = parse_numeric_version(numeric)?;
    if let Some(pre) = pre {
        version.pre = Prerelease::new(pre).ok()?;
    }
    Some(version)
}

/// A "compatible release" (`~=`) constraint
///
/// `~=1.2.3` accepts `>=1.2.3, ==1.2.*` and `~=6.0` accepts `>=6.0, ==6.*`.
/// A major-only token like `6` is anchored at `6.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    anchor: Version,
    /// Number of components written in the anchor (2 or 3)
    components: usize,
}

impl VersionConstraint {
    /// Build a compatible release constraint from a bare version token
    ///
    /// Returns None if the token is not a dotted numeric version.
    pub fn compatible(token: &str) -> Option<Self> {
        let (anchor, components) = parse_numeric_version(token)?;
        Some(Self {
            anchor,
            // "6" behaves exactly like "6.0"
            components: components.max(2),
        })
    }

    /// Check whether a release version satisfies the constraint
    ///
    /// Pre-releases never satisfy a compatible release constraint.
    pub fn matches(&self, version: &Version) -> bool {
        if !version.pre.is_empty() {
            return false;
        }

        let same_prefix = match self.components {
            2 => version.major == self.anchor.major,
            _ => version.major == self.anchor.major && version.minor == self.anchor.minor,
        };

        same_prefix && version >= &self.anchor
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.components {
            2 => write!(f, "~={}.{}", self.anchor.major, self.anchor.minor),
            _ => write!(f, "~={}", self.anchor),
        }
    }
}
