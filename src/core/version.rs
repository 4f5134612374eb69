//! PHP version handling
//!
//! Canonicalizes user-supplied version tokens (`php-5.4.1`, `5.6.0RC1`)
//! and matches them against semver ranges.

use regex::Regex;
use semver::{Version, VersionReq};
use std::fmt;
use std::sync::OnceLock;

use crate::error::VersionError;

/// A canonical PHP release identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhpVersion {
    release: Version,
    /// Release suffix as written by upstream (`RC1`, `alpha2`), may be empty
    suffix: String,
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:php-)?(\d+)\.(\d+)(?:\.(\d+))?((?:alpha|beta|RC|rc)\d*)?$")
            .expect("version pattern is valid")
    })
}

impl PhpVersion {
    /// Parse a version token
    ///
    /// # Examples
    /// ```
    /// use phpbuild::core::version::PhpVersion;
    ///
    /// let v = PhpVersion::parse("php-5.4.1").unwrap();
    /// assert_eq!(v.to_string(), "5.4.1");
    /// ```
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        let invalid = |reason: &str| VersionError::InvalidVersion {
            version: input.to_string(),
            reason: reason.to_string(),
        };

        let caps = version_pattern()
            .captures(trimmed)
            .ok_or_else(|| invalid("expected X.Y.Z, optionally prefixed with 'php-'"))?;

        let patch = caps
            .get(3)
            .ok_or_else(|| invalid("a full X.Y.Z release number is required"))?;

        let number = |s: &str| {
            s.parse::<u64>()
                .map_err(|_| invalid("version component is out of range"))
        };

        Ok(Self {
            release: Version::new(number(&caps[1])?, number(&caps[2])?, number(patch.as_str())?),
            suffix: caps.get(4).map(|m| m.as_str().to_string()).unwrap_or_default(),
        })
    }

    /// Major.minor.patch triple
    pub fn release(&self) -> &Version {
        &self.release
    }

    /// Whether this is a pre-release (RC, alpha, beta)
    pub fn is_prerelease(&self) -> bool {
        !self.suffix.is_empty()
    }

    /// Whether the release triple falls in `range`
    ///
    /// Pre-release suffixes are ignored so that `5.3.0RC1` matches `>=5.3.0`.
    pub fn matches(&self, range: &VersionReq) -> bool {
        range.matches(&self.release)
    }
}

impl fmt::Display for PhpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}{}",
            self.release.major, self.release.minor, self.release.patch, self.suffix
        )
    }
}

/// Parse a semver range such as `>=5.3.0, <5.4.0`
pub fn parse_range(range: &str) -> Result<VersionReq, VersionError> {
    VersionReq::parse(range).map_err(|e| VersionError::InvalidRange {
        range: range.to_string(),
        reason: e.to_string(),
    })
}
