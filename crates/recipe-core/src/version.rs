//! Requirement versions and `name/version` references.
//!
//! A requirement pins either an exact version (`1.14.1`) or a bracketed
//! range (`[>=3.15]`, `[>=1.0, <2]`). Both forms are validated with
//! `semver`; two-component versions such as `3.15` get a `.0` patch.
//!
//! ```
//! use recipe_core::version::{Reference, VersionSpec};
//!
//! let r: Reference = "cmake/[>=3.15]".parse().unwrap();
//! assert_eq!(r.name, "cmake");
//! assert!(r.version.matches("3.28.1"));
//! ```

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::{Error, Result};

static REFERENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_][A-Za-z0-9_+.-]*)/(\S.*)$").unwrap());

/// Version constraint of a requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    Exact(semver::Version),
    Range(semver::VersionReq),
}

impl VersionSpec {
    /// Parse a version string on behalf of `dependency` (used in errors)
    pub fn parse(dependency: &str, raw: &str) -> Result<Self> {
        let invalid = |source| Error::InvalidVersion {
            dependency: dependency.to_string(),
            version: raw.to_string(),
            source,
        };
        let trimmed = raw.trim();
        match trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            Some(range) => semver::VersionReq::parse(range)
                .map(VersionSpec::Range)
                .map_err(invalid),
            None => semver::Version::parse(&pad_version(trimmed))
                .map(VersionSpec::Exact)
                .map_err(invalid),
        }
    }

    /// Whether a concrete version satisfies this constraint
    ///
    /// Unparseable candidates never match.
    pub fn matches(&self, candidate: &str) -> bool {
        let Ok(candidate) = semver::Version::parse(&pad_version(candidate)) else {
            return false;
        };
        match self {
            VersionSpec::Exact(v) => *v == candidate,
            VersionSpec::Range(req) => req.matches(&candidate),
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Exact(v) => write!(f, "{}", v),
            VersionSpec::Range(req) => write!(f, "[{}]", req),
        }
    }
}

impl Serialize for VersionSpec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Pad `major` or `major.minor` to a full semver triple
fn pad_version(raw: &str) -> String {
    let core_len = raw.find(['-', '+']).unwrap_or(raw.len());
    let dots = raw[..core_len].matches('.').count();
    let padding = match dots {
        0 => ".0.0",
        1 => ".0",
        _ => "",
    };
    format!("{}{}{}", &raw[..core_len], padding, &raw[core_len..])
}

/// A `name/version` package reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub name: String,
    pub version: VersionSpec,
}

impl FromStr for Reference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let caps = REFERENCE_PATTERN
            .captures(s.trim())
            .ok_or_else(|| Error::InvalidReference {
                reference: s.to_string(),
            })?;
        let name = caps[1].to_string();
        let version = VersionSpec::parse(&name, &caps[2])?;
        Ok(Self { name, version })
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.14.1", "1.14.1", true)]
    #[case("1.14.1", "1.14.2", false)]
    #[case("[>=3.15]", "3.28.1", true)]
    #[case("[>=3.15]", "3.14", false)]
    #[case("[>=1.0, <2]", "1.9.9", true)]
    #[case("[>=1.0, <2]", "2.0.0", false)]
    fn test_version_matching(#[case] spec: &str, #[case] candidate: &str, #[case] expected: bool) {
        let spec = VersionSpec::parse("dep", spec).unwrap();
        assert_eq!(spec.matches(candidate), expected);
    }

    #[test]
    fn test_short_versions_are_padded() {
        assert_eq!(pad_version("3"), "3.0.0");
        assert_eq!(pad_version("3.15"), "3.15.0");
        assert_eq!(pad_version("1.2.3-rc1"), "1.2.3-rc1");
        assert_eq!(pad_version("1.2-rc1"), "1.2.0-rc1");
    }

    #[test]
    fn test_invalid_version_names_dependency() {
        let err = VersionSpec::parse("opencv", "four").unwrap_err();
        match err {
            Error::InvalidVersion {
                dependency,
                version,
                ..
            } => {
                assert_eq!(dependency, "opencv");
                assert_eq!(version, "four");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_reference_parsing() {
        let r: Reference = "pkgconf/1.7.4".parse().unwrap();
        assert_eq!(r.name, "pkgconf");
        assert_eq!(r.to_string(), "pkgconf/1.7.4");

        assert!(matches!(
            "no-version".parse::<Reference>(),
            Err(Error::InvalidReference { .. })
        ));
    }

    #[test]
    fn test_range_display_keeps_brackets() {
        let spec = VersionSpec::parse("cmake", "[>=3.15]").unwrap();
        assert_eq!(spec.to_string(), "[>=3.15]");
    }
}
