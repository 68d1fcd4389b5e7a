//! Version string codec
//!
//! A version is stored as a `(major, minor)` pair split at the last `.`.
//! The major prefix keeps the separator, so rendering is plain concatenation:
//!
//! - "1.0.1-a" -> ("1.0.", "1-a")
//! - "2.0.0" -> ("2.0.", "0")
//! - "v3.rc1" -> ("v3.", "rc1")

use std::fmt;
use std::str::FromStr;

use crate::store::error::RegistryError;

/// Character separating the major prefix from the minor suffix
pub const SEPARATOR: char = '.';

/// A version string split into its sortable storage key and value.
///
/// Ordering is byte-wise on `major` first, which is the order versions are
/// listed in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionKey {
    major: String,
    minor: String,
}

impl VersionKey {
    pub fn parse(raw: &str) -> Result<Self, RegistryError> {
        let Some(index) = raw.rfind(SEPARATOR) else {
            return Err(RegistryError::BadVersion(raw.to_string()));
        };

        let (major, minor) = raw.split_at(index + SEPARATOR.len_utf8());
        Ok(Self {
            major: major.to_string(),
            minor: minor.to_string(),
        })
    }

    /// Reassemble a key from its stored parts
    pub fn from_parts(major: impl Into<String>, minor: impl Into<String>) -> Self {
        Self {
            major: major.into(),
            minor: minor.into(),
        }
    }

    /// Prefix up to and including the last separator
    pub fn major(&self) -> &str {
        &self.major
    }

    /// Everything after the last separator
    pub fn minor(&self) -> &str {
        &self.minor
    }

    pub fn render(&self) -> String {
        render(&self.major, &self.minor)
    }
}

/// Concatenate a major prefix and minor suffix back into a version string
pub fn render(major: &str, minor: &str) -> String {
    let mut version = String::with_capacity(major.len() + minor.len());
    version.push_str(major);
    version.push_str(minor);
    version
}

impl FromStr for VersionKey {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.0.1-a", "1.0.", "1-a")]
    #[case("2.0.0", "2.0.", "0")]
    #[case("v3.rc1", "v3.", "rc1")]
    #[case("1.", "1.", "")]
    #[case(".5", ".", "5")]
    #[case("release.2024.10.18", "release.2024.10.", "18")]
    fn parse_splits_at_last_separator(
        #[case] raw: &str,
        #[case] major: &str,
        #[case] minor: &str,
    ) {
        let key = VersionKey::parse(raw).unwrap();

        assert_eq!(key.major(), major);
        assert_eq!(key.minor(), minor);
        assert_eq!(key.render(), raw);
        assert_eq!(key.to_string(), raw);
    }

    #[rstest]
    #[case("1-0-1-a")]
    #[case("v1")]
    #[case("")]
    fn parse_rejects_version_without_separator(#[case] raw: &str) {
        let err = VersionKey::parse(raw).unwrap_err();

        assert!(matches!(err, RegistryError::BadVersion(ref v) if v == raw));
    }

    #[test]
    fn from_str_uses_parse() {
        let key: VersionKey = "10.4.2".parse().unwrap();
        assert_eq!(key, VersionKey::from_parts("10.4.", "2"));
    }

    #[test]
    fn keys_order_by_major_prefix_bytes() {
        let mut keys: Vec<VersionKey> = ["2.0.0", "1.0.1-a", "10.0.0"]
            .iter()
            .map(|v| v.parse().unwrap())
            .collect();
        keys.sort();

        let rendered: Vec<String> = keys.iter().map(VersionKey::render).collect();
        assert_eq!(rendered, vec!["1.0.1-a", "10.0.0", "2.0.0"]);
    }
}
