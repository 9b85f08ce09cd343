use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Checksum algorithm used by a manifest / tag manifest pair.
///
/// The lowercase name is the identifier that appears in manifest file names
/// (`manifest-sha256.txt`) and in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Algorithm used when a bag declares no manifests.
    pub const DEFAULT: Self = Self::Sha1;

    /// Every supported algorithm, in name order.
    pub const ALL: [Self; 6] = [
        Self::Md5,
        Self::Sha1,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
    ];

    /// Identifier used in file names and configuration.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Length of the hex digest this algorithm produces.
    pub const fn hex_len(&self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha1 => 40,
            Self::Sha224 => 56,
            Self::Sha256 => 64,
            Self::Sha384 => 96,
            Self::Sha512 => 128,
        }
    }

    /// `manifest-<algo>.txt`
    pub fn manifest_file_name(&self) -> String {
        format!("manifest-{}.txt", self.name())
    }

    /// `tagmanifest-<algo>.txt`
    pub fn tag_manifest_file_name(&self) -> String {
        format!("tagmanifest-{}.txt", self.name())
    }

    /// Recognise a payload or tag manifest file name.
    ///
    /// Returns the algorithm and `true` when the name is a tag manifest.
    /// Names that look like manifests but carry an unknown algorithm yield
    /// `None`.
    pub fn from_manifest_file_name(name: &str) -> Option<(Self, bool)> {
        let (rest, is_tag) = if let Some(rest) = name.strip_prefix("tagmanifest-") {
            (rest, true)
        } else if let Some(rest) = name.strip_prefix("manifest-") {
            (rest, false)
        } else {
            return None;
        };
        let algo = rest.strip_suffix(".txt")?;
        algo.parse().ok().map(|a| (a, is_tag))
    }
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for HashAlgorithm {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|a| a.name() == normalized)
            .ok_or_else(|| TypeError::UnsupportedAlgorithm(s.to_string()))
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_sha1() {
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Sha1);
    }

    #[test]
    fn parse_accepts_case_and_dashes() {
        assert_eq!("SHA-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("md5".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Md5);
        assert_eq!(" sha512 ".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha512);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "err".parse::<HashAlgorithm>().unwrap_err();
        assert_eq!(err, TypeError::UnsupportedAlgorithm("err".into()));
    }

    #[test]
    fn manifest_names() {
        let a = HashAlgorithm::Sha256;
        assert_eq!(a.manifest_file_name(), "manifest-sha256.txt");
        assert_eq!(a.tag_manifest_file_name(), "tagmanifest-sha256.txt");
    }

    #[test]
    fn recognise_manifest_file_names() {
        assert_eq!(
            HashAlgorithm::from_manifest_file_name("manifest-md5.txt"),
            Some((HashAlgorithm::Md5, false))
        );
        assert_eq!(
            HashAlgorithm::from_manifest_file_name("tagmanifest-sha1.txt"),
            Some((HashAlgorithm::Sha1, true))
        );
        assert_eq!(HashAlgorithm::from_manifest_file_name("manifest-foo.txt"), None);
        assert_eq!(HashAlgorithm::from_manifest_file_name("bagit.txt"), None);
        assert_eq!(HashAlgorithm::from_manifest_file_name("manifest-sha1.md"), None);
    }

    #[test]
    fn serde_uses_lowercase_name() {
        let json = serde_json::to_string(&HashAlgorithm::Sha384).unwrap();
        assert_eq!(json, "\"sha384\"");
        let parsed: HashAlgorithm = serde_json::from_str("\"md5\"").unwrap();
        assert_eq!(parsed, HashAlgorithm::Md5);
    }

    #[test]
    fn display_matches_name() {
        for algo in HashAlgorithm::ALL {
            assert_eq!(algo.to_string(), algo.name());
            assert_eq!(algo.name().parse::<HashAlgorithm>().unwrap(), algo);
        }
    }
}
