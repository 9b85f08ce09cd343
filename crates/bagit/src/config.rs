use std::fs;
use std::path::Path;

use bagit_manifest::RehashPolicy;
use bagit_types::HashAlgorithm;
use serde::{Deserialize, Serialize};

use crate::error::{BagError, BagResult};

/// Options applied when a bag is opened or created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BagConfig {
    /// Validate immediately after opening.
    pub validate: bool,
    /// Create `bag-info.txt` and tag manifests.
    pub extended: bool,
    /// Resolve `fetch.txt` immediately after opening.
    pub fetch: bool,
    /// Algorithm for a bag that has no manifests yet.
    pub hash_algorithm: HashAlgorithm,
    /// Metadata written to `bag-info.txt` when a new bag is initialized.
    /// Existing bags are left alone. Non-empty implies an extended bag.
    pub bag_info: Vec<(String, String)>,
    /// When `update()` recomputes digests of known files.
    pub rehash: RehashPolicy,
    /// Maximum simultaneous fetch downloads.
    pub fetch_concurrency: usize,
}

impl Default for BagConfig {
    fn default() -> Self {
        Self {
            validate: false,
            extended: true,
            fetch: false,
            hash_algorithm: HashAlgorithm::DEFAULT,
            bag_info: Vec::new(),
            rehash: RehashPolicy::Always,
            fetch_concurrency: 4,
        }
    }
}

impl BagConfig {
    /// A configuration that creates only the required tag files.
    pub fn minimal() -> Self {
        Self {
            extended: false,
            ..Default::default()
        }
    }

    pub fn from_toml_str(text: &str) -> BagResult<Self> {
        toml::from_str(text).map_err(|e| BagError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> BagResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| BagError::io(path, e))?;
        Self::from_toml_str(&text)
            .map_err(|e| BagError::Config(format!("{}: {e}", path.display())))
    }

    /// Whether extended tag files should be created.
    pub fn wants_extended(&self) -> bool {
        self.extended || !self.bag_info.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = BagConfig::default();
        assert!(!c.validate);
        assert!(c.extended);
        assert!(!c.fetch);
        assert_eq!(c.hash_algorithm, HashAlgorithm::Sha1);
        assert_eq!(c.rehash, RehashPolicy::Always);
        assert_eq!(c.fetch_concurrency, 4);
        assert!(c.bag_info.is_empty());
    }

    #[test]
    fn bag_info_implies_extended() {
        let mut c = BagConfig::minimal();
        assert!(!c.wants_extended());
        c.bag_info.push(("Contact-Name".into(), "Someone".into()));
        assert!(c.wants_extended());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = BagConfig::from_toml_str(
            r#"
            hash_algorithm = "sha256"
            rehash = "if-modified"
            bag_info = [["Source-Organization", "Example Library"]]
            "#,
        )
        .unwrap();
        assert_eq!(c.hash_algorithm, HashAlgorithm::Sha256);
        assert_eq!(c.rehash, RehashPolicy::IfModified);
        assert_eq!(c.bag_info[0].1, "Example Library");
        assert!(c.extended);
        assert_eq!(c.fetch_concurrency, 4);
    }

    #[test]
    fn bad_toml_is_a_configuration_error() {
        let err = BagConfig::from_toml_str("hash_algorithm = \"crc32\"").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bag.toml");
        fs::write(&path, "validate = true\nextended = false\n").unwrap();
        let c = BagConfig::load(&path).unwrap();
        assert!(c.validate);
        assert!(!c.extended);
    }
}
