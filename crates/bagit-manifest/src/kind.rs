use std::fmt;

use bagit_types::HashAlgorithm;
use serde::{Deserialize, Serialize};

/// Which part of the bag a manifest covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestKind {
    /// Files under `data/`, listed in `manifest-<algo>.txt`.
    Payload,
    /// Tag files outside `data/`, listed in `tagmanifest-<algo>.txt`.
    Tag,
}

impl ManifestKind {
    /// File name of the manifest for `algorithm`.
    pub fn file_name(&self, algorithm: HashAlgorithm) -> String {
        match self {
            Self::Payload => algorithm.manifest_file_name(),
            Self::Tag => algorithm.tag_manifest_file_name(),
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payload => f.write_str("manifest"),
            Self::Tag => f.write_str("tagmanifest"),
        }
    }
}
