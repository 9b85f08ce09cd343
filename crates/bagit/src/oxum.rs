use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use bagit_manifest::{list_files, ManifestKind};
use serde::{Deserialize, Serialize};

use crate::error::{BagError, BagResult};

/// `Payload-Oxum`: total payload octets and file count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oxum {
    pub octets: u64,
    pub files: u64,
}

impl Oxum {
    /// Measure the payload under `root/data`.
    pub fn compute(root: &Path) -> BagResult<Self> {
        let mut oxum = Self::default();
        for rel in list_files(root, ManifestKind::Payload)? {
            let path = root.join(&rel);
            let meta = fs::metadata(&path).map_err(|e| BagError::io(&path, e))?;
            oxum.octets += meta.len();
            oxum.files += 1;
        }
        Ok(oxum)
    }
}

impl fmt::Display for Oxum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.octets, self.files)
    }
}

impl FromStr for Oxum {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (octets, files) = s
            .trim()
            .split_once('.')
            .ok_or_else(|| format!("malformed Payload-Oxum: {s:?}"))?;
        Ok(Self {
            octets: octets
                .parse()
                .map_err(|_| format!("malformed Payload-Oxum octets: {octets:?}"))?,
            files: files
                .parse()
                .map_err(|_| format!("malformed Payload-Oxum file count: {files:?}"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let oxum: Oxum = "279164.2".parse().unwrap();
        assert_eq!(oxum, Oxum { octets: 279164, files: 2 });
        assert_eq!(oxum.to_string(), "279164.2");
        assert!("12".parse::<Oxum>().is_err());
        assert!("a.b".parse::<Oxum>().is_err());
    }

    #[test]
    fn compute_counts_payload_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("data/sub")).unwrap();
        fs::write(dir.path().join("data/a.txt"), "12345").unwrap();
        fs::write(dir.path().join("data/sub/b.txt"), "123").unwrap();
        fs::write(dir.path().join("bagit.txt"), "ignored").unwrap();

        let oxum = Oxum::compute(dir.path()).unwrap();
        assert_eq!(oxum, Oxum { octets: 8, files: 2 });
    }
}
