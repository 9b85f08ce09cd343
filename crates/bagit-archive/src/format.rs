use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported packaging formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    Zip,
    /// gzip-compressed tar, `.tgz` or `.tar.gz`.
    #[default]
    Tgz,
}

impl ArchiveFormat {
    /// Detect the format from a file name.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tgz") || name.ends_with(".tar.gz") {
            Some(Self::Tgz)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Tgz => "tgz",
        }
    }

    /// The archive's file name without its format extension.
    pub fn stem(&self, path: &Path) -> Option<String> {
        let name = path.file_name()?.to_str()?;
        let lower = name.to_ascii_lowercase();
        let suffix = match self {
            Self::Zip => ".zip",
            Self::Tgz if lower.ends_with(".tar.gz") => ".tar.gz",
            Self::Tgz => ".tgz",
        };
        if lower.ends_with(suffix) {
            Some(name[..name.len() - suffix.len()].to_string())
        } else {
            None
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ArchiveFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zip" => Ok(Self::Zip),
            "tgz" | "tar.gz" | "gzip" => Ok(Self::Tgz),
            other => Err(format!("unknown archive format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_extensions() {
        assert_eq!(ArchiveFormat::from_path(Path::new("a/bag.zip")), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::from_path(Path::new("bag.TGZ")), Some(ArchiveFormat::Tgz));
        assert_eq!(ArchiveFormat::from_path(Path::new("bag.tar.gz")), Some(ArchiveFormat::Tgz));
        assert_eq!(ArchiveFormat::from_path(Path::new("bag")), None);
        assert_eq!(ArchiveFormat::from_path(Path::new("bag.tar")), None);
    }

    #[test]
    fn stems() {
        assert_eq!(ArchiveFormat::Tgz.stem(Path::new("/x/mybag.tar.gz")).as_deref(), Some("mybag"));
        assert_eq!(ArchiveFormat::Tgz.stem(Path::new("mybag.tgz")).as_deref(), Some("mybag"));
        assert_eq!(ArchiveFormat::Zip.stem(Path::new("My.Bag.zip")).as_deref(), Some("My.Bag"));
        assert_eq!(ArchiveFormat::Zip.stem(Path::new("mybag.tgz")), None);
    }

    #[test]
    fn parses_names() {
        assert_eq!("ZIP".parse::<ArchiveFormat>(), Ok(ArchiveFormat::Zip));
        assert_eq!("tar.gz".parse::<ArchiveFormat>(), Ok(ArchiveFormat::Tgz));
        assert!("rar".parse::<ArchiveFormat>().is_err());
        assert_eq!(ArchiveFormat::default(), ArchiveFormat::Tgz);
    }
}
