use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::encoding::TagEncoding;
use crate::error::TypeError;

static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"BagIt-Version: (\d+)\.(\d+)").expect("static regex")
});

static ENCODING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Tag-File-Character-Encoding: (.*)").expect("static regex")
});

/// BagIt specification version declared by a bag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BagVersion {
    pub major: u32,
    pub minor: u32,
}

impl BagVersion {
    /// Version assumed when `bagit.txt` is absent.
    pub const DEFAULT: Self = Self { major: 0, minor: 96 };

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl Default for BagVersion {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for BagVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Parsed contents of `bagit.txt`.
///
/// `version` is `None` when the file carries no recognisable
/// `BagIt-Version` line; callers report that as a validation issue rather
/// than failing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BagDeclaration {
    pub version: Option<BagVersion>,
    pub encoding: TagEncoding,
}

impl BagDeclaration {
    /// Declaration written for a freshly initialized bag.
    pub fn new(version: BagVersion, encoding: TagEncoding) -> Self {
        Self {
            version: Some(version),
            encoding,
        }
    }

    /// Parse the text of a `bagit.txt` file.
    ///
    /// Fails only when a version line is present but its numbers cannot be
    /// represented.
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        let version = match VERSION_LINE.captures(text) {
            Some(caps) => {
                let major = caps[1]
                    .parse()
                    .map_err(|_| TypeError::InvalidVersion(caps[0].to_string()))?;
                let minor = caps[2]
                    .parse()
                    .map_err(|_| TypeError::InvalidVersion(caps[0].to_string()))?;
                Some(BagVersion { major, minor })
            }
            None => None,
        };

        let encoding = ENCODING_LINE
            .captures(text)
            .map(|caps| TagEncoding::from_label(caps[1].trim()))
            .unwrap_or_default();

        Ok(Self { version, encoding })
    }

    /// Render as `bagit.txt` text. A missing version renders as the default.
    pub fn render(&self) -> String {
        format!(
            "BagIt-Version: {}\nTag-File-Character-Encoding: {}\n",
            self.version.unwrap_or_default(),
            self.encoding.label()
        )
    }
}

impl Default for BagDeclaration {
    fn default() -> Self {
        Self::new(BagVersion::DEFAULT, TagEncoding::default())
    }
}
