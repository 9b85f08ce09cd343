//! Verification result types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One manifest entry that failed verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    /// Bag-relative path named by the manifest entry.
    pub path: String,
    /// What went wrong.
    pub kind: MismatchKind,
}

impl Mismatch {
    pub fn new(path: impl Into<String>, kind: MismatchKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Kind of verification failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MismatchKind {
    /// The file named by the entry does not exist.
    Missing,
    /// The file exists but its digest differs.
    ChecksumMismatch { expected: String, actual: String },
    /// The file exists but could not be read.
    Unreadable { reason: String },
    /// The entry points outside the bag root.
    OutsideBag,
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("missing"),
            Self::ChecksumMismatch { .. } => f.write_str("checksum mismatch"),
            Self::Unreadable { reason } => write!(f, "unreadable: {reason}"),
            Self::OutsideBag => f.write_str("outside bag"),
        }
    }
}
