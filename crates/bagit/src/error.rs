use std::path::PathBuf;

use bagit_info::BagInfoError;
use bagit_types::{HashAlgorithm, TypeError};
use thiserror::Error;

/// Fatal errors raised by bag operations.
///
/// Problems found while validating a bag are not errors; they are
/// [`BagIssue`](crate::BagIssue)s collected on the bag.
#[derive(Debug, Error)]
pub enum BagError {
    // ---- Configuration ----
    #[error("cannot remove {0}: a bag needs at least one hash algorithm")]
    LastHashAlgorithm(HashAlgorithm),

    #[error("unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("duplicate non-repeatable bag-info field: {0}")]
    DuplicateNonRepeatableField(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    // ---- Filesystem ----
    #[error("file already exists: {0}")]
    FileExists(PathBuf),

    #[error("path escapes the bag: {0}")]
    InvalidPath(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid bag version: {0}")]
    InvalidVersion(String),

    #[error("encoding error: {0}")]
    Encoding(TypeError),

    // ---- Components ----
    #[error("archive error: {0}")]
    Archive(#[from] bagit_archive::ArchiveError),

    #[error("manifest error: {0}")]
    Manifest(#[from] bagit_manifest::ManifestError),

    #[error("bag-info error: {0}")]
    BagInfo(BagInfoError),

    #[error("fetch error: {0}")]
    Fetch(#[from] bagit_fetch::FetchError),
}

impl BagError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for errors caused by how the bag was configured or
    /// called, as opposed to filesystem or component failures.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::LastHashAlgorithm(_)
                | Self::UnsupportedAlgorithm(_)
                | Self::DuplicateNonRepeatableField(_)
                | Self::Config(_)
        )
    }
}

impl From<TypeError> for BagError {
    fn from(e: TypeError) -> Self {
        match e {
            TypeError::UnsupportedAlgorithm(name) => Self::UnsupportedAlgorithm(name),
            TypeError::InvalidVersion(v) => Self::InvalidVersion(v),
            other => Self::Encoding(other),
        }
    }
}

impl From<BagInfoError> for BagError {
    fn from(e: BagInfoError) -> Self {
        match e {
            BagInfoError::DuplicateNonRepeatableField(key) => Self::DuplicateNonRepeatableField(key),
            other => Self::BagInfo(other),
        }
    }
}

pub type BagResult<T> = Result<T, BagError>;
