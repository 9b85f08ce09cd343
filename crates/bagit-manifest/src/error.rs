//! Error types for the manifest crate.

use std::path::PathBuf;

/// Errors that can occur while loading, reconciling or writing a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Reading or writing the manifest file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Walking the covered directory failed.
    #[error("failed to list {0}: {1}")]
    Listing(PathBuf, String),

    /// The manifest text cannot be represented in the tag-file encoding.
    #[error("encoding error: {0}")]
    Encoding(#[from] bagit_types::TypeError),
}

impl ManifestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for manifest results.
pub type ManifestResult<T> = Result<T, ManifestError>;
