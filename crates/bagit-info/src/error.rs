use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BagInfoError {
    /// A field that may appear only once was given a second value.
    #[error("duplicate non-repeatable bag-info field: {0}")]
    DuplicateNonRepeatableField(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encoding error: {0}")]
    Encoding(#[from] bagit_types::TypeError),
}

pub type BagInfoResult<T> = Result<T, BagInfoError>;
