use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid bagit version: '{0}'")]
    InvalidVersion(String),

    #[error("cannot encode {ch:?} as {encoding}")]
    Unencodable { ch: char, encoding: String },
}
