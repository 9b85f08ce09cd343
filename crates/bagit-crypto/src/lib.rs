//! Checksum computation for BagIt manifests.
//!
//! Wraps the RustCrypto digest implementations behind a single
//! [`FileHasher`] that maps a [`HashAlgorithm`](bagit_types::HashAlgorithm)
//! to a lowercase hex digest. No custom cryptography.

pub mod hasher;

pub use hasher::FileHasher;
