//! Foundation types for BagIt bags.
//!
//! This crate provides the identifiers and conventions shared by every other
//! crate in the workspace. It performs no I/O of its own.
//!
//! # Key Types
//!
//! - [`HashAlgorithm`] -- Checksum algorithm naming a manifest pair
//! - [`BagVersion`] -- `major.minor` pair declared in `bagit.txt`
//! - [`BagDeclaration`] -- Parsed contents of `bagit.txt`
//! - [`TagEncoding`] -- Character encoding of all tag files
//!
//! The [`paths`] module holds the fixed file names of the bag layout and the
//! `data/` prefix convention used by manifests, fetch entries and file adds.

pub mod algorithm;
pub mod encoding;
pub mod error;
pub mod paths;
pub mod version;

pub use algorithm::HashAlgorithm;
pub use encoding::TagEncoding;
pub use error::TypeError;
pub use version::{BagDeclaration, BagVersion};
