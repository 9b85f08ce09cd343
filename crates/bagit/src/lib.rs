//! BagIt bags: open, create, validate, update and package.
//!
//! A [`Bag`] ties together the payload under `data/` and the tag files that
//! describe it. Opening a directory without `bagit.txt` initializes a new
//! bag; opening a `.zip` or `.tgz` extracts it into a temporary directory
//! owned by the bag.
//!
//! # Key Types
//!
//! - [`Bag`] -- The aggregate: manifests, bag-info, fetch list, validation state
//! - [`BagConfig`] -- Options applied on open, loadable from TOML
//! - [`BagIssue`] -- A validation problem; never raised as an error
//! - [`UpdateReport`] -- What `update()` renamed, hashed and dropped
//! - [`Oxum`] -- Payload octet and file counts
//! - [`BagError`] -- Fatal configuration, I/O and component errors
//!
//! # Example
//!
//! ```no_run
//! use bagit::{Bag, BagConfig};
//!
//! let mut bag = Bag::open("my-bag", BagConfig::default())?;
//! bag.create_file("hello\n", "hello.txt")?;
//! bag.set_bag_info_data("Contact-Name", "Archivist")?;
//! bag.update()?;
//! assert!(bag.is_valid());
//! bag.package("my-bag.tgz", None)?;
//! # Ok::<(), bagit::BagError>(())
//! ```

pub mod bag;
pub mod config;
pub mod error;
pub mod oxum;
pub mod sanitize;
pub mod validation;

pub use bag::{Bag, UpdateReport};
pub use config::BagConfig;
pub use error::{BagError, BagResult};
pub use oxum::Oxum;
pub use sanitize::{sanitize_file_name, Rename};
pub use validation::{BagIssue, IssueKind, ValidationState};

pub use bagit_archive::ArchiveFormat;
pub use bagit_fetch::{FetchEntry, FetchFailure, FetchList, FetchReport, FetchSize, Fetcher, HttpFetcher};
pub use bagit_info::{BagInfo, BagInfoValue};
pub use bagit_manifest::{Manifest, ManifestEntry, ManifestKind, RehashPolicy};
pub use bagit_types::{BagDeclaration, BagVersion, HashAlgorithm, TagEncoding};
