//! Metadata store for `bag-info.txt`.
//!
//! Keys keep the case they were written with. Keys set through
//! [`BagInfo::set`] that name a reserved element are stored under the
//! element's declared casing (`source-organization` becomes
//! `Source-Organization`). Repeating a key accumulates its values.
//!
//! # Key Types
//!
//! - [`BagInfo`] -- Ordered, repeat-aware key/value store
//! - [`BagInfoValue`] -- A single value or the values of a repeated key
//! - [`BagInfoError`] -- Duplicate non-repeatable fields and I/O failures

pub mod error;
pub mod reserved;
pub mod store;
pub mod value;

pub use error::{BagInfoError, BagInfoResult};
pub use reserved::{canonicalize, is_non_repeatable, PAYLOAD_OXUM, RESERVED_ELEMENTS};
pub use store::BagInfo;
pub use value::BagInfoValue;
