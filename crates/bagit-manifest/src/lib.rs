//! Payload and tag manifests for BagIt bags.
//!
//! A [`Manifest`] owns the `path -> digest` pairs of one
//! `manifest-<algo>.txt` or `tagmanifest-<algo>.txt` file and keeps them in
//! step with the filesystem.
//!
//! # Key Types
//!
//! - [`Manifest`] -- Insertion-ordered entries for one algorithm
//! - [`ManifestKind`] -- Payload or tag coverage
//! - [`RehashPolicy`] -- When reconciliation recomputes known digests
//! - [`ReconcileReport`] -- What a reconciliation pass changed
//! - [`Mismatch`] -- A verification failure for one entry

pub mod error;
pub mod kind;
pub mod listing;
pub mod manifest;
pub mod verify;

pub use error::{ManifestError, ManifestResult};
pub use kind::ManifestKind;
pub use listing::list_files;
pub use manifest::{Manifest, ManifestEntry, ReconcileReport, RehashPolicy};
pub use verify::{Mismatch, MismatchKind};
