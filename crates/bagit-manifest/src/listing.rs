//! Directory listing for the files a manifest covers.
//!
//! `walkdir` keeps its own explicit stack, so arbitrarily deep payload
//! trees do not grow the call stack. Hidden entries (leading `.`) are
//! skipped, matching what BagIt tools traditionally record.

use std::path::Path;

use bagit_types::paths::{relative_path, DATA_DIR};
use walkdir::{DirEntry, WalkDir};

use crate::error::{ManifestError, ManifestResult};
use crate::kind::ManifestKind;

/// List the bag-relative paths of every file covered by `kind`.
///
/// Payload listings walk `data/`; tag listings walk the bag root without
/// descending into `data/` and without any `tagmanifest-*` file. Results
/// are sorted by file name within each directory.
pub fn list_files(root: &Path, kind: ManifestKind) -> ManifestResult<Vec<String>> {
    let base = match kind {
        ManifestKind::Payload => root.join(DATA_DIR),
        ManifestKind::Tag => root.to_path_buf(),
    };
    if !base.is_dir() {
        return Ok(Vec::new());
    }

    let walker = WalkDir::new(&base)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e) && !(kind == ManifestKind::Tag && is_payload_dir(e)));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| ManifestError::Listing(base.clone(), e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if kind == ManifestKind::Tag && entry.depth() == 1 && is_tag_manifest(&entry) {
            continue;
        }
        match relative_path(root, entry.path()) {
            Some(rel) => files.push(rel),
            None => tracing::warn!("skipping non UTF-8 path {:?}", entry.path()),
        }
    }
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn is_payload_dir(entry: &DirEntry) -> bool {
    entry.depth() == 1 && entry.file_type().is_dir() && entry.file_name() == DATA_DIR
}

fn is_tag_manifest(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with("tagmanifest-"))
        .unwrap_or(false)
}
