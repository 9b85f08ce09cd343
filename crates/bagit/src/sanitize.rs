//! Payload file name sanitization.
//!
//! Names are made portable before they are hashed: whitespace runs become
//! `_`, shell- and filesystem-hostile characters are dropped, and Windows
//! device names get a random suffix.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use bagit_manifest::{list_files, ManifestKind};
use rand::seq::SliceRandom;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{BagError, BagResult};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));
static FORBIDDEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\.{2}|[~^@!#%&*/:'?"<>|]"#).expect("static regex"));
static DEVICE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(CON|PRN|AUX|NUL|COM[1-9]|LPT[1-9])$").expect("static regex")
});

const SUFFIX_LEN: usize = 12;

/// A payload file renamed by sanitization, as bag-relative paths.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

/// Sanitize a single file name (no directory part).
pub fn sanitize_file_name(name: &str) -> String {
    let name = WHITESPACE.replace_all(name, "_");
    let name = FORBIDDEN.replace_all(&name, "");
    if DEVICE_NAME.is_match(&name) {
        format!("{}_{}", name.to_lowercase(), random_suffix())
    } else {
        name.into_owned()
    }
}

/// Twelve distinct lowercase letters.
fn random_suffix() -> String {
    let mut letters: Vec<char> = ('a'..='z').collect();
    letters.shuffle(&mut rand::thread_rng());
    letters[..SUFFIX_LEN].iter().collect()
}

/// Rename every payload file whose name is not already sanitized.
pub(crate) fn sanitize_payload(root: &Path) -> BagResult<Vec<Rename>> {
    let mut renames = Vec::new();
    for rel in list_files(root, ManifestKind::Payload)? {
        let (dir, name) = rel.rsplit_once('/').unwrap_or(("", rel.as_str()));
        let clean = sanitize_file_name(name);
        if clean == name {
            continue;
        }
        if clean.is_empty() {
            tracing::warn!("leaving {rel}: sanitized name would be empty");
            continue;
        }

        let mut target = format!("{dir}/{clean}");
        if root.join(&target).exists() {
            target = format!("{dir}/{clean}_{}", random_suffix());
        }
        let from = root.join(&rel);
        fs::rename(&from, root.join(&target)).map_err(|e| BagError::io(&from, e))?;
        tracing::debug!("renamed {rel} -> {target}");
        renames.push(Rename { from: rel, to: target });
    }
    Ok(renames)
}
