//! The [`Manifest`] store for one algorithm and one coverage kind.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use bagit_crypto::FileHasher;
use bagit_types::{HashAlgorithm, TagEncoding};
use serde::{Deserialize, Serialize};

use crate::error::{ManifestError, ManifestResult};
use crate::kind::ManifestKind;
use crate::listing::list_files;
use crate::verify::{Mismatch, MismatchKind};

/// When reconciliation recomputes digests that are already recorded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RehashPolicy {
    /// Recompute every digest on every pass.
    #[default]
    Always,
    /// Recompute only files modified after the manifest was loaded or last
    /// reconciled. New files are always hashed.
    IfModified,
}

/// One `digest  path` line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Bag-relative path with `/` separators.
    pub path: String,
    /// Lowercase hex digest.
    pub digest: String,
}

/// Summary of a reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Paths hashed for the first time.
    pub added: Vec<String>,
    /// Paths dropped because the file is gone.
    pub removed: Vec<String>,
    /// Known paths whose digest changed on rehash.
    pub changed: Vec<String>,
}

impl ReconcileReport {
    /// Returns `true` if the pass changed nothing.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Checksums of every covered file for one algorithm.
///
/// Entries keep insertion order so the serialized file is stable across
/// passes. Paths are unique.
#[derive(Clone)]
pub struct Manifest {
    algorithm: HashAlgorithm,
    kind: ManifestKind,
    entries: Vec<ManifestEntry>,
    positions: HashMap<String, usize>,
    /// Files modified after this instant are stale under `IfModified`.
    baseline: Option<SystemTime>,
}

impl std::fmt::Debug for Manifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manifest")
            .field("algorithm", &self.algorithm)
            .field("kind", &self.kind)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl Manifest {
    /// Create an empty manifest.
    pub fn new(algorithm: HashAlgorithm, kind: ManifestKind) -> Self {
        Self {
            algorithm,
            kind,
            entries: Vec::new(),
            positions: HashMap::new(),
            baseline: None,
        }
    }

    /// Build a manifest from manifest file text.
    ///
    /// Each line is `<hexdigest><whitespace><path>`. Lines without both
    /// fields, or whose digest is not hex, are skipped.
    pub fn parse(algorithm: HashAlgorithm, kind: ManifestKind, text: &str) -> Self {
        let mut manifest = Self::new(algorithm, kind);
        for line in text.split(['\r', '\n']).filter(|l| !l.trim().is_empty()) {
            let Some((digest, path)) = line.trim().split_once(char::is_whitespace) else {
                tracing::warn!("skipping malformed {} line: {line:?}", kind.file_name(algorithm));
                continue;
            };
            let path = path.trim_start();
            let path = path.strip_prefix('*').unwrap_or(path);
            if path.is_empty() || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                tracing::warn!("skipping malformed {} line: {line:?}", kind.file_name(algorithm));
                continue;
            }
            manifest.insert(path, digest);
        }
        manifest
    }

    /// Load `<root>/<kind>-<algo>.txt`.
    ///
    /// A missing file yields an empty manifest. The file's modification time
    /// becomes the baseline for [`RehashPolicy::IfModified`].
    pub fn load(
        root: &Path,
        algorithm: HashAlgorithm,
        kind: ManifestKind,
        encoding: &TagEncoding,
    ) -> ManifestResult<Self> {
        let path = root.join(kind.file_name(algorithm));
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Self::new(algorithm, kind));
            }
            Err(e) => return Err(ManifestError::io(path, e)),
        };
        let mut manifest = Self::parse(algorithm, kind, &encoding.decode(&bytes));
        manifest.baseline = fs::metadata(&path).and_then(|m| m.modified()).ok();
        tracing::debug!(
            "loaded {} with {} entries",
            path.display(),
            manifest.entries.len()
        );
        Ok(manifest)
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn kind(&self) -> ManifestKind {
        self.kind
    }

    /// File name this manifest is stored under.
    pub fn file_name(&self) -> String {
        self.kind.file_name(self.algorithm)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Digest recorded for `path`.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.positions
            .get(path)
            .map(|&i| self.entries[i].digest.as_str())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.positions.contains_key(path)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Record a digest. Known paths are updated in place.
    pub fn insert(&mut self, path: &str, digest: &str) {
        let digest = digest.to_ascii_lowercase();
        match self.positions.get(path) {
            Some(&i) => self.entries[i].digest = digest,
            None => {
                self.positions.insert(path.to_string(), self.entries.len());
                self.entries.push(ManifestEntry {
                    path: path.to_string(),
                    digest,
                });
            }
        }
    }

    /// Drop the entry for `path`, returning its digest.
    pub fn remove(&mut self, path: &str) -> Option<String> {
        let index = self.positions.remove(path)?;
        let entry = self.entries.remove(index);
        self.reindex();
        Some(entry.digest)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
    }

    fn reindex(&mut self) {
        self.positions = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.path.clone(), i))
            .collect();
    }

    // ---------------------------------------------------------------
    // Filesystem synchronisation
    // ---------------------------------------------------------------

    /// Bring the entries in line with the files under `root`.
    ///
    /// Entries for vanished files are removed, new files are hashed and
    /// appended, and known files are rehashed according to `policy`.
    pub fn reconcile(&mut self, root: &Path, policy: RehashPolicy) -> ManifestResult<ReconcileReport> {
        let started = SystemTime::now();
        let files = list_files(root, self.kind)?;
        let present: HashSet<&str> = files.iter().map(String::as_str).collect();
        let hasher = FileHasher::new(self.algorithm);
        let mut report = ReconcileReport::default();

        let before = self.entries.len();
        self.entries.retain(|e| {
            let keep = present.contains(e.path.as_str());
            if !keep {
                report.removed.push(e.path.clone());
            }
            keep
        });
        if self.entries.len() != before {
            self.reindex();
        }

        for rel in &files {
            let full = root.join(rel);
            match self.positions.get(rel.as_str()).copied() {
                Some(i) => {
                    if !self.is_stale(&full, policy) {
                        continue;
                    }
                    let digest = hasher
                        .hash_file(&full)
                        .map_err(|e| ManifestError::io(&full, e))?;
                    if self.entries[i].digest != digest {
                        tracing::debug!("{rel}: digest changed");
                        self.entries[i].digest = digest;
                        report.changed.push(rel.clone());
                    }
                }
                None => {
                    let digest = hasher
                        .hash_file(&full)
                        .map_err(|e| ManifestError::io(&full, e))?;
                    tracing::debug!("{rel}: {} {digest}", self.algorithm);
                    self.insert(rel, &digest);
                    report.added.push(rel.clone());
                }
            }
        }

        self.baseline = Some(started);
        Ok(report)
    }

    fn is_stale(&self, file: &Path, policy: RehashPolicy) -> bool {
        match (policy, self.baseline) {
            (RehashPolicy::Always, _) | (RehashPolicy::IfModified, None) => true,
            (RehashPolicy::IfModified, Some(baseline)) => fs::metadata(file)
                .and_then(|m| m.modified())
                .map(|mtime| mtime >= baseline)
                .unwrap_or(true),
        }
    }

    /// Recompute every entry's digest and report the failures.
    ///
    /// Does not modify the manifest.
    pub fn verify(&self, root: &Path) -> Vec<Mismatch> {
        let hasher = FileHasher::new(self.algorithm);
        let mut mismatches = Vec::new();
        for entry in &self.entries {
            if !is_contained(&entry.path) {
                mismatches.push(Mismatch::new(&entry.path, MismatchKind::OutsideBag));
                continue;
            }
            match hasher.hash_file(&root.join(&entry.path)) {
                Ok(actual) if actual.eq_ignore_ascii_case(&entry.digest) => {}
                Ok(actual) => mismatches.push(Mismatch::new(
                    &entry.path,
                    MismatchKind::ChecksumMismatch {
                        expected: entry.digest.clone(),
                        actual,
                    },
                )),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    mismatches.push(Mismatch::new(&entry.path, MismatchKind::Missing));
                }
                Err(e) => mismatches.push(Mismatch::new(
                    &entry.path,
                    MismatchKind::Unreadable {
                        reason: e.to_string(),
                    },
                )),
            }
        }
        mismatches
    }

    // ---------------------------------------------------------------
    // Serialization
    // ---------------------------------------------------------------

    /// Render as manifest text: one `digest path\n` line per entry.
    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{} {}\n", e.digest, e.path))
            .collect()
    }

    /// Write the manifest under `root`, returning the file path.
    pub fn write(&self, root: &Path, encoding: &TagEncoding) -> ManifestResult<PathBuf> {
        let path = root.join(self.file_name());
        let bytes = encoding.encode(&self.serialize())?;
        fs::write(&path, bytes).map_err(|e| ManifestError::io(&path, e))?;
        Ok(path)
    }
}

fn is_contained(rel: &str) -> bool {
    Path::new(rel)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BLANK: &str = "This space intentionally left blank.\n";
    const BLANK_SHA1: &str = "a5c44171ca6618c6ee24c3f3f3019df8df09a2e0";

    fn payload() -> Manifest {
        Manifest::new(HashAlgorithm::Sha1, ManifestKind::Payload)
    }

    fn bag_with(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        dir
    }

    #[test]
    fn parse_accepts_any_whitespace_separator() {
        let m = Manifest::parse(
            HashAlgorithm::Sha1,
            ManifestKind::Payload,
            "AAAA  data/a.txt\nbbbb\tdata/b c.txt\r\n\n",
        );
        assert_eq!(m.len(), 2);
        assert_eq!(m.get("data/a.txt"), Some("aaaa"));
        assert_eq!(m.get("data/b c.txt"), Some("bbbb"));
    }

    #[test]
    fn parse_skips_malformed_lines() {
        let m = Manifest::parse(
            HashAlgorithm::Sha1,
            ManifestKind::Payload,
            "justonefield\nnothex data/x.txt\nabcd data/ok.txt\n",
        );
        assert_eq!(m.len(), 1);
        assert!(m.contains("data/ok.txt"));
    }

    #[test]
    fn parse_strips_binary_marker() {
        let m = Manifest::parse(HashAlgorithm::Md5, ManifestKind::Payload, "abcd *data/x.bin\n");
        assert_eq!(m.get("data/x.bin"), Some("abcd"));
    }

    #[test]
    fn serialize_keeps_insertion_order() {
        let mut m = payload();
        m.insert("data/z.txt", "01");
        m.insert("data/a.txt", "02");
        m.insert("data/z.txt", "03");
        assert_eq!(m.serialize(), "03 data/z.txt\n02 data/a.txt\n");
    }

    #[test]
    fn empty_manifest_serializes_to_empty_string() {
        assert_eq!(payload().serialize(), "");
    }

    #[test]
    fn remove_reindexes() {
        let mut m = payload();
        m.insert("data/a", "01");
        m.insert("data/b", "02");
        m.insert("data/c", "03");
        assert_eq!(m.remove("data/a").as_deref(), Some("01"));
        assert_eq!(m.get("data/c"), Some("03"));
        assert_eq!(m.remove("data/a"), None);
        assert_eq!(m.serialize(), "02 data/b\n03 data/c\n");
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let m = Manifest::load(
            dir.path(),
            HashAlgorithm::Sha1,
            ManifestKind::Payload,
            &TagEncoding::Utf8,
        )
        .unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn reconcile_adds_new_files() {
        let dir = bag_with(&[("data/missing.txt", BLANK)]);
        let mut m = payload();
        let report = m.reconcile(dir.path(), RehashPolicy::Always).unwrap();
        assert_eq!(report.added, vec!["data/missing.txt"]);
        assert_eq!(m.get("data/missing.txt"), Some(BLANK_SHA1));
        assert_eq!(m.serialize(), format!("{BLANK_SHA1} data/missing.txt\n"));
    }

    #[test]
    fn reconcile_removes_vanished_files() {
        let dir = bag_with(&[]);
        let mut m = payload();
        m.insert("data/missing.txt", "abcdabcdabcdabcdabcdabcdabcdabcdabcdabcd");
        let report = m.reconcile(dir.path(), RehashPolicy::Always).unwrap();
        assert_eq!(report.removed, vec!["data/missing.txt"]);
        assert!(m.is_empty());
        assert_eq!(m.serialize(), "");
    }

    #[test]
    fn reconcile_refreshes_stale_digest() {
        let dir = bag_with(&[("data/missing.txt", BLANK)]);
        let mut m = payload();
        m.insert("data/missing.txt", "abababababababababababababababababababab");
        let report = m.reconcile(dir.path(), RehashPolicy::Always).unwrap();
        assert_eq!(report.changed, vec!["data/missing.txt"]);
        assert_eq!(m.get("data/missing.txt"), Some(BLANK_SHA1));
    }

    #[test]
    fn reconcile_is_stable_for_untouched_files() {
        let dir = bag_with(&[("data/a.txt", "alpha"), ("data/b.txt", "beta")]);
        let mut m = payload();
        m.reconcile(dir.path(), RehashPolicy::Always).unwrap();
        let first = m.serialize();
        let report = m.reconcile(dir.path(), RehashPolicy::Always).unwrap();
        assert!(report.is_empty());
        assert_eq!(m.serialize(), first);
    }

    #[test]
    fn if_modified_keeps_digest_of_unmodified_file() {
        let dir = bag_with(&[("data/a.txt", "alpha")]);
        let mut m = payload();
        m.insert("data/a.txt", "abababababababababababababababababababab");
        // Baseline in the future: nothing on disk counts as modified.
        m.baseline = Some(SystemTime::now() + std::time::Duration::from_secs(3600));
        m.reconcile(dir.path(), RehashPolicy::IfModified).unwrap();
        assert_eq!(
            m.get("data/a.txt"),
            Some("abababababababababababababababababababab")
        );
    }

    #[test]
    fn if_modified_rehashes_without_baseline() {
        let dir = bag_with(&[("data/a.txt", BLANK)]);
        let mut m = payload();
        m.insert("data/a.txt", "abababababababababababababababababababab");
        m.reconcile(dir.path(), RehashPolicy::IfModified).unwrap();
        assert_eq!(m.get("data/a.txt"), Some(BLANK_SHA1));
    }

    #[test]
    fn replaced_file_reflects_new_content() {
        let dir = bag_with(&[("data/a.txt", "old")]);
        let mut m = payload();
        m.reconcile(dir.path(), RehashPolicy::Always).unwrap();
        fs::remove_file(dir.path().join("data/a.txt")).unwrap();
        fs::write(dir.path().join("data/a.txt"), BLANK).unwrap();
        m.reconcile(dir.path(), RehashPolicy::Always).unwrap();
        assert_eq!(m.get("data/a.txt"), Some(BLANK_SHA1));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn tag_manifest_covers_root_files() {
        let dir = bag_with(&[
            ("bagit.txt", "BagIt-Version: 0.96\n"),
            ("data/a.txt", "alpha"),
        ]);
        let mut m = Manifest::new(HashAlgorithm::Md5, ManifestKind::Tag);
        m.reconcile(dir.path(), RehashPolicy::Always).unwrap();
        assert!(m.contains("bagit.txt"));
        assert!(!m.contains("data/a.txt"));
    }

    #[test]
    fn verify_reports_missing_and_mismatch() {
        let dir = bag_with(&[("data/present.txt", BLANK)]);
        let mut m = payload();
        m.insert("data/present.txt", "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        m.insert("data/gone.txt", BLANK_SHA1);
        let mismatches = m.verify(dir.path());
        assert_eq!(mismatches.len(), 2);
        assert_eq!(mismatches[0].path, "data/present.txt");
        assert!(matches!(
            mismatches[0].kind,
            MismatchKind::ChecksumMismatch { ref actual, .. } if actual == BLANK_SHA1
        ));
        assert_eq!(mismatches[1], Mismatch::new("data/gone.txt", MismatchKind::Missing));
        // verify never mutates
        assert_eq!(m.get("data/present.txt"), Some("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"));
    }

    #[test]
    fn verify_rejects_escaping_paths() {
        let dir = bag_with(&[]);
        let mut m = payload();
        m.insert("../outside.txt", BLANK_SHA1);
        let mismatches = m.verify(dir.path());
        assert_eq!(mismatches[0].kind, MismatchKind::OutsideBag);
    }

    #[test]
    fn write_then_load() {
        let dir = bag_with(&[("data/a.txt", BLANK)]);
        let mut m = payload();
        m.reconcile(dir.path(), RehashPolicy::Always).unwrap();
        let path = m.write(dir.path(), &TagEncoding::Utf8).unwrap();
        assert!(path.ends_with("manifest-sha1.txt"));

        let loaded = Manifest::load(
            dir.path(),
            HashAlgorithm::Sha1,
            ManifestKind::Payload,
            &TagEncoding::Utf8,
        )
        .unwrap();
        assert_eq!(loaded.entries(), m.entries());
        assert!(loaded.verify(dir.path()).is_empty());
    }

    proptest! {
        #[test]
        fn serialized_text_parses_back(paths in proptest::collection::btree_set("[a-z]{1,8}", 0..8)) {
            let mut m = payload();
            for (i, p) in paths.iter().enumerate() {
                m.insert(&format!("data/{p}"), &format!("{i:040x}"));
            }
            let parsed = Manifest::parse(HashAlgorithm::Sha1, ManifestKind::Payload, &m.serialize());
            prop_assert_eq!(parsed.entries(), m.entries());
        }
    }
}
