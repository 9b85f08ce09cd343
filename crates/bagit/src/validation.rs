//! Bag validation.
//!
//! Validation never fails with an error. Every problem found becomes a
//! [`BagIssue`] naming the file (or tag element) it concerns and the bag is
//! reported Invalid.

use std::fmt;
use std::fs;
use std::io;

use bagit_info::PAYLOAD_OXUM;
use bagit_manifest::{list_files, Manifest, ManifestKind, MismatchKind};
use bagit_types::paths::{BAGIT_FILE, DATA_DIR};
use bagit_types::{BagDeclaration, TagEncoding};
use serde::{Deserialize, Serialize};

use crate::bag::Bag;
use crate::oxum::Oxum;

/// Result of the most recent validation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationState {
    /// Not validated since opening or since the last mutation.
    #[default]
    Unvalidated,
    Valid,
    Invalid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A required tag file or directory does not exist.
    MissingFile,
    /// `bagit.txt` has no readable version line.
    MalformedDeclaration,
    ChecksumMismatch,
    /// A manifest names a payload or tag file that is not on disk.
    MissingListedFile,
    UnreadableFile,
    /// A manifest entry points outside the bag.
    OutsideBag,
    /// A payload file is not listed in a payload manifest.
    UnlistedFile,
    OxumMismatch,
}

/// One validation problem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagIssue {
    /// File, directory or tag element the problem concerns.
    pub subject: String,
    pub message: String,
    pub kind: IssueKind,
}

impl BagIssue {
    pub fn new(subject: impl Into<String>, message: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
            kind,
        }
    }

    fn missing(name: &str) -> Self {
        Self::new(name, format!("{name} does not exist."), IssueKind::MissingFile)
    }
}

impl fmt::Display for BagIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Run every check against `bag` and its directory.
pub(crate) fn collect_issues(bag: &Bag) -> Vec<BagIssue> {
    let mut issues = Vec::new();
    let root = bag.directory();

    check_declaration(bag, &mut issues);

    if !root.join(DATA_DIR).is_dir() {
        issues.push(BagIssue::missing(DATA_DIR));
    }

    for manifest in bag.manifests().values() {
        let name = manifest.file_name();
        if !root.join(&name).is_file() {
            issues.push(BagIssue::missing(&name));
            continue;
        }
        check_entries(bag, manifest, &mut issues);
        check_unlisted(bag, manifest, &mut issues);
    }

    for manifest in bag.tag_manifests().values() {
        if root.join(manifest.file_name()).is_file() {
            check_entries(bag, manifest, &mut issues);
        }
    }

    check_oxum(bag, &mut issues);
    issues
}

fn check_declaration(bag: &Bag, issues: &mut Vec<BagIssue>) {
    let path = bag.directory().join(BAGIT_FILE);
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            issues.push(BagIssue::missing(BAGIT_FILE));
            return;
        }
        Err(e) => {
            issues.push(BagIssue::new(
                BAGIT_FILE,
                format!("cannot read {BAGIT_FILE}: {e}"),
                IssueKind::UnreadableFile,
            ));
            return;
        }
    };
    let readable = BagDeclaration::parse(&TagEncoding::Utf8.decode(&bytes))
        .map(|decl| decl.version.is_some())
        .unwrap_or(false);
    if !readable {
        issues.push(BagIssue::new(
            "bagit",
            "Error reading version information from bagit.txt file.",
            IssueKind::MalformedDeclaration,
        ));
    }
}

fn check_entries(bag: &Bag, manifest: &Manifest, issues: &mut Vec<BagIssue>) {
    let name = manifest.file_name();
    for mismatch in manifest.verify(bag.directory()) {
        let (message, kind) = match mismatch.kind {
            MismatchKind::ChecksumMismatch { .. } => {
                ("Checksum mismatch.".to_string(), IssueKind::ChecksumMismatch)
            }
            MismatchKind::Missing => (
                format!("File listed in {name} is missing."),
                IssueKind::MissingListedFile,
            ),
            MismatchKind::Unreadable { reason } => {
                (format!("Cannot read file: {reason}"), IssueKind::UnreadableFile)
            }
            MismatchKind::OutsideBag => (
                format!("Entry in {name} points outside the bag."),
                IssueKind::OutsideBag,
            ),
        };
        issues.push(BagIssue::new(mismatch.path, message, kind));
    }
}

fn check_unlisted(bag: &Bag, manifest: &Manifest, issues: &mut Vec<BagIssue>) {
    let files = match list_files(bag.directory(), ManifestKind::Payload) {
        Ok(files) => files,
        Err(e) => {
            issues.push(BagIssue::new(DATA_DIR, e.to_string(), IssueKind::UnreadableFile));
            return;
        }
    };
    for rel in files {
        if !manifest.contains(&rel) {
            let message = format!("File not listed in {}.", manifest.file_name());
            issues.push(BagIssue::new(rel, message, IssueKind::UnlistedFile));
        }
    }
}

fn check_oxum(bag: &Bag, issues: &mut Vec<BagIssue>) {
    let Some((_, declared)) = bag
        .bag_info()
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(PAYLOAD_OXUM))
    else {
        return;
    };
    let declared = declared.last();
    let expected: Oxum = match declared.parse() {
        Ok(oxum) => oxum,
        Err(message) => {
            issues.push(BagIssue::new(PAYLOAD_OXUM, message, IssueKind::OxumMismatch));
            return;
        }
    };
    match Oxum::compute(bag.directory()) {
        Ok(actual) if actual == expected => {}
        Ok(actual) => issues.push(BagIssue::new(
            PAYLOAD_OXUM,
            format!("{PAYLOAD_OXUM} is {expected} but the payload holds {actual}."),
            IssueKind::OxumMismatch,
        )),
        Err(e) => issues.push(BagIssue::new(PAYLOAD_OXUM, e.to_string(), IssueKind::UnreadableFile)),
    }
}
