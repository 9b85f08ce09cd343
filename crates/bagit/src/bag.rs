use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use bagit_archive::{ArchiveFormat, Extracted};
use bagit_fetch::{FetchEntry, FetchList, FetchReport, Fetcher, HttpFetcher};
use bagit_info::{BagInfo, BagInfoValue};
use bagit_manifest::{list_files, Manifest, ManifestKind};
use bagit_types::paths::{payload_path, BAGIT_FILE, BAG_INFO_FILE, DATA_DIR, FETCH_FILE};
use bagit_types::{BagDeclaration, BagVersion, HashAlgorithm, TagEncoding};
use serde::{Deserialize, Serialize};

use crate::config::BagConfig;
use crate::error::{BagError, BagResult};
use crate::oxum::Oxum;
use crate::sanitize::{sanitize_payload, Rename};
use crate::validation::{collect_issues, BagIssue, ValidationState};

/// What an [`Bag::update`] pass changed on disk.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReport {
    pub renamed: Vec<Rename>,
    /// Payload files hashed for the first time.
    pub added: Vec<String>,
    /// Payload entries dropped because the file is gone.
    pub removed: Vec<String>,
    /// Payload files whose digest changed.
    pub changed: Vec<String>,
}

/// A BagIt bag on disk.
///
/// Holds one payload manifest and one tag manifest per active hash
/// algorithm, the `bag-info.txt` metadata and the `fetch.txt` entries.
/// Mutating operations change the in-memory state (and, for files, the
/// payload directory); [`Bag::update`] writes every tag file back.
#[derive(Debug)]
pub struct Bag {
    directory: PathBuf,
    config: BagConfig,
    declaration: BagDeclaration,
    manifests: BTreeMap<HashAlgorithm, Manifest>,
    tag_manifests: BTreeMap<HashAlgorithm, Manifest>,
    bag_info: BagInfo,
    fetch: FetchList,
    archive: Option<Extracted>,
    state: ValidationState,
    issues: Vec<BagIssue>,
}

impl Bag {
    /// Open the bag at `path`, creating it if needed.
    ///
    /// A `.zip`, `.tgz` or `.tar.gz` file is extracted into a temporary
    /// directory owned by the bag. A directory without `bagit.txt` is
    /// initialized with the required tag files (and the extended ones when
    /// `config` asks for them) and seeded with `config.bag_info`.
    pub fn open(path: impl AsRef<Path>, config: BagConfig) -> BagResult<Self> {
        let path = path.as_ref();
        let (directory, archive) = match ArchiveFormat::from_path(path) {
            Some(_) if !path.is_dir() => {
                let extracted = bagit_archive::extract(path)?;
                (extracted.root().to_path_buf(), Some(extracted))
            }
            _ => (path.to_path_buf(), None),
        };

        let created = !directory.join(BAGIT_FILE).exists();
        if created {
            initialize(&directory, &config)?;
        }

        let declaration = read_declaration(&directory)?;
        let mut bag = Self {
            directory,
            config,
            declaration,
            manifests: BTreeMap::new(),
            tag_manifests: BTreeMap::new(),
            bag_info: BagInfo::new(),
            fetch: FetchList::new(),
            archive,
            state: ValidationState::Unvalidated,
            issues: Vec::new(),
        };

        let algorithms = detect_algorithms(&bag.directory)?;
        let algorithms = if algorithms.is_empty() {
            BTreeSet::from([bag.config.hash_algorithm])
        } else {
            algorithms
        };
        for algorithm in algorithms {
            bag.load_algorithm(algorithm)?;
        }

        let encoding = bag.declaration.encoding.clone();
        bag.bag_info = BagInfo::load(&bag.directory, &encoding)?;
        bag.fetch = FetchList::load(&bag.directory, &encoding)?;
        if created && !bag.config.bag_info.is_empty() {
            for (key, value) in bag.config.bag_info.clone() {
                bag.bag_info.set(&key, &value)?;
            }
            bag.bag_info.write(&bag.directory, &encoding)?;
        }

        tracing::debug!(
            "opened bag {} ({} algorithms, {} fetch entries)",
            bag.directory.display(),
            bag.manifests.len(),
            bag.fetch.len()
        );

        if bag.config.fetch && !bag.fetch.is_empty() {
            let fetcher = HttpFetcher::new()?;
            bag.resolve_fetch(&fetcher);
        }
        if bag.config.validate {
            bag.validate();
        }
        Ok(bag)
    }

    fn load_algorithm(&mut self, algorithm: HashAlgorithm) -> BagResult<()> {
        let encoding = &self.declaration.encoding;
        let payload = Manifest::load(&self.directory, algorithm, ManifestKind::Payload, encoding)?;
        let tag = Manifest::load(&self.directory, algorithm, ManifestKind::Tag, encoding)?;
        self.manifests.insert(algorithm, payload);
        self.tag_manifests.insert(algorithm, tag);
        Ok(())
    }

    fn invalidate(&mut self) {
        self.state = ValidationState::Unvalidated;
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    /// The bag root. For an archive this is inside the extraction directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn data_directory(&self) -> PathBuf {
        self.directory.join(DATA_DIR)
    }

    pub fn config(&self) -> &BagConfig {
        &self.config
    }

    /// Declared version, `None` when `bagit.txt` has no readable version.
    pub fn version(&self) -> Option<BagVersion> {
        self.declaration.version
    }

    pub fn encoding(&self) -> &TagEncoding {
        &self.declaration.encoding
    }

    /// Active hash algorithms in name order.
    pub fn hash_algorithms(&self) -> Vec<HashAlgorithm> {
        self.manifests.keys().copied().collect()
    }

    pub fn manifests(&self) -> &BTreeMap<HashAlgorithm, Manifest> {
        &self.manifests
    }

    pub fn tag_manifests(&self) -> &BTreeMap<HashAlgorithm, Manifest> {
        &self.tag_manifests
    }

    /// Payload manifest for `algorithm`, if active.
    pub fn manifest(&self, algorithm: HashAlgorithm) -> Option<&Manifest> {
        self.manifests.get(&algorithm)
    }

    pub fn bag_info(&self) -> &BagInfo {
        &self.bag_info
    }

    pub fn fetch(&self) -> &FetchList {
        &self.fetch
    }

    /// Returns `true` if the bag was opened from an archive.
    pub fn is_compressed(&self) -> bool {
        self.archive.is_some()
    }

    pub fn compression(&self) -> Option<ArchiveFormat> {
        self.archive.as_ref().map(Extracted::format)
    }

    /// Returns `true` if `bag-info.txt`, `fetch.txt` or any tag manifest
    /// exists on disk.
    pub fn is_extended(&self) -> bool {
        if self.directory.join(BAG_INFO_FILE).is_file() || self.directory.join(FETCH_FILE).is_file() {
            return true;
        }
        HashAlgorithm::ALL
            .iter()
            .any(|a| self.directory.join(a.tag_manifest_file_name()).is_file())
    }

    pub fn validation_state(&self) -> ValidationState {
        self.state
    }

    // ---------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------

    /// Run a full validation pass and return whether the bag is valid.
    pub fn validate(&mut self) -> bool {
        self.issues = collect_issues(self);
        self.state = if self.issues.is_empty() {
            ValidationState::Valid
        } else {
            ValidationState::Invalid
        };
        tracing::debug!(
            "validated {}: {} issue(s)",
            self.directory.display(),
            self.issues.len()
        );
        self.state == ValidationState::Valid
    }

    /// Validate if needed and report the result.
    pub fn is_valid(&mut self) -> bool {
        match self.state {
            ValidationState::Unvalidated => self.validate(),
            state => state == ValidationState::Valid,
        }
    }

    /// Issues from the most recent validation pass.
    pub fn issues(&self) -> &[BagIssue] {
        &self.issues
    }

    /// Issues, optionally after a fresh validation pass.
    pub fn bag_errors(&mut self, revalidate: bool) -> &[BagIssue] {
        if revalidate {
            self.validate();
        }
        &self.issues
    }

    // ---------------------------------------------------------------
    // Reconciliation
    // ---------------------------------------------------------------

    /// Bring every tag file in line with the payload on disk.
    ///
    /// Payload names are sanitized first, then payload manifests are
    /// reconciled and written, then the remaining tag files, and finally the
    /// tag manifests so they cover everything written before them.
    pub fn update(&mut self) -> BagResult<UpdateReport> {
        let root = self.directory.clone();
        let data = root.join(DATA_DIR);
        fs::create_dir_all(&data).map_err(|e| BagError::io(&data, e))?;

        let mut report = UpdateReport {
            renamed: sanitize_payload(&root)?,
            ..Default::default()
        };

        let version = self.declaration.version.unwrap_or_default();
        self.declaration.version = Some(version);
        write_tag_file(&root, BAGIT_FILE, self.declaration.render().as_bytes())?;

        let encoding = self.declaration.encoding.clone();
        let (mut added, mut removed, mut changed) = (BTreeSet::new(), BTreeSet::new(), BTreeSet::new());
        for manifest in self.manifests.values_mut() {
            let pass = manifest.reconcile(&root, self.config.rehash)?;
            manifest.write(&root, &encoding)?;
            added.extend(pass.added);
            removed.extend(pass.removed);
            changed.extend(pass.changed);
        }
        report.added = added.into_iter().collect();
        report.removed = removed.into_iter().collect();
        report.changed = changed.into_iter().collect();

        let extended = self.is_extended() || !self.bag_info.is_empty() || !self.fetch.is_empty();
        if extended {
            self.bag_info.write(&root, &encoding)?;
        }
        if !self.fetch.is_empty() || root.join(FETCH_FILE).is_file() {
            self.fetch.write(&root, &encoding)?;
        }

        if extended {
            for (algorithm, manifest) in self.tag_manifests.iter_mut() {
                manifest.reconcile(&root, self.config.rehash)?;
                manifest.write(&root, &encoding)?;
                tracing::debug!("wrote {} ({} entries)", algorithm.tag_manifest_file_name(), manifest.len());
            }
        }

        tracing::info!(
            "updated {}: {} added, {} removed, {} changed, {} renamed",
            root.display(),
            report.added.len(),
            report.removed.len(),
            report.changed.len(),
            report.renamed.len()
        );
        self.issues.clear();
        self.invalidate();
        Ok(report)
    }

    // ---------------------------------------------------------------
    // Hash algorithms
    // ---------------------------------------------------------------

    /// Activate the algorithm named `name`. Adding an active one is a no-op.
    pub fn add_hash_encoding(&mut self, name: &str) -> BagResult<()> {
        self.add_hash_algorithm(name.parse()?)
    }

    pub fn add_hash_algorithm(&mut self, algorithm: HashAlgorithm) -> BagResult<()> {
        if self.manifests.contains_key(&algorithm) {
            return Ok(());
        }
        self.load_algorithm(algorithm)?;
        self.invalidate();
        Ok(())
    }

    /// Deactivate the algorithm named `name` and delete its manifest files.
    pub fn remove_hash_encoding(&mut self, name: &str) -> BagResult<()> {
        self.remove_hash_algorithm(name.parse()?)
    }

    /// Fails without changing anything when `algorithm` is the last one.
    pub fn remove_hash_algorithm(&mut self, algorithm: HashAlgorithm) -> BagResult<()> {
        if !self.manifests.contains_key(&algorithm) {
            return Ok(());
        }
        if self.manifests.len() == 1 {
            return Err(BagError::LastHashAlgorithm(algorithm));
        }
        self.manifests.remove(&algorithm);
        self.tag_manifests.remove(&algorithm);
        for name in [algorithm.manifest_file_name(), algorithm.tag_manifest_file_name()] {
            let path = self.directory.join(name);
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!("removed {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(BagError::io(&path, e)),
            }
        }
        self.invalidate();
        Ok(())
    }

    // ---------------------------------------------------------------
    // Payload files
    // ---------------------------------------------------------------

    /// Absolute paths of every payload file.
    pub fn bag_contents(&self) -> BagResult<Vec<PathBuf>> {
        Ok(list_files(&self.directory, ManifestKind::Payload)?
            .into_iter()
            .map(|rel| self.directory.join(rel))
            .collect())
    }

    /// Copy `src` into the payload at `dest` (`data/` is implied).
    pub fn add_file(&mut self, src: impl AsRef<Path>, dest: &str) -> BagResult<PathBuf> {
        let src = src.as_ref();
        let target = self.payload_target(dest)?;
        if !src.is_file() {
            return Err(BagError::io(
                src,
                io::Error::new(io::ErrorKind::NotFound, "source file does not exist"),
            ));
        }
        create_parent(&target)?;
        fs::copy(src, &target).map_err(|e| BagError::io(src, e))?;
        tracing::debug!("added {} as {}", src.display(), target.display());
        self.invalidate();
        Ok(target)
    }

    /// Write `content` into the payload at `dest`. Never overwrites.
    pub fn create_file(&mut self, content: impl AsRef<[u8]>, dest: &str) -> BagResult<PathBuf> {
        let target = self.payload_target(dest)?;
        if target.exists() {
            return Err(BagError::FileExists(target));
        }
        create_parent(&target)?;
        fs::write(&target, content).map_err(|e| BagError::io(&target, e))?;
        self.invalidate();
        Ok(target)
    }

    fn payload_target(&self, dest: &str) -> BagResult<PathBuf> {
        let rel = payload_path(dest);
        let escapes = Path::new(&rel)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || rel == format!("{DATA_DIR}/") {
            return Err(BagError::InvalidPath(dest.to_string()));
        }
        Ok(self.directory.join(rel))
    }

    /// `Payload-Oxum` of the payload currently on disk.
    pub fn payload_oxum(&self) -> BagResult<Oxum> {
        Oxum::compute(&self.directory)
    }

    // ---------------------------------------------------------------
    // bag-info
    // ---------------------------------------------------------------

    /// Add a metadata value; repeated keys accumulate.
    pub fn set_bag_info_data(&mut self, key: &str, value: &str) -> BagResult<()> {
        self.bag_info.set(key, value)?;
        self.invalidate();
        Ok(())
    }

    pub fn get_bag_info_data(&self, key: &str) -> Option<&BagInfoValue> {
        self.bag_info.get(key)
    }

    pub fn has_bag_info_data(&self, key: &str) -> bool {
        self.bag_info.has(key)
    }

    pub fn clear_bag_info_data(&mut self, key: &str) -> Option<BagInfoValue> {
        self.invalidate();
        self.bag_info.clear(key)
    }

    pub fn clear_all_bag_info(&mut self) {
        self.bag_info.clear_all();
        self.invalidate();
    }

    pub fn bag_info_keys(&self) -> Vec<&str> {
        self.bag_info.keys()
    }

    // ---------------------------------------------------------------
    // fetch
    // ---------------------------------------------------------------

    /// Append fetch entries, or replace them all when `merge` is false.
    pub fn add_fetch_entries(&mut self, entries: impl IntoIterator<Item = FetchEntry>, merge: bool) {
        self.fetch.add_entries(entries, merge);
        self.invalidate();
    }

    /// Download every fetch entry into the payload.
    ///
    /// Per-entry failures are reported, not raised, and never become
    /// validation issues.
    pub fn resolve_fetch(&mut self, fetcher: &dyn Fetcher) -> FetchReport {
        let report = bagit_fetch::resolve(
            &self.directory,
            &self.fetch,
            fetcher,
            self.config.fetch_concurrency,
        );
        if !report.fetched.is_empty() {
            self.invalidate();
        }
        report
    }

    // ---------------------------------------------------------------
    // Packaging
    // ---------------------------------------------------------------

    /// Package the bag directory into `output`.
    ///
    /// Without an explicit `format` it is taken from the extension of
    /// `output`, falling back to tgz.
    pub fn package(&self, output: impl AsRef<Path>, format: Option<ArchiveFormat>) -> BagResult<PathBuf> {
        let output = output.as_ref();
        let format = format
            .or_else(|| ArchiveFormat::from_path(output))
            .unwrap_or_default();
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| BagError::io(parent, e))?;
        }
        bagit_archive::create(&self.directory, output, format)?;
        Ok(output.to_path_buf())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create the minimal file set in `dir`, keeping anything already there.
fn initialize(dir: &Path, config: &BagConfig) -> BagResult<()> {
    let data = dir.join(DATA_DIR);
    fs::create_dir_all(&data).map_err(|e| BagError::io(&data, e))?;
    write_tag_file(dir, BAGIT_FILE, BagDeclaration::default().render().as_bytes())?;

    let algorithm = config.hash_algorithm;
    let mut scaffold = vec![algorithm.manifest_file_name()];
    if config.wants_extended() {
        scaffold.push(BAG_INFO_FILE.to_string());
        scaffold.push(algorithm.tag_manifest_file_name());
    }
    for name in scaffold {
        if !dir.join(&name).exists() {
            write_tag_file(dir, &name, b"")?;
        }
    }
    tracing::info!("initialized bag at {}", dir.display());
    Ok(())
}

fn read_declaration(dir: &Path) -> BagResult<BagDeclaration> {
    let path = dir.join(BAGIT_FILE);
    match fs::read(&path) {
        Ok(bytes) => Ok(BagDeclaration::parse(&TagEncoding::Utf8.decode(&bytes))?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BagDeclaration::default()),
        Err(e) => Err(BagError::io(&path, e)),
    }
}

/// Algorithms of every manifest file in `dir`.
fn detect_algorithms(dir: &Path) -> BagResult<BTreeSet<HashAlgorithm>> {
    let mut found = BTreeSet::new();
    for entry in fs::read_dir(dir).map_err(|e| BagError::io(dir, e))? {
        let entry = entry.map_err(|e| BagError::io(dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        match HashAlgorithm::from_manifest_file_name(name) {
            Some((algorithm, _)) => {
                found.insert(algorithm);
            }
            None if (name.starts_with("manifest-") || name.starts_with("tagmanifest-"))
                && name.ends_with(".txt") =>
            {
                tracing::warn!("ignoring manifest with unsupported algorithm: {name}");
            }
            None => {}
        }
    }
    Ok(found)
}

fn write_tag_file(dir: &Path, name: &str, bytes: &[u8]) -> BagResult<()> {
    let path = dir.join(name);
    fs::write(&path, bytes).map_err(|e| BagError::io(&path, e))
}

fn create_parent(path: &Path) -> BagResult<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(|e| BagError::io(parent, e)),
        None => Ok(()),
    }
}
