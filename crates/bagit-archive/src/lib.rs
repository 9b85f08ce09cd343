//! Archive Adapter: package a bag directory as zip or tar.gz, and extract a
//! packaged bag into a temporary working directory.
//!
//! # Key Types
//!
//! - [`ArchiveFormat`] -- `zip` or `tgz`, detected from the file extension
//! - [`Extracted`] -- A temp directory holding an unpacked bag
//!
//! Archive entries are prefixed with the bag directory's base name, so
//! `package("/tmp/mybag", "out.tgz")` produces `mybag/bagit.txt`,
//! `mybag/data/...` and so on.

pub mod error;
pub mod format;
mod tgz;
mod zip_archive;

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub use error::{ArchiveError, ArchiveResult};
pub use format::ArchiveFormat;

/// A bag unpacked into a temporary directory.
///
/// The directory and everything in it are removed on drop.
#[derive(Debug)]
pub struct Extracted {
    tempdir: TempDir,
    root: PathBuf,
    format: ArchiveFormat,
}

impl Extracted {
    /// The bag root inside the temp directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    /// The temp directory itself.
    pub fn tempdir(&self) -> &Path {
        self.tempdir.path()
    }
}

/// Write `dir` to `output` in `format`.
pub fn create(dir: &Path, output: &Path, format: ArchiveFormat) -> ArchiveResult<()> {
    let base = dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ArchiveError::InvalidSource(dir.to_path_buf()))?;
    match format {
        ArchiveFormat::Zip => zip_archive::write(dir, base, output)?,
        ArchiveFormat::Tgz => tgz::write(dir, base, output)?,
    }
    tracing::info!("packaged {} as {}", dir.display(), output.display());
    Ok(())
}

/// Unpack `archive` into a fresh temp directory.
///
/// The bag root is `<tmp>/<stem>` when present, else the only top-level
/// directory, else the temp directory itself. `data/` is created if the
/// archive lacks it.
pub fn extract(archive: &Path) -> ArchiveResult<Extracted> {
    let format = ArchiveFormat::from_path(archive)
        .ok_or_else(|| ArchiveError::UnsupportedFormat(archive.to_path_buf()))?;
    let tempdir = tempfile::Builder::new()
        .prefix("bagit-")
        .tempdir()
        .map_err(|e| ArchiveError::io(std::env::temp_dir(), e))?;

    match format {
        ArchiveFormat::Zip => zip_archive::unpack(archive, tempdir.path())?,
        ArchiveFormat::Tgz => tgz::unpack(archive, tempdir.path())?,
    }

    let root = locate_root(tempdir.path(), format.stem(archive).as_deref())?;
    let data = root.join("data");
    fs::create_dir_all(&data).map_err(|e| ArchiveError::io(&data, e))?;
    tracing::debug!("extracted {} into {}", archive.display(), root.display());

    Ok(Extracted {
        tempdir,
        root,
        format,
    })
}

fn locate_root(tmp: &Path, stem: Option<&str>) -> ArchiveResult<PathBuf> {
    if let Some(stem) = stem {
        let candidate = tmp.join(stem);
        if candidate.is_dir() {
            return Ok(candidate);
        }
    }
    let mut top = Vec::new();
    for entry in fs::read_dir(tmp).map_err(|e| ArchiveError::io(tmp, e))? {
        let entry = entry.map_err(|e| ArchiveError::io(tmp, e))?;
        top.push(entry.path());
    }
    match top.as_slice() {
        [only] if only.is_dir() => Ok(only.clone()),
        _ => Ok(tmp.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bag(parent: &Path) -> PathBuf {
        let bag = parent.join("mybag");
        fs::create_dir_all(bag.join("data/imgs")).unwrap();
        fs::write(bag.join("bagit.txt"), "BagIt-Version: 0.96\n").unwrap();
        fs::write(bag.join("data/missing.txt"), "blank\n").unwrap();
        fs::write(bag.join("data/imgs/a.png"), [0u8, 1, 2, 3]).unwrap();
        bag
    }

    fn round_trip(format: ArchiveFormat, name: &str) {
        let src = tempfile::tempdir().unwrap();
        let bag = sample_bag(src.path());
        let out = src.path().join(name);

        create(&bag, &out, format).unwrap();
        assert!(out.is_file());

        let extracted = extract(&out).unwrap();
        assert_eq!(extracted.format(), format);
        assert!(extracted.root().ends_with("mybag"));
        assert_eq!(
            fs::read(extracted.root().join("data/imgs/a.png")).unwrap(),
            vec![0u8, 1, 2, 3]
        );
        assert_eq!(
            fs::read_to_string(extracted.root().join("bagit.txt")).unwrap(),
            "BagIt-Version: 0.96\n"
        );
    }

    #[test]
    fn zip_round_trip() {
        round_trip(ArchiveFormat::Zip, "mybag.zip");
    }

    #[test]
    fn tgz_round_trip() {
        round_trip(ArchiveFormat::Tgz, "mybag.tgz");
    }

    #[test]
    fn root_falls_back_to_single_directory() {
        let src = tempfile::tempdir().unwrap();
        let bag = sample_bag(src.path());
        let out = src.path().join("renamed.tar.gz");
        create(&bag, &out, ArchiveFormat::Tgz).unwrap();

        let extracted = extract(&out).unwrap();
        assert!(extracted.root().ends_with("mybag"));
    }

    #[test]
    fn missing_data_dir_is_created() {
        let src = tempfile::tempdir().unwrap();
        let bag = src.path().join("bare");
        fs::create_dir_all(&bag).unwrap();
        fs::write(bag.join("bagit.txt"), "BagIt-Version: 0.96\n").unwrap();
        let out = src.path().join("bare.zip");
        create(&bag, &out, ArchiveFormat::Zip).unwrap();

        let extracted = extract(&out).unwrap();
        assert!(extracted.root().join("data").is_dir());
    }

    #[test]
    fn temp_dir_is_removed_on_drop() {
        let src = tempfile::tempdir().unwrap();
        let bag = sample_bag(src.path());
        let out = src.path().join("mybag.zip");
        create(&bag, &out, ArchiveFormat::Zip).unwrap();

        let extracted = extract(&out).unwrap();
        let tmp = extracted.tempdir().to_path_buf();
        assert!(tmp.exists());
        drop(extracted);
        assert!(!tmp.exists());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = extract(Path::new("/tmp/bag.rar")).unwrap_err();
        assert!(matches!(err, ArchiveError::UnsupportedFormat(_)));
    }
}
