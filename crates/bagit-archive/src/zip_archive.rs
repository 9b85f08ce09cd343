use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{ArchiveError, ArchiveResult};

pub(crate) fn write(dir: &Path, base: &str, output: &Path) -> ArchiveResult<()> {
    let file = File::create(output).map_err(|e| ArchiveError::io(output, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.add_directory(format!("{base}/"), options)?;
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| ArchiveError::Walk(dir.to_path_buf(), e.to_string()))?;
        let rel = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| ArchiveError::Walk(dir.to_path_buf(), e.to_string()))?;
        let name = format!(
            "{base}/{}",
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        );

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), options)?;
        } else if entry.file_type().is_file() {
            zip.start_file(name, options)?;
            let mut src = File::open(entry.path()).map_err(|e| ArchiveError::io(entry.path(), e))?;
            io::copy(&mut src, &mut zip).map_err(|e| ArchiveError::io(entry.path(), e))?;
        } else {
            tracing::warn!("skipping non-regular file {:?}", entry.path());
        }
    }
    zip.finish()?.flush().map_err(|e| ArchiveError::io(output, e))?;
    Ok(())
}

pub(crate) fn unpack(archive: &Path, dest: &Path) -> ArchiveResult<()> {
    let file = File::open(archive).map_err(|e| ArchiveError::io(archive, e))?;
    let mut zip = ZipArchive::new(file)?;
    zip.extract(dest)?;
    Ok(())
}
