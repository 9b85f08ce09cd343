use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use tar::{Archive, Builder, HeaderMode};

use crate::error::{ArchiveError, ArchiveResult};

pub(crate) fn write(dir: &Path, base: &str, output: &Path) -> ArchiveResult<()> {
    let io = |e: std::io::Error| ArchiveError::io(output, e);
    let file = File::create(output).map_err(io)?;
    let encoder = GzBuilder::new()
        .mtime(0)
        .write(BufWriter::new(file), Compression::default());

    let mut tar = Builder::new(encoder);
    tar.mode(HeaderMode::Deterministic);
    tar.follow_symlinks(false);
    tar.append_dir_all(base, dir).map_err(|e| ArchiveError::io(dir, e))?;

    let encoder = tar.into_inner().map_err(io)?;
    encoder.finish().map_err(io)?.flush().map_err(io)?;
    Ok(())
}

pub(crate) fn unpack(archive: &Path, dest: &Path) -> ArchiveResult<()> {
    let file = File::open(archive).map_err(|e| ArchiveError::io(archive, e))?;
    let mut tar = Archive::new(GzDecoder::new(file));
    tar.set_preserve_permissions(false);
    tar.unpack(dest).map_err(|e| ArchiveError::io(archive, e))
}
