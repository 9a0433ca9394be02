//! # archive: Deterministic zip packaging for directory targets
//!
//! Walks a directory tree and writes every file and subdirectory into a zip
//! archive with paths relative to the directory root, using maximum Deflate
//! compression. The archive is finished and synced to disk before the
//! function returns, so callers can hand the path straight to an uploader.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Summary of a finished archive run.
#[derive(Debug, Clone)]
pub struct ArchiveSummary {
    /// Number of file entries stored in the archive.
    pub entries: usize,
    /// Total size of the finished archive on disk, in bytes.
    pub bytes_written: u64,
}

#[derive(Debug)]
pub enum ArchiveError {
    /// The source path is missing or not a directory.
    NotADirectory(PathBuf),
    Io(io::Error),
    Zip(zip::result::ZipError),
}

impl From<io::Error> for ArchiveError {
    fn from(e: io::Error) -> Self {
        ArchiveError::Io(e)
    }
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(e: zip::result::ZipError) -> Self {
        ArchiveError::Zip(e)
    }
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveError::NotADirectory(path) => {
                write!(f, "not a directory: {}", path.display())
            }
            ArchiveError::Io(e) => write!(f, "io error while zipping: {e}"),
            ArchiveError::Zip(e) => write!(f, "zip error: {e}"),
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiveError::NotADirectory(_) => None,
            ArchiveError::Io(e) => Some(e),
            ArchiveError::Zip(e) => Some(e),
        }
    }
}

/// Zips the directory at `source` into a new archive at `out`.
///
/// Entry names are relative to `source`, so unpacking reproduces the
/// directory's contents without the leading local path. Empty directories
/// survive as explicit directory entries. The walk does not follow symlinks:
/// a link to a file is stored with the file's content, a link to a directory
/// becomes an empty directory entry.
pub fn zip_directory(source: &Path, out: &Path) -> Result<ArchiveSummary, ArchiveError> {
    if !source.is_dir() {
        error!(source = %source.display(), "Zip source is missing or not a directory");
        return Err(ArchiveError::NotADirectory(source.to_path_buf()));
    }

    info!(source = %source.display(), out = %out.display(), "Zipping directory");

    let archive = File::create(out)?;
    let mut writer = ZipWriter::new(archive);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    let mut entries = 0usize;
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        if relative.as_os_str().is_empty() {
            // The walk starts at `source` itself; the archive root needs no entry.
            continue;
        }
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.path().is_dir() {
            debug!(entry = %name, "Adding directory entry");
            writer.add_directory(name, options)?;
        } else {
            debug!(entry = %name, "Adding file entry");
            writer.start_file(name, options)?;
            let mut file = File::open(entry.path())?;
            io::copy(&mut file, &mut writer)?;
            entries += 1;
        }
    }

    let archive = writer.finish()?;
    // Force the bytes to disk so the upload step never reads a partial archive.
    archive.sync_all()?;
    let bytes_written = archive.metadata()?.len();

    info!(
        entries,
        total_bytes = bytes_written,
        "Folder successfully zipped"
    );

    Ok(ArchiveSummary {
        entries,
        bytes_written,
    })
}
