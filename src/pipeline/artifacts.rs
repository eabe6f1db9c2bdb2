// EB Env Backup: On-disk artifacts
//
// A backup is two sibling files:
//   <destination>           nonce || AEAD-sealed JSON
//   <destination>_dataKey   wrapped data key (envelope mode only)
//
// Both are staged as temp files in the destination directory and renamed into
// place only after both were written. The two renames are still separate
// operations; a crash between them leaves the ciphertext without its key.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tempfile::NamedTempFile;

use crate::crypto::EncryptionOutput;
use crate::error::{BackupError, Result};

/// Appended to the destination path to name the wrapped-key artifact.
pub const DATA_KEY_SUFFIX: &str = "_dataKey";

/// Paths written for one backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub ciphertext: PathBuf,
    pub data_key: Option<PathBuf>,
}

/// `<destination>_dataKey`
pub fn data_key_path(destination: &Path) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(DATA_KEY_SUFFIX);
    PathBuf::from(name)
}

/// `YYYYmmddHHMMSS`, used to name restored files and uploaded objects.
pub fn timestamp(now: DateTime<Local>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn stage(destination: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let dir = parent_dir(destination);
    let mut file = NamedTempFile::new_in(dir).map_err(|e| BackupError::io(dir, e))?;
    file.write_all(bytes)
        .and_then(|_| file.as_file().sync_all())
        .map_err(|e| BackupError::io(file.path(), e))?;
    Ok(file)
}

/// Persist the ciphertext and, when present, the wrapped key next to it.
/// Existing files at those paths are replaced. A keyless backup removes any
/// `_dataKey` left over from an earlier envelope backup to the same path.
pub fn write_artifacts(destination: &Path, output: &EncryptionOutput) -> Result<ArtifactPaths> {
    let ciphertext = stage(destination, output.encrypted_data())?;
    let data_key = if output.has_data_key() {
        let path = data_key_path(destination);
        Some((stage(&path, output.encrypted_data_key())?, path))
    } else {
        None
    };

    ciphertext
        .persist(destination)
        .map_err(|e| BackupError::io(destination, e.error))?;
    tracing::debug!(path = %destination.display(), "Wrote ciphertext");

    let data_key = match data_key {
        Some((staged, path)) => {
            staged
                .persist(&path)
                .map_err(|e| BackupError::io(&path, e.error))?;
            tracing::debug!(path = %path.display(), "Wrote wrapped data key");
            Some(path)
        }
        None => {
            remove_stale_key(destination)?;
            None
        }
    };

    Ok(ArtifactPaths {
        ciphertext: destination.to_path_buf(),
        data_key,
    })
}

fn remove_stale_key(destination: &Path) -> Result<()> {
    let path = data_key_path(destination);
    match std::fs::remove_file(&path) {
        Ok(()) => {
            tracing::warn!(path = %path.display(), "Removed stale wrapped data key");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BackupError::io(&path, e)),
    }
}

/// Write `bytes` to `path`, failing if something already exists there.
pub fn write_new(path: &Path, bytes: &[u8]) -> Result<()> {
    stage(path, bytes)?
        .persist_noclobber(path)
        .map_err(|e| match e.error.kind() {
            io::ErrorKind::AlreadyExists => BackupError::Configuration(format!(
                "{} already exists; retry in a second or choose another --output-dir",
                path.display()
            )),
            _ => BackupError::io(path, e.error),
        })?;
    Ok(())
}

pub fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| BackupError::io(path, e))
}
