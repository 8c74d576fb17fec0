//! On-disk layout: directory bootstrap, `.part` temp files, and promotion.
//!
//! Downloads land in a temp sibling of their final path and are renamed into
//! place only after verification, so a final path never holds unverified bytes.

mod filename;

pub use filename::checked_file_name;

use crate::error::{Result, SyncError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before promotion.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `mod.zip` → `mod.zip.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Create each directory if absent. Already-present directories are fine.
pub fn ensure_dirs<I, P>(dirs: I) -> Result<()>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    for dir in dirs {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| SyncError::io("create dir", dir, e))?;
    }
    Ok(())
}

/// Remove a file, treating "already gone" as success.
/// Returns whether a file was actually removed.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SyncError::io("remove", path, e)),
    }
}

/// Replace `live` with `temp` in one rename. `temp` no longer exists afterwards.
/// Both paths must be on the same filesystem.
pub fn promote(temp: &Path, live: &Path) -> Result<()> {
    fs::rename(temp, live).map_err(|e| SyncError::io("rename", temp, e))
}

/// Delete leftover `.part` files in `dir` from an interrupted earlier run.
/// Returns the number of files removed.
pub fn sweep_partials(dir: &Path) -> Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(it) => it,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(SyncError::io("read dir", dir, e)),
    };
    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|e| SyncError::io("read dir", dir, e))?;
        let path = entry.path();
        let is_partial = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(TEMP_SUFFIX));
        if is_partial && path.is_file() && remove_if_exists(&path)? {
            tracing::debug!(path = %path.display(), "removed stale partial download");
            removed += 1;
        }
    }
    Ok(removed)
}
