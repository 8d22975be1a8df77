//! FS plumbing for the write path: temp-file naming, atomic replace,
//! directory fsync.

use std::fs;
#[cfg(unix)]
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::errors::StoreResult;

/// Temp-file path next to the destination (same directory, so the final
/// rename never crosses a filesystem boundary).
pub(crate) fn tmp_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    dest.with_file_name(name)
}

#[cfg(unix)]
pub(crate) fn fsync_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn fsync_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Atomically replace `dest` with `tmp`: rename, then fsync the parent
/// directory (best-effort on non-unix). A reader sees either the old
/// complete file or the new complete file, never a mix.
pub(crate) fn atomic_replace(tmp: &Path, dest: &Path) -> StoreResult<()> {
    fs::rename(tmp, dest)?;
    let _ = fsync_dir(dest);
    Ok(())
}
