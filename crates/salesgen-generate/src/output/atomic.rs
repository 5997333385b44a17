use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::GenerationError;

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), GenerationError> {
    let data = serde_json::to_vec_pretty(value)?;
    write_bytes_atomic(path, &data)?;
    Ok(())
}

/// Write `data` next to `path` and rename it into place.
pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = non_empty_parent(path) {
        create_dir_all(parent)?;
    }

    let tmp_path = temp_path(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    std::fs::rename(&tmp_path, path)?;
    if let Some(parent) = non_empty_parent(path) {
        sync_dir(parent)?;
    }
    Ok(())
}

/// `<file>.tmp` in the same directory.
pub(crate) fn temp_path(path: &Path) -> io::Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "invalid path for atomic write")
    })?;
    let tmp_name = format!("{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

pub(crate) fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|parent| !parent.as_os_str().is_empty())
}

#[cfg(unix)]
pub(crate) fn sync_dir(path: &Path) -> io::Result<()> {
    let dir = OpenOptions::new().read(true).open(path)?;
    dir.sync_all()
}

#[cfg(not(unix))]
pub(crate) fn sync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}
