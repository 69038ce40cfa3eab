//! Snapshot persistence
//!
//! Writes go to a temporary sibling file that is renamed over the target, so a
//! reader sees either the previous snapshot or the new one, never a partial file.

use crate::snapshot::RegistryData;
use crate::{SnapshotError, SnapshotResult};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

fn io_error(path: &Path, source: io::Error) -> SnapshotError {
    SnapshotError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "snapshot".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Atomically replaces the snapshot at `path`
///
/// Missing parent directories are created. If any step fails the previous
/// snapshot is left untouched and the temporary file is removed.
pub fn write_snapshot(path: &Path, data: &RegistryData) -> SnapshotResult<()> {
    let json = serde_json::to_string_pretty(data)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }

    let tmp_path = temp_path_for(path);
    let written = write_and_sync(&tmp_path, json.as_bytes())
        .and_then(|()| clear_target(path))
        .and_then(|()| fs::rename(&tmp_path, path));

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error(path, e));
    }

    tracing::debug!("Committed snapshot to {}", path.display());
    Ok(())
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.write_all(b"\n")?;
    file.sync_all()
}

/// Rename does not replace an existing file on Windows
#[cfg(target_os = "windows")]
fn clear_target(path: &Path) -> io::Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn clear_target(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Loads the snapshot at `path`
///
/// # Returns
///
/// * `Ok(Some(RegistryData))` - The snapshot
/// * `Ok(None)` - No snapshot has been produced yet
/// * `Err(SnapshotError)` - The file exists but could not be read or parsed
pub fn load_snapshot(path: &Path) -> SnapshotResult<Option<RegistryData>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error(path, e)),
    };

    Ok(Some(serde_json::from_str(&content)?))
}
