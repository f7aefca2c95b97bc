//! Atomic file writes
//!
//! The file is either fully written or unchanged: content goes to a
//! temporary sibling first and is renamed over the target.

use crate::error::{StoreError, StoreResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Temporary sibling path used while writing `path`
fn temp_path_for(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "store".to_string());

    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    parent.join(format!(".{}.{}.tmp", filename, timestamp))
}

/// Write content to a file synchronously using atomic write
pub fn write_file_atomic_sync(path: impl AsRef<Path>, content: &str) -> StoreResult<()> {
    let path = path.as_ref();
    let path_buf = path.to_path_buf();

    ensure_parent_dir(path)?;
    let temp_path = temp_path_for(path);

    let write_result = (|| {
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        Ok::<(), std::io::Error>(())
    })();

    if let Err(e) = write_result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(StoreError::AtomicWriteError {
            path: path_buf,
            source: e,
        });
    }

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(StoreError::WriteError {
            path: path_buf,
            source: e,
        });
    }

    Ok(())
}

/// Create the parent directory of `path` if needed
pub fn ensure_parent_dir(path: impl AsRef<Path>) -> StoreResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::WriteError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }
    Ok(())
}
