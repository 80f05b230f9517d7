//! Persisting downloaded attachments.
//!
//! Bodies are written to a `.part` sibling, synced, then atomically renamed
//! to the final name, so a crash never leaves a truncated file under the
//! final name.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Creating or writing an output file failed.
#[derive(Debug, Error)]
#[error("failed to write {}: {source}", .path.display())]
pub struct PersistenceError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Path for the temp file: appends `.part` to the final path (e.g. `file.xlsx` → `file.xlsx.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Write `bytes` to `final_path` via temp file + rename. Overwrites an existing file.
pub fn write_file(final_path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    let temp = temp_path(final_path);
    let written = write_and_sync(&temp, bytes).and_then(|()| fs::rename(&temp, final_path));
    if let Err(source) = written {
        if temp.exists() {
            if let Err(e) = fs::remove_file(&temp) {
                tracing::debug!(path = %temp.display(), error = %e, "could not remove temp file");
            }
        }
        return Err(PersistenceError {
            path: final_path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
