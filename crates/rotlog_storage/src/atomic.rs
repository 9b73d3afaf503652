//! Crash-safe whole-file replacement.
//!
//! Files managed by rotlog are never edited in place. Every mutation goes
//! through [`write_atomic`]: the new content is written to a temporary
//! sibling, synced to stable storage, and renamed over the target. A crash
//! at any point leaves the target either fully old or fully new - a partial
//! file is unobservable.

use crate::error::StorageResult;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Suffix appended to the target name while the replacement is in flight.
pub const TMP_SUFFIX: &str = "_TMP";

/// A temporary sibling file staged next to its target.
///
/// The sibling lives at `<target>_TMP`. Calling [`commit`](Self::commit)
/// syncs the sibling and renames it over the target; until then the target
/// is untouched. If the sibling is dropped without committing (an error on
/// the write path, or a crash) the target keeps its prior bytes and the
/// sibling is left on disk for diagnosis. The next replacement of the same
/// target truncates it.
#[derive(Debug)]
pub struct TempSibling {
    target: PathBuf,
    temp: PathBuf,
    file: File,
}

impl TempSibling {
    /// Creates (or truncates) the temporary sibling of `target`.
    pub fn create(target: &Path) -> StorageResult<Self> {
        let temp = sibling_path(target);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp)?;
        Ok(Self {
            target: target.to_path_buf(),
            temp,
            file,
        })
    }

    /// Appends `bytes` to the staged content.
    pub fn write_all(&mut self, bytes: &[u8]) -> StorageResult<()> {
        self.file.write_all(bytes)?;
        Ok(())
    }

    /// Syncs the staged content and renames it over the target.
    ///
    /// The parent directory is fsynced afterwards so the rename itself
    /// survives a crash.
    pub fn commit(self) -> StorageResult<()> {
        self.file.sync_all()?;
        drop(self.file);
        fs::rename(&self.temp, &self.target)?;
        sync_parent_dir(&self.target)?;
        Ok(())
    }

    /// Path of the temporary sibling file.
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        &self.temp
    }
}

/// Atomically replaces the content of `path` with `bytes`.
///
/// Writes to `<path>_TMP`, fsyncs, then renames over `path`. Returns the
/// number of bytes written. On any failure the prior content of `path` is
/// unmodified; no retry is attempted.
///
/// # Errors
///
/// Returns an error if the temp file cannot be created, written, synced,
/// or renamed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<usize> {
    let mut staged = TempSibling::create(path)?;
    staged.write_all(bytes)?;
    staged.commit()?;
    Ok(bytes.len())
}

fn sibling_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(TMP_SUFFIX);
    PathBuf::from(name)
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> StorageResult<()> {
    // NTFS journaling covers metadata durability; directory fsync is not
    // supported on Windows.
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_new_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log_0");

        let n = write_atomic(&path, b"hello").unwrap();
        assert_eq!(n, 5);
        assert_eq!(fs::read(&path).unwrap(), b"hello");
        // No temp artifact after a successful commit.
        assert!(!path.with_file_name("log_0_TMP").exists());
    }

    #[test]
    fn replaces_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log");

        write_atomic(&path, b"old bytes").unwrap();
        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn empty_payload_truncates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log");

        write_atomic(&path, b"something").unwrap();
        let n = write_atomic(&path, b"").unwrap();
        assert_eq!(n, 0);
        assert_eq!(fs::read(&path).unwrap().len(), 0);
    }

    #[test]
    fn failure_leaves_missing_target_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("log");

        // Temp creation fails because the parent does not exist.
        let result = write_atomic(&path, b"data");
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn crash_before_rename_keeps_old_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log");

        write_atomic(&path, b"original").unwrap();

        // Simulate a crash after the temp file is fully written but
        // before the rename: stage content and drop without committing.
        let mut staged = TempSibling::create(&path).unwrap();
        staged.write_all(b"replacement").unwrap();
        let temp = staged.temp_path().to_path_buf();
        drop(staged);

        assert_eq!(fs::read(&path).unwrap(), b"original");
        // The abandoned temp file stays behind for diagnosis.
        assert!(temp.exists());

        // The next durable write reclaims the temp path.
        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!temp.exists());
    }
}
