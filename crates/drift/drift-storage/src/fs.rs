//! JSON artifact I/O: atomic writes, optional reads, and an advisory
//! writer lock.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fd_lock::{RwLock, RwLockWriteGuard};
use serde::de::DeserializeOwned;
use serde::Serialize;

use drift_core::errors::StorageError;

/// Name of the lock file inside the audit directory.
pub const LOCK_FILE: &str = "audit.lock";

/// Create `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))
}

/// Serialize `value` to a sibling temp file, then rename it over `path`.
/// Readers see either the old artifact or the new one.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_vec_pretty(value).map_err(|e| StorageError::serialization(path, e))?;
    let tmp = temp_path(path);

    let mut file = File::create(&tmp).map_err(|e| StorageError::io(&tmp, e))?;
    let written = file
        .write_all(&json)
        .and_then(|()| file.sync_all())
        .map_err(|e| StorageError::io(&tmp, e));
    drop(file);

    if let Err(e) = written.and_then(|()| fs::rename(&tmp, path).map_err(|e| StorageError::io(path, e))) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

/// Read and parse `path`. A missing file is `Ok(None)`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::io(path, e)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StorageError::serialization(path, e))
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp-{}", std::process::id()))
}

/// Cross-process writer lock on `<dir>/audit.lock`.
pub struct StoreLock {
    lock_file: RwLock<File>,
    lock_path: PathBuf,
}

impl StoreLock {
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        let lock_path = dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| StorageError::io(&lock_path, e))?;
        Ok(Self {
            lock_file: RwLock::new(file),
            lock_path,
        })
    }

    /// Exclusive lock. Blocks until any other writer releases it.
    pub fn write(&mut self) -> Result<RwLockWriteGuard<'_, File>, StorageError> {
        let path = self.lock_path.clone();
        self.lock_file.write().map_err(|e| StorageError::io(&path, e))
    }

    /// Exclusive lock, non-blocking. Fails if another writer holds it.
    pub fn try_write(&mut self) -> Result<RwLockWriteGuard<'_, File>, StorageError> {
        let path = self.lock_path.display().to_string();
        self.lock_file.try_write().map_err(|_| StorageError::Locked {
            message: format!("another process is writing audit artifacts ({path})"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_round_trip_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        assert!(read_json::<BTreeMap<String, u32>>(&path).unwrap().is_none());

        let mut value = BTreeMap::new();
        value.insert("x".to_string(), 1u32);
        write_json_atomic(&path, &value).unwrap();
        assert_eq!(read_json::<BTreeMap<String, u32>>(&path).unwrap(), Some(value));

        // No temp file left behind.
        let names: Vec<_> = fs::read_dir(dir.path()).unwrap().filter_map(|e| e.ok()).collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let err = read_json::<BTreeMap<String, u32>>(&path).unwrap_err();
        assert!(matches!(err, StorageError::Serialization { .. }));
    }

    #[test]
    fn test_lock_file_created() {
        let dir = tempfile::tempdir().unwrap();
        let mut lock = StoreLock::open(dir.path()).unwrap();
        let _guard = lock.write().unwrap();
        assert!(dir.path().join(LOCK_FILE).exists());
    }

    #[test]
    fn test_try_write_fails_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let mut holder = StoreLock::open(dir.path()).unwrap();
        let guard = holder.write().unwrap();

        let mut other = StoreLock::open(dir.path()).unwrap();
        assert!(matches!(other.try_write(), Err(StorageError::Locked { .. })));

        drop(guard);
        assert!(other.try_write().is_ok());
    }
}
