use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::debug;

use super::{BlobStore, SessionRecord, SessionStore, SessionUpdate};
use crate::error::{StoreError, StoreResult};
use crate::ids::{BlobId, SessionId};

/// Replace `path` with `bytes` through a temporary sibling file, so readers
/// never observe a partial write.
fn write_atomic(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let dir = path
        .parent()
        .ok_or_else(|| StoreError::Unavailable(format!("{} has no parent", path.display())))?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

fn read_optional(path: &Path) -> StoreResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// One JSON document per session under `<root>/sessions`.
#[derive(Debug)]
pub struct FileSessionStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = root.as_ref().join("sessions");
        fs::create_dir_all(&dir)?;
        Ok(FileSessionStore {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn path(&self, id: &SessionId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, id: &SessionId) -> StoreResult<Option<SessionRecord>> {
        match read_optional(&self.path(id))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn upsert(&self, id: &SessionId, update: SessionUpdate) -> StoreResult<SessionRecord> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Poisoned("session files"))?;
        let mut record = self.get(id)?.unwrap_or_else(|| SessionRecord::new(*id));
        record.apply(update);
        write_atomic(&self.path(id), &serde_json::to_vec_pretty(&record)?)?;
        debug!(session = %id, "session record written");
        Ok(record)
    }
}

/// One file per blob under `<root>/blobs`.
#[derive(Debug)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = root.as_ref().join("blobs");
        fs::create_dir_all(&dir)?;
        Ok(FileBlobStore { dir })
    }

    fn path(&self, id: &BlobId) -> PathBuf {
        self.dir.join(id.to_string())
    }
}

impl BlobStore for FileBlobStore {
    fn put(&self, bytes: Vec<u8>) -> StoreResult<BlobId> {
        let id = BlobId::new();
        write_atomic(&self.path(&id), &bytes)?;
        debug!(blob = %id, size = bytes.len(), "blob written");
        Ok(id)
    }

    fn get(&self, id: &BlobId) -> StoreResult<Option<Vec<u8>>> {
        read_optional(&self.path(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autotab_profile::ProfileReport;

    #[test]
    fn test_sessions_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let id = SessionId::new();
        {
            let store = FileSessionStore::open(dir.path()).unwrap();
            store
                .upsert(&id, SessionUpdate::Profiled(ProfileReport::default()))
                .unwrap();
        }
        let store = FileSessionStore::open(dir.path()).unwrap();
        let record = store.get(&id).unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.profile, Some(ProfileReport::default()));
        assert!(store.get(&SessionId::new()).unwrap().is_none());
    }

    #[test]
    fn test_blobs_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::open(dir.path()).unwrap();
        let id = store.put(vec![0, 1, 2, 255]).unwrap();
        assert_eq!(store.get(&id).unwrap(), Some(vec![0, 1, 2, 255]));
        assert_eq!(store.get(&BlobId::new()).unwrap(), None);
        assert!(dir.path().join("blobs").join(id.to_string()).exists());
    }

    #[test]
    fn test_corrupt_session_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::open(dir.path()).unwrap();
        let id = SessionId::new();
        fs::write(store.path(&id), b"{ not json").unwrap();
        assert!(matches!(store.get(&id), Err(StoreError::Serialization(_))));
    }
}
