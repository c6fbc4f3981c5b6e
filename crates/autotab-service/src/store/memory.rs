use std::collections::HashMap;
use std::sync::RwLock;

use super::{BlobStore, SessionRecord, SessionStore, SessionUpdate};
use crate::error::{StoreError, StoreResult};
use crate::ids::{BlobId, SessionId};

/// Session records held in process memory.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, id: &SessionId) -> StoreResult<Option<SessionRecord>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| StoreError::Poisoned("session map"))?;
        Ok(sessions.get(id).cloned())
    }

    fn upsert(&self, id: &SessionId, update: SessionUpdate) -> StoreResult<SessionRecord> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| StoreError::Poisoned("session map"))?;
        let record = sessions
            .entry(*id)
            .or_insert_with(|| SessionRecord::new(*id));
        record.apply(update);
        Ok(record.clone())
    }
}

/// Blobs held in process memory.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<BlobId, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, bytes: Vec<u8>) -> StoreResult<BlobId> {
        let id = BlobId::new();
        self.blobs
            .write()
            .map_err(|_| StoreError::Poisoned("blob map"))?
            .insert(id, bytes);
        Ok(id)
    }

    fn get(&self, id: &BlobId) -> StoreResult<Option<Vec<u8>>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| StoreError::Poisoned("blob map"))?;
        Ok(blobs.get(id).cloned())
    }
}
