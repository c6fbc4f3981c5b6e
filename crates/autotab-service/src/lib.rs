//! Session-scoped entry points: ingest a CSV, profile it, train on it and
//! predict with the trained artifact.

pub mod config;
pub mod error;
pub mod ids;
pub mod records;
pub mod service;
pub mod store;

pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult, StoreError, StoreResult};
pub use ids::{BlobId, SessionId};
pub use records::records_from_json;
pub use service::{AutoTab, IngestResponse, TrainResponse};
pub use store::{
    BlobStore, FileBlobStore, FileSessionStore, MemoryBlobStore, MemorySessionStore, SessionRecord,
    SessionStore, SessionUpdate,
};
