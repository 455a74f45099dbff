//! Process-wide application context.
//!
//! Backend clients are constructed exactly once at startup and shared
//! read-only by every invocation; handlers receive the context as axum
//! state and never re-initialize a backend per call.

use std::sync::Arc;

use crate::blob::fs::FsBlobStore;
use crate::blob::BlobStore;
use crate::config;
use crate::identity::{IdentityDirectory, MemoryDirectory};
use crate::store::memory::MemoryStore;
use crate::store::postgres::PostgresStore;
use crate::store::{DocumentStore, StoreError};

#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub directory: Arc<dyn IdentityDirectory>,
}

impl AppContext {
    /// Build the context from the environment: Postgres when DATABASE_URL
    /// is configured, the in-memory store otherwise; blobs on disk under
    /// the configured root; the in-process identity directory.
    pub async fn from_env() -> Result<Self, StoreError> {
        let store: Arc<dyn DocumentStore> = if std::env::var("DATABASE_URL").is_ok() {
            Arc::new(PostgresStore::connect().await?)
        } else {
            tracing::info!("DATABASE_URL not set; using in-memory document store");
            Arc::new(MemoryStore::new())
        };

        let blob_root = &config::config().storage.blob_root;
        Ok(Self {
            store,
            blobs: Arc::new(FsBlobStore::new(blob_root)),
            directory: Arc::new(MemoryDirectory::new()),
        })
    }

    /// Fully in-memory context for tests.
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            blobs: Arc::new(crate::blob::memory::MemoryBlobStore::new()),
            directory: Arc::new(MemoryDirectory::new()),
        }
    }
}
