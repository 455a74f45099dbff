//! In-process blob store for unit tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BlobError, BlobStore, StoredBlob};

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, StoredBlob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn save(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), BlobError> {
        let mut blobs = self.blobs.write().await;
        blobs.insert(
            key.to_string(),
            StoredBlob {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<StoredBlob, BlobError> {
        let blobs = self.blobs.read().await;
        blobs
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }
}
