//! In-process document store used for tests and local development.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Document, DocumentStore, Fields, StoreError};

/// Documents held in a map keyed by (collection, key). BTreeMap keeps
/// query results in a stable order, which makes test failures readable.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<BTreeMap<(String, String), Fields>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn query(
        &self,
        collection: &str,
        field: &str,
        equals: &str,
        limit: usize,
    ) -> Result<Vec<Document>, StoreError> {
        let documents = self.documents.read().await;
        let matches = documents
            .iter()
            .filter(|((coll, _), fields)| {
                coll == collection && fields.get(field).and_then(|v| v.as_str()) == Some(equals)
            })
            .take(limit)
            .map(|((_, key), fields)| Document {
                key: key.clone(),
                fields: fields.clone(),
            })
            .collect();
        Ok(matches)
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .get(&(collection.to_string(), key.to_string()))
            .map(|fields| Document {
                key: key.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let key = Uuid::new_v4().simple().to_string();
        let mut documents = self.documents.write().await;
        documents.insert((collection.to_string(), key.clone()), fields);
        Ok(key)
    }

    async fn set(&self, collection: &str, key: &str, fields: Fields) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        documents.insert((collection.to_string(), key.to_string()), fields);
        Ok(())
    }
}
