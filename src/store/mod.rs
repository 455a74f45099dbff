//! Document store abstraction.
//!
//! The catalogue persists everything as JSON documents organized into named
//! collections, each document addressed by a collection plus a string key.
//! The concrete backend is chosen once at startup: Postgres when a
//! `DATABASE_URL` is configured, an in-process map otherwise (tests, local
//! development).
//!
//! The interface deliberately offers no cross-document transactions; the
//! uniqueness checks layered on top of it are read-then-write and carry a
//! known race window under concurrent calls (see `crate::guard`).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Collection names used by the catalogue
pub mod collections {
    pub const AUTHORS: &str = "authors";
    pub const PROFILES: &str = "profiles";
    pub const BOOKS: &str = "books";
    pub const COMMENTS: &str = "comments";
}

/// Field set of a single document
pub type Fields = Map<String, Value>;

/// A stored document: its key within the collection plus its fields
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: String,
    pub fields: Fields,
}

/// Errors from document store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Keyed, collection-organized persistence backend: point lookups, simple
/// field-equality queries, and inserts/updates.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Return up to `limit` documents in `collection` whose `field` equals
    /// the given string value.
    async fn query(
        &self,
        collection: &str,
        field: &str,
        equals: &str,
        limit: usize,
    ) -> Result<Vec<Document>, StoreError>;

    /// Point lookup by key.
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError>;

    /// Insert with a store-generated key; returns the new key.
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Insert or replace the document at `key`.
    async fn set(&self, collection: &str, key: &str, fields: Fields) -> Result<(), StoreError>;

    /// Ping the backend. In-process backends are always healthy.
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
