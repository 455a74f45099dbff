//! Postgres-backed document store.
//!
//! Documents live in a single `documents` table with a JSONB field set and
//! a primary key on (collection, key). The key constraint makes key-level
//! uniqueness (profile usernames) structural; field-equality uniqueness is
//! still enforced by read-then-write in `crate::guard` and keeps its race
//! window.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use super::{Document, DocumentStore, Fields, StoreError};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect using `DATABASE_URL` and bootstrap the documents table.
    /// Called once at process start; the resulting store is shared by all
    /// invocations.
    pub async fn connect() -> Result<Self, StoreError> {
        let raw = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::ConfigMissing("DATABASE_URL"))?;
        let url = url::Url::parse(&raw).map_err(|_| StoreError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new().connect(url.as_str()).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                collection text NOT NULL,
                key text NOT NULL,
                fields jsonb NOT NULL,
                created_at timestamptz NOT NULL DEFAULT now(),
                PRIMARY KEY (collection, key)
            )",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS documents_fields_idx
             ON documents USING gin (fields)",
        )
        .execute(&pool)
        .await?;

        info!("Connected document store to Postgres");
        Ok(Self { pool })
    }

    fn row_to_document(row: &sqlx::postgres::PgRow) -> Result<Document, StoreError> {
        let key: String = row.try_get("key")?;
        let fields: Value = row.try_get("fields")?;
        let fields = fields.as_object().cloned().unwrap_or_default();
        Ok(Document { key, fields })
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn query(
        &self,
        collection: &str,
        field: &str,
        equals: &str,
        limit: usize,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query(
            "SELECT key, fields FROM documents
             WHERE collection = $1 AND fields->>$2 = $3
             LIMIT $4",
        )
        .bind(collection)
        .bind(field)
        .bind(equals)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_document).collect()
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query(
            "SELECT key, fields FROM documents WHERE collection = $1 AND key = $2",
        )
        .bind(collection)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_document).transpose()
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let key = Uuid::new_v4().simple().to_string();
        sqlx::query("INSERT INTO documents (collection, key, fields) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(&key)
            .bind(Value::Object(fields))
            .execute(&self.pool)
            .await?;
        Ok(key)
    }

    async fn set(&self, collection: &str, key: &str, fields: Fields) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO documents (collection, key, fields) VALUES ($1, $2, $3)
             ON CONFLICT (collection, key) DO UPDATE SET fields = EXCLUDED.fields",
        )
        .bind(collection)
        .bind(key)
        .bind(Value::Object(fields))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
