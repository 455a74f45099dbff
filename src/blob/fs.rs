//! Filesystem blob store: bytes on disk under a configured root, content
//! type in a `.ctype` sidecar file next to the blob.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{BlobError, BlobStore, StoredBlob};

pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a blob key to a path under the root. Keys are slash-separated
    /// but must stay inside the root, so parent and absolute components are
    /// rejected as not-found.
    fn resolve(&self, key: &str) -> Result<PathBuf, BlobError> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !safe {
            return Err(BlobError::NotFound(key.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn sidecar(path: &Path) -> PathBuf {
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(".ctype");
        PathBuf::from(sidecar)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn save(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), BlobError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;
        fs::write(Self::sidecar(&path), content_type.as_bytes()).await?;
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<StoredBlob, BlobError> {
        let path = self.resolve(key)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BlobError::NotFound(key.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let content_type = match fs::read_to_string(Self::sidecar(&path)).await {
            Ok(ct) => ct,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                "application/octet-stream".to_string()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(StoredBlob { bytes, content_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load_round_trips_bytes_and_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        store
            .save("coverImages/dune.png", b"\x89PNG-ish", "image/png")
            .await
            .unwrap();

        let blob = store.load("coverImages/dune.png").await.unwrap();
        assert_eq!(blob.bytes, b"\x89PNG-ish");
        assert_eq!(blob.content_type, "image/png");
    }

    #[tokio::test]
    async fn missing_blob_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        assert!(matches!(
            store.load("coverImages/none.png").await,
            Err(BlobError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        assert!(matches!(
            store.load("../etc/passwd").await,
            Err(BlobError::NotFound(_))
        ));
        assert!(matches!(
            store.save("/abs/path", b"x", "text/plain").await,
            Err(BlobError::NotFound(_))
        ));
    }
}
