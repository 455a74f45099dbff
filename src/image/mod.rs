//! Cover-image ingestion.
//!
//! Book covers arrive as a data URL (`data:<mime>;base64,<payload>`). The
//! ingestor extracts and checks the MIME type, decodes the payload, derives
//! a storage key from the book title, persists the bytes under that key
//! with the inferred content type, and returns the key together with a
//! long-lived signed retrieval URL.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::blob::BlobStore;
use crate::error::ApiError;

/// Result of a successful ingest
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedImage {
    pub storage_key: String,
    pub retrieval_url: String,
}

/// Decode, persist, and link a data-URL-encoded cover image.
pub async fn ingest(
    blobs: &dyn BlobStore,
    data_url: &str,
    title: &str,
) -> Result<IngestedImage, ApiError> {
    let (mime_type, payload) = split_data_url(data_url)?;
    let extension = extension_for(mime_type)?;

    let bytes = BASE64
        .decode(payload)
        .map_err(|_| ApiError::invalid_argument("Cover image payload is not valid base64!"))?;

    let storage_key = storage_key(title, extension);
    blobs.save(&storage_key, &bytes, mime_type).await?;
    let retrieval_url = blobs.signed_url(&storage_key);

    tracing::debug!(key = %storage_key, size = bytes.len(), "stored cover image");
    Ok(IngestedImage {
        storage_key,
        retrieval_url,
    })
}

/// Split `data:<mime>;base64,<payload>` into its MIME type and payload.
fn split_data_url(data_url: &str) -> Result<(&str, &str), ApiError> {
    data_url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .filter(|(mime, _)| !mime.is_empty())
        .ok_or_else(|| {
            ApiError::invalid_argument("Cover image must be a base64-encoded data URL!")
        })
}

/// Map a supported image MIME type to its file extension.
fn extension_for(mime_type: &str) -> Result<&'static str, ApiError> {
    match mime_type {
        "image/png" => Ok("png"),
        "image/jpeg" => Ok("jpg"),
        "image/gif" => Ok("gif"),
        "image/webp" => Ok("webp"),
        _ => Err(ApiError::invalid_argument(format!(
            "Unsupported cover image type '{}'",
            mime_type
        ))),
    }
}

/// Derive the storage key for a title. The sanitized title keeps keys
/// readable; the short digest of the raw title keeps distinct titles that
/// sanitize identically ("Dune: Messiah" / "Dune- Messiah") from
/// overwriting each other's blob. Deterministic, so re-uploading the same
/// title reuses the same key.
fn storage_key(title: &str, extension: &str) -> String {
    let digest = Sha256::digest(title.as_bytes());
    let tag: String = digest.iter().take(4).map(|b| format!("{:02x}", b)).collect();
    format!("coverImages/{}-{}.{}", sanitize_title(title), tag, extension)
}

/// Make a book title safe to use as a single path segment of the storage
/// key. Anything outside [A-Za-z0-9._-] becomes '-', so titles containing
/// separators cannot escape the coverImages/ prefix.
fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}
