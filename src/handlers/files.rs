use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;

use crate::blob;
use crate::config;
use crate::context::AppContext;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    pub exp: i64,
    pub sig: String,
}

/// GET /files/*key - dereference a signed retrieval URL
///
/// Verifies the signature and expiry issued by the blob store before
/// serving the bytes with their stored content type.
pub async fn file_get(
    State(ctx): State<AppContext>,
    Path(key): Path<String>,
    query: Option<Query<SignedQuery>>,
) -> Result<Response, ApiError> {
    // A missing or non-numeric exp/sig pair is a malformed request, not an
    // extractor detail; surface it as the structured error every other
    // failure path uses.
    let Query(query) = query.ok_or_else(|| {
        ApiError::invalid_argument("File links require exp and sig query parameters")
    })?;

    let key = key.trim_start_matches('/');
    let secret = &config::config().security.jwt_secret;

    if query.exp < Utc::now().timestamp() {
        return Err(ApiError::permission_denied("This file link has expired"));
    }
    if !blob::verify(secret, key, query.exp, &query.sig) {
        return Err(ApiError::permission_denied("Invalid file link signature"));
    }

    let stored = ctx.blobs.load(key).await?;
    Ok((
        [(header::CONTENT_TYPE, stored.content_type)],
        stored.bytes,
    )
        .into_response())
}
