use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::image;
use crate::middleware::auth::{authorize, Caller};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::store::collections;
use crate::validate::{self, FieldKind, Shape};

const BOOK_SHAPE: Shape = &[
    ("title", FieldKind::String),
    ("authorId", FieldKind::String),
    ("coverImage", FieldKind::String),
    ("summary", FieldKind::String),
];

/// POST /api/books - create a book with a cover image (admin only)
///
/// Pipeline: authorize (admin) -> validate -> ingest the cover image ->
/// write the book referencing the author key and the image's retrieval
/// URL. A store failure after the image was persisted propagates as an
/// error and leaves the blob orphaned; there is no rollback.
pub async fn create_book(
    State(ctx): State<AppContext>,
    caller: Option<Extension<Caller>>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    authorize(caller.as_ref().map(|Extension(c)| c), true)?;
    validate::validate(&payload, BOOK_SHAPE)?;
    let title = validate::str_field(&payload, "title")?;
    let author_id = validate::str_field(&payload, "authorId")?;
    let cover_image = validate::str_field(&payload, "coverImage")?;
    let summary = validate::str_field(&payload, "summary")?;

    let ingested = image::ingest(ctx.blobs.as_ref(), cover_image, title).await?;

    let mut fields = crate::store::Fields::new();
    fields.insert("title".to_string(), json!(title));
    fields.insert(
        "coverImageUrl".to_string(),
        json!(ingested.retrieval_url),
    );
    fields.insert("author".to_string(), json!(author_id));
    fields.insert("summary".to_string(), json!(summary));
    let key = ctx.store.add(collections::BOOKS, fields).await?;

    tracing::info!(title, key = %key, "created book");
    Ok(ApiResponse::created(json!({
        "id": key,
        "coverImageUrl": ingested.retrieval_url
    })))
}
