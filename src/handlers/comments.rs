use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::error::ApiError;
use crate::middleware::auth::{authorize, Caller};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::store::collections;
use crate::validate::{self, FieldKind, Shape};

const COMMENT_SHAPE: Shape = &[
    ("bookId", FieldKind::String),
    ("text", FieldKind::String),
];

/// POST /api/comments - post a comment on a book
///
/// The comment's username is resolved server-side from the caller's
/// Profile; the payload never supplies it. A caller without a Profile
/// cannot comment.
pub async fn post_comment(
    State(ctx): State<AppContext>,
    caller: Option<Extension<Caller>>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let caller = authorize(caller.as_ref().map(|Extension(c)| c), false)?;
    validate::validate(&payload, COMMENT_SHAPE)?;
    let book_id = validate::str_field(&payload, "bookId")?;
    let text = validate::str_field(&payload, "text")?;

    let profiles = ctx
        .store
        .query(collections::PROFILES, "userId", &caller.uid, 1)
        .await?;
    let profile = profiles.first().ok_or_else(|| {
        ApiError::failed_precondition("You must create a profile before commenting!")
    })?;
    let username = profile.key.clone();

    let mut fields = crate::store::Fields::new();
    fields.insert("text".to_string(), json!(text));
    fields.insert("username".to_string(), json!(username));
    fields.insert(
        "dateCreated".to_string(),
        json!(Utc::now().to_rfc3339()),
    );
    fields.insert("book".to_string(), json!(book_id));
    let key = ctx.store.add(collections::COMMENTS, fields).await?;

    tracing::info!(book = book_id, username = %username, key = %key, "posted comment");
    Ok(ApiResponse::created(json!({
        "id": key,
        "username": username
    })))
}
