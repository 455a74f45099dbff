use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::guard;
use crate::middleware::auth::{authorize, Caller};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::store::collections;
use crate::validate::{self, FieldKind, Shape};

const AUTHOR_SHAPE: Shape = &[("name", FieldKind::String)];

/// POST /api/authors - create an author (admin only)
///
/// Pipeline: authorize (admin) -> validate -> uniqueness check on the
/// author name -> write. The uniqueness check is read-then-write; see
/// `crate::guard` for the concurrency caveat.
pub async fn create_author(
    State(ctx): State<AppContext>,
    caller: Option<Extension<Caller>>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    authorize(caller.as_ref().map(|Extension(c)| c), true)?;
    validate::validate(&payload, AUTHOR_SHAPE)?;
    let name = validate::str_field(&payload, "name")?;

    guard::ensure_author_absent(ctx.store.as_ref(), name).await?;

    let mut fields = crate::store::Fields::new();
    fields.insert("name".to_string(), json!(name));
    let key = ctx.store.add(collections::AUTHORS, fields).await?;

    tracing::info!(author = name, key = %key, "created author");
    Ok(ApiResponse::created(json!({ "id": key })))
}
