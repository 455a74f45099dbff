use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::config;
use crate::context::AppContext;
use crate::guard;
use crate::middleware::auth::{authorize, Caller};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::store::collections;
use crate::validate::{self, FieldKind, Shape};

const PROFILE_SHAPE: Shape = &[("username", FieldKind::String)];

/// POST /api/profiles - create the caller's profile
///
/// Pipeline: authorize -> validate -> no existing profile for this caller
/// -> username free -> maybe attach admin claim -> write keyed by
/// username. The username is the Profile document's key, so its uniqueness
/// is structural in stores with key constraints; the per-caller check is a
/// field query and stays read-then-write.
pub async fn create_profile(
    State(ctx): State<AppContext>,
    caller: Option<Extension<Caller>>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let caller = authorize(caller.as_ref().map(|Extension(c)| c), false)?;
    validate::validate(&payload, PROFILE_SHAPE)?;
    let username = validate::str_field(&payload, "username")?;

    guard::ensure_profile_absent_for_caller(ctx.store.as_ref(), &caller.uid).await?;
    guard::ensure_username_free(ctx.store.as_ref(), username).await?;

    // Flag the caller as admin if their registered email is the configured
    // administrator account. The claim surfaces in tokens issued from now on.
    guard::maybe_promote_to_admin(
        ctx.directory.as_ref(),
        &caller.uid,
        &config::config().accounts.admin_email,
    )
    .await;

    let mut fields = crate::store::Fields::new();
    fields.insert("userId".to_string(), json!(caller.uid));
    ctx.store
        .set(collections::PROFILES, username, fields)
        .await?;

    tracing::info!(username, uid = %caller.uid, "created profile");
    Ok(ApiResponse::created(json!({ "username": username })))
}
