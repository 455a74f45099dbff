use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::auth::{generate_jwt, Claims};
use crate::context::AppContext;
use crate::error::ApiError;
use crate::middleware::auth::{authorize, Caller};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::validate::{self, FieldKind, Shape};

const LOGIN_SHAPE: Shape = &[
    ("uid", FieldKind::String),
    ("email", FieldKind::String),
];

/// POST /auth/login - development identity provider
///
/// Registers the (uid, email) pair in the identity directory and issues a
/// JWT carrying the account's current admin claim. In production this
/// whole surface belongs to the external identity subsystem; it exists
/// here so the API can be exercised end to end, and so a promoted caller
/// can pick up their admin claim by logging in again.
pub async fn login(
    State(ctx): State<AppContext>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    validate::validate(&payload, LOGIN_SHAPE)?;
    let uid = validate::str_field(&payload, "uid")?;
    let email = validate::str_field(&payload, "email")?;

    let account = ctx.directory.register(uid, email).await;
    let claims = Claims::new(uid.to_string(), Some(email.to_string()), account.admin);
    let token = generate_jwt(claims).map_err(|e| {
        tracing::error!("failed to issue token: {}", e);
        ApiError::internal("Failed to issue token")
    })?;

    Ok(ApiResponse::success(json!({
        "token": token,
        "uid": uid,
        "admin": account.admin
    })))
}

/// GET /api/auth/whoami - echo the authenticated caller
pub async fn whoami(caller: Option<Extension<Caller>>) -> ApiResult<Value> {
    let caller = authorize(caller.as_ref().map(|Extension(c)| c), false)?;
    Ok(ApiResponse::success(json!({
        "uid": caller.uid,
        "email": caller.email,
        "admin": caller.admin
    })))
}
