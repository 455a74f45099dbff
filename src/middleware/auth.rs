use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::auth::Claims;
use crate::config;
use crate::error::ApiError;

/// Authenticated caller context extracted from JWT
#[derive(Clone, Debug)]
pub struct Caller {
    pub uid: String,
    pub email: Option<String>,
    pub admin: bool,
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Self {
            uid: claims.sub,
            email: claims.email,
            admin: claims.admin,
        }
    }
}

/// Authorizer: checks the caller identity against the operation's
/// requirement. Handlers run this before touching any backend, so an
/// unauthenticated call never reaches the store.
pub fn authorize(caller: Option<&Caller>, require_admin: bool) -> Result<&Caller, ApiError> {
    let caller = caller
        .ok_or_else(|| ApiError::unauthenticated("You must be logged in to use this feature!"))?;
    if require_admin && !caller.admin {
        return Err(ApiError::permission_denied(
            "You must be an admin to use this feature!",
        ));
    }
    Ok(caller)
}

/// JWT middleware that attaches a `Caller` to the request when a valid
/// Bearer token is present. A missing header is not an error here - whether
/// authentication is required is each handler's decision (via `authorize`).
/// A token that is present but invalid is rejected outright.
pub async fn attach_caller(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, impl IntoResponse> {
    match extract_jwt_from_headers(&headers) {
        None => {}
        Some(Err(msg)) => return Err(reject(msg)),
        Some(Ok(token)) => {
            let claims = validate_jwt(&token).map_err(reject)?;
            request.extensions_mut().insert(Caller::from(claims));
        }
    }

    Ok(next.run(request).await)
}

fn reject(msg: String) -> (StatusCode, Json<serde_json::Value>) {
    let api_error = ApiError::unauthenticated(msg);
    (
        StatusCode::from_u16(api_error.status_code()).unwrap_or(StatusCode::UNAUTHORIZED),
        Json(api_error.to_json()),
    )
}

/// Extract JWT token from Authorization header, if one was sent at all
fn extract_jwt_from_headers(headers: &HeaderMap) -> Option<Result<String, String>> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))?;

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(_) => return Some(Err("Invalid Authorization header format".to_string())),
    };

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Some(Err("Empty JWT token".to_string()));
        }
        Some(Ok(token.to_string()))
    } else {
        Some(Err(
            "Authorization header must use Bearer token format".to_string()
        ))
    }
}

/// Validate JWT token and extract claims
fn validate_jwt(token: &str) -> Result<Claims, String> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid JWT token: {}", e))?;

    Ok(token_data.claims)
}
