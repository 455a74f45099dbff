// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// API error surfaced to the caller as a structured (code, message) pair.
///
/// Every handler failure is one of these; backend errors are converted via
/// `From` impls and never leak raw internals to the client.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    InvalidArgument(String),

    // 401 Unauthorized
    Unauthenticated(String),

    // 403 Forbidden
    PermissionDenied(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    AlreadyExists(String),

    // 412 Precondition Failed
    FailedPrecondition(String),

    // 500 Internal Server Error
    Internal(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidArgument(_) => 400,
            ApiError::Unauthenticated(_) => 401,
            ApiError::PermissionDenied(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::AlreadyExists(_) => 409,
            ApiError::FailedPrecondition(_) => 412,
            ApiError::Internal(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::InvalidArgument(msg)
            | ApiError::Unauthenticated(msg)
            | ApiError::PermissionDenied(msg)
            | ApiError::NotFound(msg)
            | ApiError::AlreadyExists(msg)
            | ApiError::FailedPrecondition(msg)
            | ApiError::Internal(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::PermissionDenied(_) => "PERMISSION_DENIED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::AlreadyExists(_) => "ALREADY_EXISTS",
            ApiError::FailedPrecondition(_) => "FAILED_PRECONDITION",
            ApiError::Internal(_) => "INTERNAL",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ApiError::InvalidArgument(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        ApiError::PermissionDenied(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        ApiError::AlreadyExists(message.into())
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        ApiError::FailedPrecondition(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert backend errors to ApiError
impl From<crate::store::StoreError> for ApiError {
    fn from(err: crate::store::StoreError) -> Self {
        match err {
            crate::store::StoreError::ConfigMissing(name) => {
                tracing::error!("Missing store configuration: {}", name);
                ApiError::service_unavailable("Document store not configured")
            }
            crate::store::StoreError::InvalidDatabaseUrl => {
                ApiError::service_unavailable("Document store not configured")
            }
            crate::store::StoreError::Sqlx(sqlx_err) => {
                // Log the real error but return a generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::blob::BlobError> for ApiError {
    fn from(err: crate::blob::BlobError) -> Self {
        match err {
            crate::blob::BlobError::NotFound(key) => {
                ApiError::not_found(format!("No stored file at '{}'", key))
            }
            crate::blob::BlobError::Io(io_err) => {
                tracing::error!("Blob storage I/O error: {}", io_err);
                ApiError::internal("Failed to access file storage")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
