// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::store::StoreError;

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// Every failure raised anywhere in the system converts into one of these
/// variants, so the JSON envelope `{success, error, message}` is total over
/// the failure space and nothing escapes untranslated.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 422 Unprocessable Entity (store rejected the write)
    Unprocessable(String),

    // 401 / 403 / 503, each sub-kind carrying its own description
    Auth(AuthError),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Auth(err) => err.status_code(),
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-safe error message.
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unprocessable(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg.clone(),
            ApiError::Auth(err) => err.description(),
        }
    }

    /// Convert to the uniform JSON envelope. The `error` field carries the
    /// numeric status code, as clients of this API expect.
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.status_code().as_u16(),
            "message": self.message(),
        })
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        ApiError::Unprocessable(message.into())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("drink not found".to_string()),
            StoreError::Connection(e) => {
                tracing::error!("database connection error: {}", e);
                ApiError::ServiceUnavailable("database temporarily unavailable".to_string())
            }
            StoreError::Database(e) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("database error: {}", e);
                ApiError::InternalServerError(
                    "an error occurred while processing your request".to_string(),
                )
            }
            StoreError::Serialization(e) => {
                tracing::error!("recipe serialization error: {}", e);
                ApiError::InternalServerError("failed to format stored recipe".to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_numeric_code_and_message() {
        let err = ApiError::not_found("drink not found");
        let body = err.to_json();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!(404));
        assert_eq!(body["message"], json!("drink not found"));
    }

    #[test]
    fn auth_errors_keep_their_own_status() {
        let err: ApiError = AuthError::InsufficientScope("post:drinks".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.to_json()["error"], json!(403));
    }
}
