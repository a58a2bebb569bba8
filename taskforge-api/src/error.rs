/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers should return `Result<T, ApiError>` which automatically
/// converts to appropriate HTTP status codes. Every error body has the
/// same shape: `{"message": "..."}`.
///
/// # Example
///
/// ```
/// use taskforge_api::error::{ApiError, ApiResult, Json};
/// use serde_json::json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     let missing = true;
///     if missing {
///         return Err(ApiError::NotFound("Task not found".to_string()));
///     }
///     Ok(Json(json!({ "message": "ok" })))
/// }
/// ```
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;

use taskforge_shared::auth::jwt::JwtError;
use taskforge_shared::auth::password::PasswordError;
use taskforge_shared::auth::policy::PolicyError;

use crate::ai::CompletionError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Request body failed validation (400)
    Validation(String),

    /// Email already registered (400)
    DuplicateEmail,

    /// Login failed (401)
    InvalidCredentials,

    /// No bearer token on a protected route (401)
    MissingToken,

    /// Token signature valid but expired (401)
    ExpiredToken,

    /// Token malformed or signature invalid (422)
    InvalidToken(String),

    /// Token subject no longer exists (401)
    RevokedToken,

    /// Caller lacks permission (403)
    Forbidden(String),

    /// Resource not found (404)
    NotFound(String),

    /// Internal server error (500)
    Internal(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            ApiError::DuplicateEmail => write!(f, "Email already registered"),
            ApiError::InvalidCredentials => write!(f, "Invalid email or password"),
            ApiError::MissingToken => write!(f, "Missing authorization token"),
            ApiError::ExpiredToken => write!(f, "Token has expired"),
            ApiError::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            ApiError::RevokedToken => write!(f, "Token has been revoked"),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                "Email already registered".to_string(),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            ApiError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "Missing authorization token. Please login.".to_string(),
            ),
            ApiError::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                "Token has expired. Please login again.".to_string(),
            ),
            ApiError::InvalidToken(msg) => {
                tracing::debug!("Rejected token: {}", msg);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Invalid token. Please login again.".to_string(),
                )
            }
            ApiError::RevokedToken => (
                StatusCode::UNAUTHORIZED,
                "Token has been revoked".to_string(),
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse { message });

        (status, body).into_response()
    }
}

impl ApiError {
    /// Collapses validator output into a single 400 message
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
        fields.sort_unstable();
        ApiError::Validation(format!("Invalid value for: {}", fields.join(", ")))
    }
}

/// Request-body extractor that keeps rejections in the error envelope
///
/// axum's built-in `Json` answers undeserializable bodies with a
/// plain-text 422 before the handler runs. This wrapper turns every body
/// rejection (missing field, unknown enum value, syntax error, wrong
/// content type) into a 400 `{"message": ...}` like any other validation
/// failure. It implements `IntoResponse` as well, so handlers use it in
/// both positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
        }
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Check for unique constraint violations
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::DuplicateEmail;
                    }
                }

                // Other database errors are internal
                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::ExpiredToken,
            JwtError::Invalid(msg) => ApiError::InvalidToken(msg),
            JwtError::CreateError(msg) => {
                ApiError::Internal(format!("Token creation failed: {}", msg))
            }
        }
    }
}

/// Convert policy denials to API errors
impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        ApiError::Forbidden(err.to_string())
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

/// Convert completion backend errors to API errors
impl From<CompletionError> for ApiError {
    fn from(err: CompletionError) -> Self {
        ApiError::Internal(format!("Completion request failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Not found: Task not found");

        let err = ApiError::DuplicateEmail;
        assert_eq!(err.to_string(), "Email already registered");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                ApiError::Validation("Invalid value for: email".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::DuplicateEmail, StatusCode::BAD_REQUEST),
            (ApiError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ApiError::MissingToken, StatusCode::UNAUTHORIZED),
            (ApiError::ExpiredToken, StatusCode::UNAUTHORIZED),
            (
                ApiError::InvalidToken("bad signature".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (ApiError::RevokedToken, StatusCode::UNAUTHORIZED),
            (
                ApiError::Forbidden("Unauthorized".to_string()),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::NotFound("User not found".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = ApiError::Internal("connection pool exhausted".to_string()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body.message, "Internal server error");
    }

    #[test]
    fn test_sqlx_row_not_found() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[derive(Deserialize)]
    struct EchoBody {
        content: String,
    }

    fn json_request(body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_extractor_accepts_valid_body() {
        let Json(body) = Json::<EchoBody>::from_request(json_request(r#"{"content":"hi"}"#), &())
            .await
            .expect("valid body should deserialize");

        assert_eq!(body.content, "hi");
    }

    #[tokio::test]
    async fn test_json_extractor_rejects_into_error_envelope() {
        // Missing field, wrong type and broken syntax all land on the
        // same 400 {"message"} shape instead of axum's plain-text 422
        for (body, mentions) in [
            ("{}", "content"),
            (r#"{"content":42}"#, "content"),
            (r#"{"content":"#, "EOF"),
        ] {
            let err = Json::<EchoBody>::from_request(json_request(body), &())
                .await
                .err()
                .expect("malformed body should be rejected");

            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let parsed: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
            assert!(
                parsed.message.contains(mentions),
                "expected {:?} in {:?}",
                mentions,
                parsed.message
            );
        }
    }

    #[test]
    fn test_jwt_expired_maps_to_401() {
        let err: ApiError = JwtError::Expired.into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
