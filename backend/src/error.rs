//! Application error handling
//!
//! Converts credential, token and repository errors into HTTP responses.
//! Every token decode failure becomes a 401; the specific reason is only
//! visible in logs and the rejection counter.

use crate::metrics;
use crate::repositories::RepositoryError;
use auth_service_shared::validation::{codes, ValidationError};
use auth_service_shared::{CredentialError, ErrorDetail, ErrorResponse, TokenError};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {}", .0.message)]
    Validation(ValidationError),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Token error: {0}")]
    Token(TokenError),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Email already registered")]
    DuplicateEmail,

    /// Request body could not be read as the expected JSON
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        if err.is_rejection() {
            metrics::record_token_rejection(&err);
        }
        ApiError::Token(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let text = rejection.body_text();
        match missing_field(&text) {
            Some(field) => ApiError::Validation(ValidationError::new(
                field,
                codes::MISSING_FIELD,
                format!("{} is required", field),
            )),
            None => ApiError::BadRequest(text),
        }
    }
}

/// Field name from serde's "missing field `name`" message
fn missing_field(text: &str) -> Option<&str> {
    let rest = text.split_once("missing field `")?.1;
    rest.split_once('`').map(|(field, _)| field)
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateEmail => ApiError::DuplicateEmail,
            RepositoryError::NotFound => ApiError::NotFound("User not found".to_string()),
            RepositoryError::Storage(e) => ApiError::Internal(e),
        }
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<String>) {
        match self {
            ApiError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                err.code,
                err.message.clone(),
                Some(err.field.clone()),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                self.to_string(),
                Some("credentials".to_string()),
            ),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
            }
            ApiError::Token(err) if err.is_rejection() => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid or expired token".to_string(),
                Some("token".to_string()),
            ),
            ApiError::Token(err) => {
                error!("Token issuance failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "NOT_ALLOWED", msg.clone(), None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            ApiError::DuplicateEmail => (
                StatusCode::CONFLICT,
                "DUPLICATE_EMAIL",
                self.to_string(),
                Some("email".to_string()),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None),
            ApiError::Credential(CredentialError::InvalidInput(msg)) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                Some("password".to_string()),
            ),
            ApiError::Credential(err) => {
                error!(code = err.code(), "Credential error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = self.parts();

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use auth_service_shared::TokenKind;
    use rstest::rstest;

    #[rstest]
    #[case(TokenError::Signature)]
    #[case(TokenError::Malformed("bad".to_string()))]
    #[case(TokenError::Expired)]
    #[case(TokenError::WrongKind { expected: TokenKind::Access, found: TokenKind::Refresh })]
    fn test_token_rejections_are_unauthorized(#[case] err: TokenError) {
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_token_issuance_failure_is_internal() {
        let response = ApiError::from(TokenError::EmptySubject).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_error_status() {
        let error = ApiError::from(ValidationError::new(
            "email",
            codes::INVALID_EMAIL,
            "Invalid email format",
        ));
        let (status, code, _, field) = error.parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "INVALID_EMAIL");
        assert_eq!(field.as_deref(), Some("email"));
    }

    #[test]
    fn test_malformed_digest_is_internal() {
        let error = ApiError::from(CredentialError::MalformedDigest("short".to_string()));
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_duplicate_email_is_conflict() {
        let error = ApiError::from(RepositoryError::DuplicateEmail);
        let (status, code, _, _) = error.parts();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "DUPLICATE_EMAIL");
    }

    #[test]
    fn test_forbidden_error_status() {
        let error = ApiError::Forbidden("User not allowed due status blocked".to_string());
        assert_eq!(error.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[case("Failed to deserialize the JSON body into the target type: missing field `email` at line 1 column 2", Some("email"))]
    #[case("Failed to parse the request body as JSON: expected value at line 1 column 1", None)]
    fn test_missing_field_extraction(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(missing_field(text), expected);
    }
}
