//! Custom error types for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{error::DatabaseError, token::TokenError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::email::EmailError;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Bad credentials or an unusable token
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Password and repeated password differ
    #[error("Please enter the password again!")]
    PasswordMismatch,

    #[error("OTP has expired!")]
    OtpExpired,

    /// No recently verified code for a password change
    #[error("OTP not verified")]
    OtpNotVerified,

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AuthError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AuthError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AuthError::PasswordMismatch => (
                StatusCode::EXPECTATION_FAILED,
                "Please enter the password again!".to_string(),
            ),
            AuthError::OtpExpired => (
                StatusCode::EXPECTATION_FAILED,
                "OTP has expired!".to_string(),
            ),
            AuthError::OtpNotVerified => (
                StatusCode::FORBIDDEN,
                "Verify the OTP sent to your email before changing the password".to_string(),
            ),
            AuthError::Database(DatabaseError::Duplicate(_)) => (
                StatusCode::CONFLICT,
                "Email is already registered".to_string(),
            ),
            AuthError::Email(e) => {
                error!("Failed to send email: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send email".to_string(),
                )
            }
            e @ (AuthError::Hashing(_) | AuthError::Database(_) | AuthError::Token(_)) => {
                error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let cases = [
            (AuthError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AuthError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AuthError::PasswordMismatch, StatusCode::EXPECTATION_FAILED),
            (AuthError::OtpExpired, StatusCode::EXPECTATION_FAILED),
            (AuthError::OtpNotVerified, StatusCode::FORBIDDEN),
            (
                DatabaseError::Duplicate("users_email_key".into()).into(),
                StatusCode::CONFLICT,
            ),
            (
                AuthError::Hashing("bad".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn expectation_failed_messages() {
        assert_eq!(
            AuthError::PasswordMismatch.to_string(),
            "Please enter the password again!"
        );
        assert_eq!(AuthError::OtpExpired.to_string(), "OTP has expired!");
    }
}
