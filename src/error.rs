//! Error taxonomy shared by stores, services and handlers.
//!
//! Every failure the API can report is one `AppError` variant; the HTTP
//! status and envelope are derived from the variant, never from message text.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use tracing::error;

use crate::models::ApiResponse;

#[derive(Debug, Display)]
pub enum AppError {
    /// Missing or malformed input
    #[display(fmt = "{}", _0)]
    Validation(String),

    /// Missing or invalid identity
    #[display(fmt = "{}", _0)]
    Unauthorized(String),

    #[display(fmt = "invalid credentials")]
    InvalidCredentials,

    #[display(fmt = "account is inactive")]
    AccountInactive,

    #[display(fmt = "not checked in today")]
    NotCheckedIn,

    #[display(fmt = "already checked out today")]
    AlreadyCheckedOut,

    /// Duplicate account and similar uniqueness conflicts
    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),

    #[display(fmt = "{}", _0)]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl AppError {
    fn summary(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Request parameter is invalid",
            AppError::Unauthorized(_) | AppError::InvalidCredentials | AppError::AccountInactive => {
                "Unauthorized"
            }
            AppError::NotCheckedIn | AppError::AlreadyCheckedOut | AppError::Conflict(_) => "Conflict",
            AppError::Database(_) | AppError::Internal(_) => "Internal server error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::InvalidCredentials | AppError::AccountInactive => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotCheckedIn | AppError::AlreadyCheckedOut | AppError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // internals stay in the log
        let err = match self {
            AppError::Database(e) => {
                error!(error = %e, "Database failure");
                "internal server error".to_string()
            }
            AppError::Internal(msg) => {
                error!(error = %msg, "Internal failure");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        ApiResponse::failure(status, self.summary(), err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AppError::Internal(format!("password hashing failed: {e}"))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("token signing failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotCheckedIn.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::AlreadyCheckedOut.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::Conflict("dup".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn database_details_are_not_leaked() {
        let resp = AppError::Database(sqlx::Error::PoolTimedOut).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], 500);
        assert_eq!(json["err"], "internal server error");
        assert!(json["data"].is_null());
    }
}
