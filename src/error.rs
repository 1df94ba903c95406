use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::Utc;
use serde::Serialize;

use crate::authentication::AuthError;
use crate::repository::RepositoryError;

/// Error taxonomy shared by every endpoint. The variant alone decides the status.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid or expired reset token")]
    ResetTokenInvalid,

    #[error("Reset token has expired")]
    ResetTokenExpired,

    #[error("Something went wrong")]
    UnexpectedError(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
    timestamp: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::ResetTokenInvalid | Self::ResetTokenExpired => {
                StatusCode::BAD_REQUEST
            }
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::UnexpectedError(e) = self {
            tracing::error!(error.cause_chain = ?e, "Request failed");
        }
        let response = ErrorResponse {
            message: self.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        };
        HttpResponse::build(self.status_code()).json(response)
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidInput(message) => Self::Validation(message),
            AuthError::EmailTaken => Self::Conflict("User already exists".to_string()),
            AuthError::AccountTaken => {
                Self::Conflict("Username or email is already taken".to_string())
            }
            AuthError::InvalidCredentials => {
                Self::Unauthorized("Login or password is incorrect".to_string())
            }
            AuthError::IncorrectOldPassword => {
                Self::Unauthorized("Old password does not match".to_string())
            }
            AuthError::UserNotFound => Self::NotFound("User not found".to_string()),
            AuthError::ResetTokenInvalid => Self::ResetTokenInvalid,
            AuthError::ResetTokenExpired => Self::ResetTokenExpired,
            AuthError::UnexpectedError(e) => Self::UnexpectedError(e),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(constraint) => {
                tracing::warn!(%constraint, "Unique constraint rejected write");
                Self::Conflict("Resource already exists".to_string())
            }
            RepositoryError::Database(e) => {
                Self::UnexpectedError(anyhow::Error::new(e).context("Database operation failed"))
            }
        }
    }
}
