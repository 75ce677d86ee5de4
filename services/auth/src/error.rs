//! Error types for the authentication service

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{error::DatabaseError, response::ApiResponse};
use thiserror::Error;
use tracing::error;

use crate::models::Provider;

/// Custom error type for authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown email, no stored password, or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The email is already linked to another account of the same provider
    #[error("This email is already linked to a different {0} account")]
    AccountConflict(Provider),

    /// Linking a provider account to an existing user failed in the store
    #[error("Failed to link account: {0}")]
    LinkingFailed(#[source] DatabaseError),

    /// Any other store fault
    #[error("Authentication backend error: {0}")]
    AuthBackendError(#[from] DatabaseError),

    /// Invalid input
    #[error("{0}")]
    Validation(String),

    /// Signup with an email that is already registered
    #[error("A user with this email already exists")]
    EmailTaken,

    /// Missing, invalid, or expired session token
    #[error("Unauthorized")]
    Unauthorized,

    /// GitHub sign-in requested but no client is configured
    #[error("GitHub sign-in is not configured")]
    OAuthNotConfigured,

    /// The OAuth provider rejected the exchange or profile lookup
    #[error("OAuth provider error: {0}")]
    OAuth(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AuthError {
    fn from(rejection: QueryRejection) -> Self {
        AuthError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::AccountConflict(_) => (StatusCode::CONFLICT, self.to_string()),
            AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AuthError::EmailTaken => (StatusCode::CONFLICT, self.to_string()),
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::OAuthNotConfigured => (StatusCode::NOT_FOUND, self.to_string()),
            AuthError::OAuth(msg) => {
                error!("OAuth error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Sign-in with the provider failed".to_string(),
                )
            }
            AuthError::LinkingFailed(e) => {
                error!("Failed to link account: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to link account".to_string(),
                )
            }
            AuthError::AuthBackendError(e) => {
                error!("Authentication backend error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AuthError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::failure(error_message))).into_response()
    }
}
