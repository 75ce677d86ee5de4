//! Middleware for session token validation

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use tracing::warn;

use crate::{AppState, error::AuthError};

/// Extract and validate the access token from the Authorization header,
/// inserting its claims into the request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    // Extract the Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(AuthError::Unauthorized)?;

    // Check if it's a Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::Unauthorized)?;

    // Validate the token
    let claims = state.jwt_service.validate_access_token(token).map_err(|e| {
        warn!("Failed to validate token: {}", e);
        AuthError::Unauthorized
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
