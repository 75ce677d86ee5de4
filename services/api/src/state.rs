//! Application state shared across handlers

use common::jwt::JwtService;

use crate::service::ContentService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub content_service: ContentService,
    pub jwt_service: JwtService,
}
