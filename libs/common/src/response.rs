//! JSON response envelope shared by every endpoint
//!
//! Success and failure bodies have the same shape:
//! `{success, data?, error?, pagination?}`.

use serde::Serialize;

/// Pagination block attached to list responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Total number of matching rows
    pub total: u64,
    /// Number of pages, `ceil(total / limit)`
    pub pages: u64,
    /// Requested page (1-based)
    pub page: u32,
    /// Effective page size
    pub limit: u32,
}

impl Pagination {
    pub fn new(total: u64, page: u32, limit: u32) -> Self {
        Self {
            total,
            pages: total.div_ceil(u64::from(limit.max(1))),
            page,
            limit,
        }
    }
}

/// Envelope wrapping every response body
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            pagination: None,
        }
    }

    pub fn page(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            pagination: Some(pagination),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            pagination: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            pagination: None,
        }
    }
}
