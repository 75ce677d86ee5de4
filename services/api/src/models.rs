//! API models for request and response payloads

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod comment;
pub mod forum;

pub use comment::{Comment, CommentItem, CreateCommentRequest, DeleteCommentQuery};
pub use forum::{
    CreateForumRequest, Forum, ForumChanges, ForumDetail, ForumFilter, ForumItem, ForumQuery,
    NewForum, UpdateForumRequest,
};

/// Public projection of the user who wrote a forum or comment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    pub id: Uuid,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Like state of a forum as seen by one viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub liked: bool,
    pub like_count: u64,
}

/// `page`/`limit` query parameters shared by list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Validated page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Rows to skip before this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}
