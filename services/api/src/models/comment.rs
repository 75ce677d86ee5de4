//! Comment models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Author;

/// Comment row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub forum_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Comment with its author
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentItem {
    #[serde(flatten)]
    pub comment: Comment,
    pub user: Author,
}

/// Body of `POST /comments/{forumId}`
#[derive(Debug, Default, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub content: String,
}

/// Query string of `DELETE /comments/{forumId}`
#[derive(Debug, Default, Deserialize)]
pub struct DeleteCommentQuery {
    #[serde(rename = "commentId")]
    pub comment_id: Option<Uuid>,
}
