//! Forum models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Author, CommentItem};

/// Forum row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Forum {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Forum as shown in lists
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumItem {
    #[serde(flatten)]
    pub forum: Forum,
    pub user: Author,
    pub comment_count: u64,
    pub like_count: u64,
}

/// Forum page: the forum, its comments and the viewer's like state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumDetail {
    #[serde(flatten)]
    pub forum: Forum,
    pub user: Author,
    pub comments: Vec<CommentItem>,
    pub like_count: u64,
    pub user_has_liked: bool,
}

/// Query string of `GET /forums`
#[derive(Debug, Default, Deserialize)]
pub struct ForumQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub tag: Option<String>,
}

/// Optional predicates for listing forums, combined with AND
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForumFilter {
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
    /// Exact tag membership
    pub tag: Option<String>,
    pub author: Option<Uuid>,
}

impl ForumFilter {
    /// Trimmed search and tag; blank values mean no filter
    pub fn new(search: Option<&str>, tag: Option<&str>) -> Self {
        Self {
            search: non_blank(search),
            tag: non_blank(tag),
            author: None,
        }
    }

    pub fn by_author(author: Uuid) -> Self {
        Self {
            author: Some(author),
            ..Self::default()
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Body of `POST /forums`
#[derive(Debug, Default, Deserialize)]
pub struct CreateForumRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub tags: Option<Vec<String>>,
}

/// Body of `PATCH /forums/{id}`
#[derive(Debug, Default, Deserialize)]
pub struct UpdateForumRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Validated forum to insert
#[derive(Debug, Clone)]
pub struct NewForum {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Validated partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct ForumChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl ForumChanges {
    pub fn from_request(request: &UpdateForumRequest) -> Self {
        Self {
            title: non_blank(request.title.as_deref()),
            description: non_blank(request.description.as_deref()),
            tags: request.tags.as_deref().map(normalize_tags),
        }
    }
}

/// Trim tags and drop empty ones, keeping order
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
