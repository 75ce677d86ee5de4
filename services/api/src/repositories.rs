//! Repositories for forum, comment and like storage

use async_trait::async_trait;
use common::error::DatabaseResult;
use uuid::Uuid;

use crate::models::{
    Comment, CommentItem, Forum, ForumChanges, ForumFilter, ForumItem, NewForum, PageRequest,
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgContentStore;

/// Forum storage
#[async_trait]
pub trait ForumRepository: Send + Sync {
    /// Newest-first forums matching the filter, with the total match count.
    /// `None` returns every match.
    async fn list_forums(
        &self,
        filter: &ForumFilter,
        page: Option<PageRequest>,
    ) -> DatabaseResult<(Vec<ForumItem>, u64)>;

    async fn find_forum(&self, id: Uuid) -> DatabaseResult<Option<Forum>>;

    /// Forum with its author and counts
    async fn find_forum_item(&self, id: Uuid) -> DatabaseResult<Option<ForumItem>>;

    async fn create_forum(&self, author_id: Uuid, forum: &NewForum) -> DatabaseResult<Forum>;

    async fn update_forum(&self, id: Uuid, changes: &ForumChanges)
    -> DatabaseResult<Option<Forum>>;

    /// Remove the forum together with its comments and likes, atomically
    async fn delete_forum(&self, id: Uuid) -> DatabaseResult<bool>;

    async fn health_check(&self) -> DatabaseResult<bool>;
}

/// Comment storage
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Newest-first comments of a forum, with the total count
    async fn list_comments(
        &self,
        forum_id: Uuid,
        page: Option<PageRequest>,
    ) -> DatabaseResult<(Vec<CommentItem>, u64)>;

    async fn find_comment(&self, id: Uuid) -> DatabaseResult<Option<Comment>>;

    async fn create_comment(
        &self,
        forum_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> DatabaseResult<CommentItem>;

    async fn delete_comment(&self, id: Uuid) -> DatabaseResult<bool>;
}

/// Like storage keyed by (forum, user)
#[async_trait]
pub trait LikeRepository: Send + Sync {
    async fn has_liked(&self, forum_id: Uuid, user_id: Uuid) -> DatabaseResult<bool>;

    /// Fails with `DatabaseError::Conflict` when the pair already exists
    async fn add_like(&self, forum_id: Uuid, user_id: Uuid) -> DatabaseResult<()>;

    async fn remove_like(&self, forum_id: Uuid, user_id: Uuid) -> DatabaseResult<bool>;

    async fn count_likes(&self, forum_id: Uuid) -> DatabaseResult<u64>;
}

/// Everything the content service reads and writes
pub trait ContentStore: ForumRepository + CommentRepository + LikeRepository {}

impl<T> ContentStore for T where T: ForumRepository + CommentRepository + LikeRepository {}
