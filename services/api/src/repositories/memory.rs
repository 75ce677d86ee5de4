//! In-memory content store used by the tests

use async_trait::async_trait;
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{CommentRepository, ForumRepository, LikeRepository};
use crate::models::{
    Author, Comment, CommentItem, Forum, ForumChanges, ForumFilter, ForumItem, NewForum,
    PageRequest,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, Author>,
    // Insertion order; newest last
    forums: Vec<Forum>,
    comments: Vec<Comment>,
    likes: Vec<(Uuid, Uuid)>,
}

impl Tables {
    fn author(&self, id: Uuid) -> Author {
        self.users.get(&id).cloned().unwrap_or(Author {
            id,
            name: None,
            image: None,
        })
    }

    fn forum_item(&self, forum: &Forum) -> ForumItem {
        ForumItem {
            user: self.author(forum.author_id),
            comment_count: self.comments.iter().filter(|c| c.forum_id == forum.id).count() as u64,
            like_count: self.likes.iter().filter(|(f, _)| *f == forum.id).count() as u64,
            forum: forum.clone(),
        }
    }

    fn comment_item(&self, comment: &Comment) -> CommentItem {
        CommentItem {
            user: self.author(comment.author_id),
            comment: comment.clone(),
        }
    }
}

/// Content store holding everything in process memory
#[derive(Clone, Default)]
pub struct MemoryContentStore {
    tables: Arc<Mutex<Tables>>,
    failing: Arc<AtomicBool>,
    stale_like_reads: Arc<AtomicBool>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user so lists can show their name
    pub async fn add_user(&self, id: Uuid, name: &str) {
        self.tables.lock().await.users.insert(
            id,
            Author {
                id,
                name: Some(name.to_string()),
                image: None,
            },
        );
    }

    /// Make every subsequent call fail as if the database were down
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Make `has_liked` report false, as if another request inserted the
    /// like between the read and the write
    pub fn stale_like_reads(&self) {
        self.stale_like_reads.store(true, Ordering::SeqCst);
    }

    pub async fn comment_count(&self) -> usize {
        self.tables.lock().await.comments.len()
    }

    pub async fn like_count(&self) -> usize {
        self.tables.lock().await.likes.len()
    }

    fn check(&self) -> DatabaseResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DatabaseError::Configuration(
                "store unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

fn matches(filter: &ForumFilter, forum: &Forum) -> bool {
    let search = filter.search.as_ref().is_none_or(|term| {
        let term = term.to_lowercase();
        forum.title.to_lowercase().contains(&term)
            || forum.description.to_lowercase().contains(&term)
    });
    let tag = filter
        .tag
        .as_ref()
        .is_none_or(|tag| forum.tags.iter().any(|t| t == tag));
    let author = filter.author.is_none_or(|author| forum.author_id == author);

    search && tag && author
}

fn paginate<T>(items: Vec<T>, page: Option<PageRequest>) -> Vec<T> {
    match page {
        Some(page) => items
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect(),
        None => items,
    }
}

#[async_trait]
impl ForumRepository for MemoryContentStore {
    async fn list_forums(
        &self,
        filter: &ForumFilter,
        page: Option<PageRequest>,
    ) -> DatabaseResult<(Vec<ForumItem>, u64)> {
        self.check()?;
        let tables = self.tables.lock().await;

        let matching: Vec<ForumItem> = tables
            .forums
            .iter()
            .rev()
            .filter(|f| matches(filter, f))
            .map(|f| tables.forum_item(f))
            .collect();
        let total = matching.len() as u64;

        Ok((paginate(matching, page), total))
    }

    async fn find_forum(&self, id: Uuid) -> DatabaseResult<Option<Forum>> {
        self.check()?;
        let tables = self.tables.lock().await;
        Ok(tables.forums.iter().find(|f| f.id == id).cloned())
    }

    async fn find_forum_item(&self, id: Uuid) -> DatabaseResult<Option<ForumItem>> {
        self.check()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .forums
            .iter()
            .find(|f| f.id == id)
            .map(|f| tables.forum_item(f)))
    }

    async fn create_forum(&self, author_id: Uuid, forum: &NewForum) -> DatabaseResult<Forum> {
        self.check()?;
        let now = Utc::now();
        let forum = Forum {
            id: Uuid::new_v4(),
            title: forum.title.clone(),
            description: forum.description.clone(),
            tags: forum.tags.clone(),
            author_id,
            created_at: now,
            updated_at: now,
        };

        self.tables.lock().await.forums.push(forum.clone());
        Ok(forum)
    }

    async fn update_forum(
        &self,
        id: Uuid,
        changes: &ForumChanges,
    ) -> DatabaseResult<Option<Forum>> {
        self.check()?;
        let mut tables = self.tables.lock().await;
        let Some(forum) = tables.forums.iter_mut().find(|f| f.id == id) else {
            return Ok(None);
        };

        if let Some(title) = &changes.title {
            forum.title = title.clone();
        }
        if let Some(description) = &changes.description {
            forum.description = description.clone();
        }
        if let Some(tags) = &changes.tags {
            forum.tags = tags.clone();
        }
        forum.updated_at = Utc::now();

        Ok(Some(forum.clone()))
    }

    async fn delete_forum(&self, id: Uuid) -> DatabaseResult<bool> {
        self.check()?;
        let mut tables = self.tables.lock().await;

        let before = tables.forums.len();
        tables.forums.retain(|f| f.id != id);
        if tables.forums.len() == before {
            return Ok(false);
        }
        tables.comments.retain(|c| c.forum_id != id);
        tables.likes.retain(|(forum_id, _)| *forum_id != id);

        Ok(true)
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        Ok(!self.failing.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl CommentRepository for MemoryContentStore {
    async fn list_comments(
        &self,
        forum_id: Uuid,
        page: Option<PageRequest>,
    ) -> DatabaseResult<(Vec<CommentItem>, u64)> {
        self.check()?;
        let tables = self.tables.lock().await;

        let comments: Vec<CommentItem> = tables
            .comments
            .iter()
            .rev()
            .filter(|c| c.forum_id == forum_id)
            .map(|c| tables.comment_item(c))
            .collect();
        let total = comments.len() as u64;

        Ok((paginate(comments, page), total))
    }

    async fn find_comment(&self, id: Uuid) -> DatabaseResult<Option<Comment>> {
        self.check()?;
        let tables = self.tables.lock().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn create_comment(
        &self,
        forum_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> DatabaseResult<CommentItem> {
        self.check()?;
        let mut tables = self.tables.lock().await;
        if !tables.forums.iter().any(|f| f.id == forum_id) {
            return Err(DatabaseError::MissingReference(
                "comments_forum_id_fkey".to_string(),
            ));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            content: content.to_string(),
            forum_id,
            author_id,
            created_at: Utc::now(),
        };
        tables.comments.push(comment.clone());

        Ok(tables.comment_item(&comment))
    }

    async fn delete_comment(&self, id: Uuid) -> DatabaseResult<bool> {
        self.check()?;
        let mut tables = self.tables.lock().await;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        Ok(tables.comments.len() < before)
    }
}

#[async_trait]
impl LikeRepository for MemoryContentStore {
    async fn has_liked(&self, forum_id: Uuid, user_id: Uuid) -> DatabaseResult<bool> {
        self.check()?;
        if self.stale_like_reads.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let tables = self.tables.lock().await;
        Ok(tables.likes.contains(&(forum_id, user_id)))
    }

    async fn add_like(&self, forum_id: Uuid, user_id: Uuid) -> DatabaseResult<()> {
        self.check()?;
        let mut tables = self.tables.lock().await;
        if !tables.forums.iter().any(|f| f.id == forum_id) {
            return Err(DatabaseError::MissingReference(
                "likes_forum_id_fkey".to_string(),
            ));
        }
        if tables.likes.contains(&(forum_id, user_id)) {
            return Err(DatabaseError::Conflict("likes_pkey".to_string()));
        }

        tables.likes.push((forum_id, user_id));
        Ok(())
    }

    async fn remove_like(&self, forum_id: Uuid, user_id: Uuid) -> DatabaseResult<bool> {
        self.check()?;
        let mut tables = self.tables.lock().await;
        let before = tables.likes.len();
        tables.likes.retain(|like| *like != (forum_id, user_id));
        Ok(tables.likes.len() < before)
    }

    async fn count_likes(&self, forum_id: Uuid) -> DatabaseResult<u64> {
        self.check()?;
        let tables = self.tables.lock().await;
        Ok(tables.likes.iter().filter(|(f, _)| *f == forum_id).count() as u64)
    }
}
