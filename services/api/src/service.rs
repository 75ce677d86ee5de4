//! Content service: forums, comments and likes
//!
//! Every mutating call takes the acting user's id explicitly. Checks run
//! in the order existence, ownership, input validation; creates validate
//! first.

use common::{policy::can_mutate, response::Pagination};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        CommentItem, CreateForumRequest, Forum, ForumChanges, ForumDetail, ForumFilter, ForumItem,
        ForumQuery, LikeStatus, NewForum, PageRequest, UpdateForumRequest, forum::normalize_tags,
    },
    repositories::ContentStore,
};

#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn ContentStore>,
    max_page_size: u32,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>, max_page_size: u32) -> Self {
        Self {
            store,
            max_page_size,
        }
    }

    /// Default to page 1 of 10; zero is rejected and the size is capped
    pub fn page_request(&self, page: Option<u32>, limit: Option<u32>) -> ApiResult<PageRequest> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(10);

        if page == 0 {
            return Err(ApiError::BadRequest("page must be at least 1".to_string()));
        }
        if limit == 0 {
            return Err(ApiError::BadRequest("limit must be at least 1".to_string()));
        }

        Ok(PageRequest {
            page,
            limit: limit.min(self.max_page_size),
        })
    }

    pub async fn list_forums(&self, query: &ForumQuery) -> ApiResult<(Vec<ForumItem>, Pagination)> {
        let page = self.page_request(query.page, query.limit)?;
        let filter = ForumFilter::new(query.search.as_deref(), query.tag.as_deref());

        let (forums, total) = self.store.list_forums(&filter, Some(page)).await?;

        Ok((forums, Pagination::new(total, page.page, page.limit)))
    }

    /// Forum with all comments, like count and the viewer's like
    pub async fn get_forum(&self, id: Uuid, viewer: Option<Uuid>) -> ApiResult<ForumDetail> {
        let item = self
            .store
            .find_forum_item(id)
            .await?
            .ok_or_else(forum_not_found)?;

        let (comments, _) = self.store.list_comments(id, None).await?;
        let user_has_liked = match viewer {
            Some(user) => self.store.has_liked(id, user).await?,
            None => false,
        };

        Ok(ForumDetail {
            forum: item.forum,
            user: item.user,
            comments,
            like_count: item.like_count,
            user_has_liked,
        })
    }

    pub async fn create_forum(&self, author: Uuid, request: &CreateForumRequest) -> ApiResult<Forum> {
        let title = request.title.trim();
        let description = request.description.trim();

        if title.is_empty() {
            return Err(ApiError::BadRequest("Title is required".to_string()));
        }
        if description.is_empty() {
            return Err(ApiError::BadRequest("Description is required".to_string()));
        }

        let forum = NewForum {
            title: title.to_string(),
            description: description.to_string(),
            tags: request.tags.as_deref().map(normalize_tags).unwrap_or_default(),
        };

        let forum = self.store.create_forum(author, &forum).await?;
        info!("User {} created forum {}", author, forum.id);
        Ok(forum)
    }

    pub async fn update_forum(
        &self,
        actor: Uuid,
        id: Uuid,
        request: &UpdateForumRequest,
    ) -> ApiResult<Forum> {
        self.require_owned_forum(actor, id, "You can only edit your own forums")
            .await?;

        let changes = ForumChanges::from_request(request);

        self.store
            .update_forum(id, &changes)
            .await?
            .ok_or_else(forum_not_found)
    }

    pub async fn delete_forum(&self, actor: Uuid, id: Uuid) -> ApiResult<()> {
        self.require_owned_forum(actor, id, "You can only delete your own forums")
            .await?;

        if !self.store.delete_forum(id).await? {
            return Err(forum_not_found());
        }

        info!("User {} deleted forum {}", actor, id);
        Ok(())
    }

    /// The caller's own forums, newest first
    pub async fn profile_forums(&self, user: Uuid) -> ApiResult<Vec<ForumItem>> {
        let (forums, _) = self
            .store
            .list_forums(&ForumFilter::by_author(user), None)
            .await?;
        Ok(forums)
    }

    pub async fn list_comments(
        &self,
        forum_id: Uuid,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> ApiResult<(Vec<CommentItem>, Pagination)> {
        let page = self.page_request(page, limit)?;
        let (comments, total) = self.store.list_comments(forum_id, Some(page)).await?;

        Ok((comments, Pagination::new(total, page.page, page.limit)))
    }

    /// A missing forum wins over invalid content
    pub async fn create_comment(
        &self,
        author: Uuid,
        forum_id: Uuid,
        content: &str,
    ) -> ApiResult<CommentItem> {
        self.require_forum(forum_id).await?;

        let content = content.trim();
        if content.is_empty() {
            return Err(ApiError::BadRequest("Content is required".to_string()));
        }

        let comment = self.store.create_comment(forum_id, author, content).await?;
        info!("User {} commented on forum {}", author, forum_id);
        Ok(comment)
    }

    pub async fn delete_comment(
        &self,
        actor: Uuid,
        forum_id: Uuid,
        comment_id: Option<Uuid>,
    ) -> ApiResult<()> {
        let comment_id =
            comment_id.ok_or_else(|| ApiError::BadRequest("Comment ID is required".to_string()))?;

        let comment = self
            .store
            .find_comment(comment_id)
            .await?
            .filter(|comment| comment.forum_id == forum_id)
            .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

        if !can_mutate(actor, comment.author_id) {
            warn!("User {} tried to delete comment {}", actor, comment_id);
            return Err(ApiError::Forbidden(
                "Not authorized to delete this comment".to_string(),
            ));
        }

        if !self.store.delete_comment(comment_id).await? {
            return Err(ApiError::NotFound("Comment not found".to_string()));
        }

        info!("User {} deleted comment {}", actor, comment_id);
        Ok(())
    }

    /// Add the like if absent, remove it otherwise
    pub async fn toggle_like(&self, user: Uuid, forum_id: Uuid) -> ApiResult<LikeStatus> {
        self.require_forum(forum_id).await?;

        let liked = if self.store.has_liked(forum_id, user).await? {
            self.store.remove_like(forum_id, user).await?;
            false
        } else {
            match self.store.add_like(forum_id, user).await {
                Ok(()) => true,
                Err(e) if e.is_conflict() => {
                    info!("Concurrent like of forum {} by user {}", forum_id, user);
                    true
                }
                Err(e) => return Err(e.into()),
            }
        };

        let like_count = self.store.count_likes(forum_id).await?;
        Ok(LikeStatus { liked, like_count })
    }

    /// Like count and whether `viewer` liked; unknown forums read as zero
    pub async fn like_status(&self, forum_id: Uuid, viewer: Option<Uuid>) -> ApiResult<LikeStatus> {
        let like_count = self.store.count_likes(forum_id).await?;
        let liked = match viewer {
            Some(user) => self.store.has_liked(forum_id, user).await?,
            None => false,
        };

        Ok(LikeStatus { liked, like_count })
    }

    pub async fn health_check(&self) -> ApiResult<bool> {
        Ok(self.store.health_check().await?)
    }

    async fn require_forum(&self, id: Uuid) -> ApiResult<Forum> {
        self.store.find_forum(id).await?.ok_or_else(forum_not_found)
    }

    async fn require_owned_forum(&self, actor: Uuid, id: Uuid, denied: &str) -> ApiResult<Forum> {
        let forum = self.require_forum(id).await?;

        if !can_mutate(actor, forum.author_id) {
            warn!("User {} tried to modify forum {}", actor, id);
            return Err(ApiError::Forbidden(denied.to_string()));
        }

        Ok(forum)
    }
}

fn forum_not_found() -> ApiError {
    ApiError::NotFound("Forum not found".to_string())
}
