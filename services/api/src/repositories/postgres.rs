//! PostgreSQL-backed content store

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::{CommentRepository, ForumRepository, LikeRepository};
use crate::models::{
    Author, Comment, CommentItem, Forum, ForumChanges, ForumFilter, ForumItem, NewForum,
    PageRequest,
};

const FORUM_ITEM_SELECT: &str = r#"
    SELECT f.id, f.title, f.description, f.tags, f.author_id, f.created_at, f.updated_at,
           u.name AS author_name, u.image AS author_image,
           (SELECT COUNT(*) FROM comments c WHERE c.forum_id = f.id) AS comment_count,
           (SELECT COUNT(*) FROM likes l WHERE l.forum_id = f.id) AS like_count
    FROM forums f
    JOIN users u ON u.id = f.author_id
"#;

const COMMENT_ITEM_SELECT: &str = r#"
    SELECT c.id, c.content, c.forum_id, c.author_id, c.created_at,
           u.name AS author_name, u.image AS author_image
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;

/// Forums, comments and likes in PostgreSQL
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape `LIKE` wildcards so the term matches literally
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn push_forum_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ForumFilter) {
    builder.push(" WHERE TRUE");

    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (f.title ILIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR f.description ILIKE ")
            .push_bind(pattern)
            .push(r" ESCAPE '\')");
    }

    if let Some(tag) = &filter.tag {
        builder.push(" AND ").push_bind(tag.clone()).push(" = ANY(f.tags)");
    }

    if let Some(author) = filter.author {
        builder.push(" AND f.author_id = ").push_bind(author);
    }
}

fn push_page(builder: &mut QueryBuilder<'_, Postgres>, page: Option<PageRequest>) {
    if let Some(page) = page {
        builder
            .push(" LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
    }
}

fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn forum_from_row(row: &PgRow) -> Forum {
    Forum {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        tags: row.get("tags"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn forum_item_from_row(row: &PgRow) -> ForumItem {
    let forum = forum_from_row(row);
    ForumItem {
        user: Author {
            id: forum.author_id,
            name: row.get("author_name"),
            image: row.get("author_image"),
        },
        comment_count: count(row.get("comment_count")),
        like_count: count(row.get("like_count")),
        forum,
    }
}

fn comment_item_from_row(row: &PgRow) -> CommentItem {
    let comment = Comment {
        id: row.get("id"),
        content: row.get("content"),
        forum_id: row.get("forum_id"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
    };
    CommentItem {
        user: Author {
            id: comment.author_id,
            name: row.get("author_name"),
            image: row.get("author_image"),
        },
        comment,
    }
}

#[async_trait]
impl ForumRepository for PgContentStore {
    async fn list_forums(
        &self,
        filter: &ForumFilter,
        page: Option<PageRequest>,
    ) -> DatabaseResult<(Vec<ForumItem>, u64)> {
        info!("Listing forums with {:?} ({:?})", filter, page);

        let mut builder = QueryBuilder::<Postgres>::new(FORUM_ITEM_SELECT);
        push_forum_filters(&mut builder, filter);
        builder.push(" ORDER BY f.created_at DESC, f.id DESC");
        push_page(&mut builder, page);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        let mut count_builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM forums f");
        push_forum_filters(&mut count_builder, filter);

        let total = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok((rows.iter().map(forum_item_from_row).collect(), count(total)))
    }

    async fn find_forum(&self, id: Uuid) -> DatabaseResult<Option<Forum>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, tags, author_id, created_at, updated_at
            FROM forums
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(row.as_ref().map(forum_from_row))
    }

    async fn find_forum_item(&self, id: Uuid) -> DatabaseResult<Option<ForumItem>> {
        info!("Finding forum by ID: {}", id);

        let mut builder = QueryBuilder::<Postgres>::new(FORUM_ITEM_SELECT);
        builder.push(" WHERE f.id = ").push_bind(id);

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(row.as_ref().map(forum_item_from_row))
    }

    async fn create_forum(&self, author_id: Uuid, forum: &NewForum) -> DatabaseResult<Forum> {
        info!("Creating forum for user {}", author_id);

        let row = sqlx::query(
            r#"
            INSERT INTO forums (title, description, tags, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, tags, author_id, created_at, updated_at
            "#,
        )
        .bind(&forum.title)
        .bind(&forum.description)
        .bind(&forum.tags)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(forum_from_row(&row))
    }

    async fn update_forum(
        &self,
        id: Uuid,
        changes: &ForumChanges,
    ) -> DatabaseResult<Option<Forum>> {
        info!("Updating forum {}", id);

        let row = sqlx::query(
            r#"
            UPDATE forums
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                tags = COALESCE($4, tags),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, tags, author_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(&changes.tags)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(row.as_ref().map(forum_from_row))
    }

    async fn delete_forum(&self, id: Uuid) -> DatabaseResult<bool> {
        info!("Deleting forum {} with its comments and likes", id);

        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        sqlx::query("DELETE FROM likes WHERE forum_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_query)?;

        sqlx::query("DELETE FROM comments WHERE forum_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_query)?;

        let result = sqlx::query("DELETE FROM forums WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_query)?;

        tx.commit().await.map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        common::database::health_check(&self.pool).await
    }
}

#[async_trait]
impl CommentRepository for PgContentStore {
    async fn list_comments(
        &self,
        forum_id: Uuid,
        page: Option<PageRequest>,
    ) -> DatabaseResult<(Vec<CommentItem>, u64)> {
        let mut builder = QueryBuilder::<Postgres>::new(COMMENT_ITEM_SELECT);
        builder
            .push(" WHERE c.forum_id = ")
            .push_bind(forum_id)
            .push(" ORDER BY c.created_at DESC, c.id DESC");
        push_page(&mut builder, page);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE forum_id = $1")
                .bind(forum_id)
                .fetch_one(&self.pool)
                .await
                .map_err(DatabaseError::from_query)?;

        Ok((rows.iter().map(comment_item_from_row).collect(), count(total)))
    }

    async fn find_comment(&self, id: Uuid) -> DatabaseResult<Option<Comment>> {
        let row = sqlx::query(
            r#"
            SELECT id, content, forum_id, author_id, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(row.map(|row| Comment {
            id: row.get("id"),
            content: row.get("content"),
            forum_id: row.get("forum_id"),
            author_id: row.get("author_id"),
            created_at: row.get("created_at"),
        }))
    }

    async fn create_comment(
        &self,
        forum_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> DatabaseResult<CommentItem> {
        info!("Creating comment on forum {} for user {}", forum_id, author_id);

        let row = sqlx::query(
            r#"
            WITH inserted AS (
                INSERT INTO comments (content, forum_id, author_id)
                VALUES ($1, $2, $3)
                RETURNING id, content, forum_id, author_id, created_at
            )
            SELECT c.id, c.content, c.forum_id, c.author_id, c.created_at,
                   u.name AS author_name, u.image AS author_image
            FROM inserted c
            JOIN users u ON u.id = c.author_id
            "#,
        )
        .bind(content)
        .bind(forum_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(comment_item_from_row(&row))
    }

    async fn delete_comment(&self, id: Uuid) -> DatabaseResult<bool> {
        info!("Deleting comment {}", id);

        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LikeRepository for PgContentStore {
    async fn has_liked(&self, forum_id: Uuid, user_id: Uuid) -> DatabaseResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM likes WHERE forum_id = $1 AND user_id = $2)",
        )
        .bind(forum_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn add_like(&self, forum_id: Uuid, user_id: Uuid) -> DatabaseResult<()> {
        info!("User {} likes forum {}", user_id, forum_id);

        sqlx::query("INSERT INTO likes (forum_id, user_id) VALUES ($1, $2)")
            .bind(forum_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn remove_like(&self, forum_id: Uuid, user_id: Uuid) -> DatabaseResult<bool> {
        info!("User {} unlikes forum {}", user_id, forum_id);

        let result = sqlx::query("DELETE FROM likes WHERE forum_id = $1 AND user_id = $2")
            .bind(forum_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_likes(&self, forum_id: Uuid) -> DatabaseResult<u64> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE forum_id = $1")
                .bind(forum_id)
                .fetch_one(&self.pool)
                .await
                .map_err(DatabaseError::from_query)?;

        Ok(count(total))
    }
}
