//! PostgreSQL implementation of ForumRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use edu_core::entities::{ForumPost, ForumReply};
use edu_core::error::DomainError;
use edu_core::traits::{ForumRepository, PostQuery, RepoResult};
use edu_core::value_objects::Snowflake;

use crate::models::{ForumPostModel, ForumReplyModel};

use super::error::{map_db_error, map_fk_violation};
use super::support::{contains_pattern, page_limit};

const POST_COLUMNS: &str = "id, author_id, title, content, category, tags, views, reply_count, \
     last_activity, created_at, updated_at";

#[derive(Clone)]
pub struct PgForumRepository {
    pool: PgPool,
}

impl PgForumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ForumRepository for PgForumRepository {
    #[instrument(skip(self))]
    async fn find_post(&self, id: Snowflake) -> RepoResult<Option<ForumPost>> {
        let result = sqlx::query_as::<_, ForumPostModel>(&format!(
            "SELECT {POST_COLUMNS} FROM forum_posts WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ForumPost::from))
    }

    #[instrument(skip(self))]
    async fn list_posts(&self, query: &PostQuery) -> RepoResult<Vec<ForumPost>> {
        let rows = sqlx::query_as::<_, ForumPostModel>(&format!(
            r"
            SELECT {POST_COLUMNS} FROM forum_posts
            WHERE ($1::TEXT IS NULL OR category = $1)
              AND ($2::TEXT IS NULL OR $2 = ANY(tags))
              AND ($3::TEXT IS NULL OR title ILIKE $3 OR content ILIKE $3)
              AND ($4::BIGINT IS NULL OR id < $4)
            ORDER BY id DESC
            LIMIT $5
            "
        ))
        .bind(query.category.as_deref())
        .bind(query.tag.as_deref().map(str::to_lowercase))
        .bind(query.search.as_deref().map(contains_pattern))
        .bind(query.before.map(Snowflake::into_inner))
        .bind(page_limit(query.limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(ForumPost::from).collect())
    }

    #[instrument(skip(self, post), fields(post_id = %post.id))]
    async fn create_post(&self, post: &ForumPost) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO forum_posts (id, author_id, title, content, category, tags, views,
                                     reply_count, last_activity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(post.id.into_inner())
        .bind(post.author_id.into_inner())
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.category)
        .bind(&post.tags)
        .bind(post.views)
        .bind(post.reply_count)
        .bind(post.last_activity)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_fk_violation(e, || DomainError::UserNotFound(post.author_id)))?;

        Ok(())
    }

    #[instrument(skip(self, post), fields(post_id = %post.id))]
    async fn update_post(&self, post: &ForumPost) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE forum_posts
            SET title = $2, content = $3, category = $4, tags = $5, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(post.id.into_inner())
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.category)
        .bind(&post.tags)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::PostNotFound(post.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_post(&self, id: Snowflake) -> RepoResult<()> {
        // replies go with the post via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM forum_posts WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::PostNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn increment_views(&self, id: Snowflake) -> RepoResult<()> {
        sqlx::query("UPDATE forum_posts SET views = views + 1 WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_reply(&self, id: Snowflake) -> RepoResult<Option<ForumReply>> {
        let result = sqlx::query_as::<_, ForumReplyModel>(
            r"
            SELECT id, post_id, author_id, content, created_at, updated_at
            FROM forum_replies
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ForumReply::from))
    }

    #[instrument(skip(self))]
    async fn list_replies(&self, post_id: Snowflake) -> RepoResult<Vec<ForumReply>> {
        let rows = sqlx::query_as::<_, ForumReplyModel>(
            r"
            SELECT id, post_id, author_id, content, created_at, updated_at
            FROM forum_replies
            WHERE post_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(post_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(ForumReply::from).collect())
    }

    #[instrument(skip(self, reply), fields(reply_id = %reply.id, post_id = %reply.post_id))]
    async fn create_reply(&self, reply: &ForumReply) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO forum_replies (id, post_id, author_id, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(reply.id.into_inner())
        .bind(reply.post_id.into_inner())
        .bind(reply.author_id.into_inner())
        .bind(&reply.content)
        .bind(reply.created_at)
        .bind(reply.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_fk_violation(e, || DomainError::PostNotFound(reply.post_id)))?;

        sqlx::query(
            r"
            UPDATE forum_posts
            SET reply_count = reply_count + 1, last_activity = $2
            WHERE id = $1
            ",
        )
        .bind(reply.post_id.into_inner())
        .bind(reply.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, reply), fields(reply_id = %reply.id, post_id = %reply.post_id))]
    async fn delete_reply(&self, reply: &ForumReply) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let result = sqlx::query("DELETE FROM forum_replies WHERE id = $1")
            .bind(reply.id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ReplyNotFound(reply.id));
        }

        sqlx::query(
            r"
            UPDATE forum_posts
            SET reply_count = GREATEST(reply_count - 1, 0)
            WHERE id = $1
            ",
        )
        .bind(reply.post_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }
}
