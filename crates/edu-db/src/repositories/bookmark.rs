//! PostgreSQL implementation of BookmarkRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use edu_core::entities::Bookmark;
use edu_core::error::DomainError;
use edu_core::traits::{BookmarkRepository, RepoResult};
use edu_core::value_objects::Snowflake;

use crate::models::BookmarkModel;

use super::error::{map_db_error, map_fk_violation};

#[derive(Clone)]
pub struct PgBookmarkRepository {
    pool: PgPool,
}

impl PgBookmarkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookmarkRepository for PgBookmarkRepository {
    #[instrument(skip(self, bookmark), fields(user_id = %bookmark.user_id, resource_id = %bookmark.resource_id))]
    async fn create(&self, bookmark: &Bookmark) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO bookmarks (user_id, resource_id, created_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(bookmark.user_id.into_inner())
        .bind(bookmark.resource_id.into_inner())
        .bind(bookmark.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                DomainError::BookmarkAlreadyExists
            } else {
                map_fk_violation(e, || DomainError::ResourceNotFound(bookmark.resource_id))
            }
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: Snowflake, resource_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND resource_id = $2")
            .bind(user_id.into_inner())
            .bind(resource_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Bookmark>> {
        let rows = sqlx::query_as::<_, BookmarkModel>(
            r"
            SELECT user_id, resource_id, created_at
            FROM bookmarks
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Bookmark::from).collect())
    }
}
