//! PostgreSQL implementation of CmsRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use edu_core::entities::CmsContent;
use edu_core::error::DomainError;
use edu_core::traits::{CmsQuery, CmsRepository, RepoResult};
use edu_core::value_objects::Snowflake;

use crate::models::CmsContentModel;

use super::error::map_db_error;
use super::support::page_limit;

const CMS_COLUMNS: &str = "id, title, description, content, content_type, category, tags, \
     featured, published, author_id, created_at, updated_at";

#[derive(Clone)]
pub struct PgCmsRepository {
    pool: PgPool,
}

impl PgCmsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CmsRepository for PgCmsRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<CmsContent>> {
        let result = sqlx::query_as::<_, CmsContentModel>(&format!(
            "SELECT {CMS_COLUMNS} FROM cms_content WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(CmsContent::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self, query: &CmsQuery) -> RepoResult<Vec<CmsContent>> {
        let rows = sqlx::query_as::<_, CmsContentModel>(&format!(
            r"
            SELECT {CMS_COLUMNS} FROM cms_content
            WHERE ($1 OR published)
              AND ($2::TEXT IS NULL OR content_type = $2)
              AND ($3::BOOLEAN IS NULL OR featured = $3)
            ORDER BY featured DESC, id DESC
            LIMIT $4
            "
        ))
        .bind(query.include_unpublished)
        .bind(query.content_type.map(|t| t.as_str()))
        .bind(query.featured)
        .bind(page_limit(query.limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(CmsContent::try_from).collect()
    }

    #[instrument(skip(self, content), fields(content_id = %content.id))]
    async fn create(&self, content: &CmsContent) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO cms_content (id, title, description, content, content_type, category, tags,
                                     featured, published, author_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(content.id.into_inner())
        .bind(&content.title)
        .bind(&content.description)
        .bind(&content.content)
        .bind(content.content_type.as_str())
        .bind(&content.category)
        .bind(&content.tags)
        .bind(content.featured)
        .bind(content.published)
        .bind(content.author_id.into_inner())
        .bind(content.created_at)
        .bind(content.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, content), fields(content_id = %content.id))]
    async fn update(&self, content: &CmsContent) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE cms_content
            SET title = $2, description = $3, content = $4, content_type = $5, category = $6,
                tags = $7, featured = $8, published = $9, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(content.id.into_inner())
        .bind(&content.title)
        .bind(&content.description)
        .bind(&content.content)
        .bind(content.content_type.as_str())
        .bind(&content.category)
        .bind(&content.tags)
        .bind(content.featured)
        .bind(content.published)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ContentNotFound(content.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM cms_content WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ContentNotFound(id));
        }

        Ok(())
    }
}
