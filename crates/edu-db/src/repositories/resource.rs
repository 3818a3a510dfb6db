//! PostgreSQL implementation of ResourceRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use edu_core::entities::Resource;
use edu_core::error::DomainError;
use edu_core::traits::{RepoResult, ResourceQuery, ResourceRepository};
use edu_core::value_objects::Snowflake;

use crate::models::ResourceModel;

use super::error::{map_db_error, map_fk_violation};
use super::support::{contains_pattern, page_limit, raw_ids};

const RESOURCE_COLUMNS: &str = "id, kind, title, subject, branch, semester, year, description, \
     file_path, file_name, content_type, file_size, uploaded_by, download_count, created_at, updated_at";

#[derive(Clone)]
pub struct PgResourceRepository {
    pool: PgPool,
}

impl PgResourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn into_resources(rows: Vec<ResourceModel>) -> RepoResult<Vec<Resource>> {
        rows.into_iter().map(Resource::try_from).collect()
    }
}

#[async_trait]
impl ResourceRepository for PgResourceRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Resource>> {
        let result = sqlx::query_as::<_, ResourceModel>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Resource::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Resource>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ResourceModel>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = ANY($1)"
        ))
        .bind(raw_ids(ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Self::into_resources(rows)
    }

    #[instrument(skip(self))]
    async fn list(&self, query: &ResourceQuery) -> RepoResult<Vec<Resource>> {
        let rows = sqlx::query_as::<_, ResourceModel>(&format!(
            r"
            SELECT {RESOURCE_COLUMNS} FROM resources
            WHERE kind = $1
              AND ($2::TEXT IS NULL OR lower(subject) = lower($2))
              AND ($3::INT IS NULL OR semester = $3)
              AND ($4::INT IS NULL OR year = $4)
              AND ($5::TEXT IS NULL OR title ILIKE $5)
              AND ($6::BIGINT IS NULL OR uploaded_by = $6)
              AND ($7::BIGINT IS NULL OR id < $7)
            ORDER BY id DESC
            LIMIT $8
            "
        ))
        .bind(query.kind.as_str())
        .bind(query.subject.as_deref())
        .bind(query.semester)
        .bind(query.year)
        .bind(query.search.as_deref().map(contains_pattern))
        .bind(query.uploaded_by.map(Snowflake::into_inner))
        .bind(query.before.map(Snowflake::into_inner))
        .bind(page_limit(query.limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Self::into_resources(rows)
    }

    #[instrument(skip(self, resource), fields(resource_id = %resource.id, kind = resource.kind.as_str()))]
    async fn create(&self, resource: &Resource) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO resources (id, kind, title, subject, branch, semester, year, description,
                                   file_path, file_name, content_type, file_size, uploaded_by,
                                   download_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ",
        )
        .bind(resource.id.into_inner())
        .bind(resource.kind.as_str())
        .bind(&resource.title)
        .bind(&resource.subject)
        .bind(&resource.branch)
        .bind(resource.semester)
        .bind(resource.year)
        .bind(&resource.description)
        .bind(&resource.file_path)
        .bind(&resource.file_name)
        .bind(&resource.content_type)
        .bind(resource.file_size)
        .bind(resource.uploaded_by.into_inner())
        .bind(resource.download_count)
        .bind(resource.created_at)
        .bind(resource.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_fk_violation(e, || DomainError::UserNotFound(resource.uploaded_by)))?;

        Ok(())
    }

    #[instrument(skip(self, resource), fields(resource_id = %resource.id))]
    async fn update(&self, resource: &Resource) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE resources
            SET title = $2, subject = $3, branch = $4, semester = $5, year = $6,
                description = $7, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(resource.id.into_inner())
        .bind(&resource.title)
        .bind(&resource.subject)
        .bind(&resource.branch)
        .bind(resource.semester)
        .bind(resource.year)
        .bind(&resource.description)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ResourceNotFound(resource.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ResourceNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn increment_downloads(&self, id: Snowflake) -> RepoResult<()> {
        sqlx::query("UPDATE resources SET download_count = download_count + 1 WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgResourceRepository>();
    }
}
