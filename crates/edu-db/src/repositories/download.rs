//! PostgreSQL implementation of DownloadRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use edu_core::entities::Download;
use edu_core::error::DomainError;
use edu_core::traits::{DownloadRepository, RepoResult};
use edu_core::value_objects::Snowflake;

use crate::models::DownloadModel;

use super::error::{map_db_error, map_fk_violation};
use super::support::page_limit;

#[derive(Clone)]
pub struct PgDownloadRepository {
    pool: PgPool,
}

impl PgDownloadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DownloadRepository for PgDownloadRepository {
    #[instrument(skip(self, download), fields(user_id = %download.user_id, resource_id = %download.resource_id))]
    async fn record(&self, download: &Download) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO downloads (id, user_id, resource_id, downloaded_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(download.id.into_inner())
        .bind(download.user_id.into_inner())
        .bind(download.resource_id.into_inner())
        .bind(download.downloaded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_fk_violation(e, || DomainError::ResourceNotFound(download.resource_id)))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_by_user(&self, user_id: Snowflake, limit: i64) -> RepoResult<Vec<Download>> {
        let rows = sqlx::query_as::<_, DownloadModel>(
            r"
            SELECT id, user_id, resource_id, downloaded_at
            FROM downloads
            WHERE user_id = $1
            ORDER BY id DESC
            LIMIT $2
            ",
        )
        .bind(user_id.into_inner())
        .bind(page_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Download::from).collect())
    }
}
