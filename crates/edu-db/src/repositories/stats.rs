//! PostgreSQL implementation of StatsRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use edu_core::traits::{PlatformCounts, RepoResult, StatsRepository};

use crate::models::PlatformCountsModel;

use super::error::map_db_error;

#[derive(Clone)]
pub struct PgStatsRepository {
    pool: PgPool,
}

impl PgStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    #[instrument(skip(self))]
    async fn counts(&self) -> RepoResult<PlatformCounts> {
        let row = sqlx::query_as::<_, PlatformCountsModel>(
            r"
            SELECT
                (SELECT COUNT(*) FROM users WHERE deleted_at IS NULL) AS total_users,
                (SELECT COUNT(*) FROM users WHERE deleted_at IS NULL AND role = 'admin') AS total_admins,
                (SELECT COUNT(*) FROM users WHERE deleted_at IS NULL AND verified) AS verified_users,
                (SELECT COUNT(*) FROM resources WHERE kind = 'paper') AS papers,
                (SELECT COUNT(*) FROM resources WHERE kind = 'note') AS notes,
                (SELECT COUNT(*) FROM resources WHERE kind = 'syllabus') AS syllabus,
                (SELECT COUNT(*) FROM downloads) AS downloads,
                (SELECT COUNT(*) FROM forum_posts) AS forum_posts
            ",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(PlatformCounts::from(row))
    }
}
