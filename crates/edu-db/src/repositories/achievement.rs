//! PostgreSQL implementation of AchievementRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use edu_core::entities::{AchievementKind, ActivityStats};
use edu_core::traits::{AchievementRepository, RepoResult};
use edu_core::value_objects::Snowflake;

use crate::mappers::leaderboard_row;
use crate::models::{AchievementModel, ActivityStatsModel, LeaderboardRowModel};

use super::error::map_db_error;
use super::support::page_limit;

#[derive(Clone)]
pub struct PgAchievementRepository {
    pool: PgPool,
}

impl PgAchievementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AchievementRepository for PgAchievementRepository {
    #[instrument(skip(self))]
    async fn list_by_user(
        &self,
        user_id: Snowflake,
    ) -> RepoResult<Vec<(AchievementKind, DateTime<Utc>)>> {
        let rows = sqlx::query_as::<_, AchievementModel>(
            r"
            SELECT user_id, kind, awarded_at
            FROM achievements
            WHERE user_id = $1
            ORDER BY awarded_at
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter()
            .map(|row| Ok((row.kind.parse::<AchievementKind>()?, row.awarded_at)))
            .collect()
    }

    #[instrument(skip(self))]
    async fn award(&self, user_id: Snowflake, kind: AchievementKind) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO achievements (user_id, kind, awarded_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, kind) DO NOTHING
            ",
        )
        .bind(user_id.into_inner())
        .bind(kind.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn activity_stats(&self, user_id: Snowflake) -> RepoResult<ActivityStats> {
        let row = sqlx::query_as::<_, ActivityStatsModel>(
            r"
            SELECT
                (SELECT COUNT(*) FROM resources WHERE uploaded_by = $1) AS uploads,
                (SELECT COUNT(*) FROM downloads WHERE user_id = $1) AS downloads,
                (SELECT COUNT(*) FROM forum_posts WHERE author_id = $1) AS forum_posts,
                (SELECT COUNT(*) FROM forum_replies WHERE author_id = $1) AS forum_replies,
                (SELECT COUNT(*) FROM bookmarks WHERE user_id = $1) AS bookmarks,
                (SELECT COUNT(*) FROM learning_goals WHERE user_id = $1 AND completed) AS goals_completed
            ",
        )
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ActivityStats::from(row))
    }

    #[instrument(skip(self))]
    async fn leaderboard(&self, limit: i64) -> RepoResult<Vec<(Snowflake, i64)>> {
        let rows = sqlx::query_as::<_, LeaderboardRowModel>(
            r"
            SELECT a.user_id, COUNT(*) AS achievement_count
            FROM achievements a
            JOIN users u ON u.id = a.user_id AND u.deleted_at IS NULL
            GROUP BY a.user_id
            ORDER BY achievement_count DESC, MIN(a.awarded_at) ASC
            LIMIT $1
            ",
        )
        .bind(page_limit(limit).min(50))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(leaderboard_row).collect())
    }
}
