//! PostgreSQL implementation of GoalRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use edu_core::entities::LearningGoal;
use edu_core::error::DomainError;
use edu_core::traits::{GoalRepository, RepoResult};
use edu_core::value_objects::Snowflake;

use crate::models::LearningGoalModel;

use super::error::map_db_error;

#[derive(Clone)]
pub struct PgGoalRepository {
    pool: PgPool,
}

impl PgGoalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GoalRepository for PgGoalRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<LearningGoal>> {
        let result = sqlx::query_as::<_, LearningGoalModel>(
            r"
            SELECT id, user_id, title, description, target_date, completed, completed_at,
                   created_at, updated_at
            FROM learning_goals
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(LearningGoal::from))
    }

    #[instrument(skip(self))]
    async fn list_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<LearningGoal>> {
        let rows = sqlx::query_as::<_, LearningGoalModel>(
            r"
            SELECT id, user_id, title, description, target_date, completed, completed_at,
                   created_at, updated_at
            FROM learning_goals
            WHERE user_id = $1
            ORDER BY completed ASC, target_date ASC NULLS LAST, id DESC
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(LearningGoal::from).collect())
    }

    #[instrument(skip(self, goal), fields(goal_id = %goal.id))]
    async fn create(&self, goal: &LearningGoal) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO learning_goals (id, user_id, title, description, target_date, completed,
                                        completed_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(goal.id.into_inner())
        .bind(goal.user_id.into_inner())
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.target_date)
        .bind(goal.completed)
        .bind(goal.completed_at)
        .bind(goal.created_at)
        .bind(goal.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, goal), fields(goal_id = %goal.id))]
    async fn update(&self, goal: &LearningGoal) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE learning_goals
            SET title = $2, description = $3, target_date = $4, completed = $5,
                completed_at = $6, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(goal.id.into_inner())
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.target_date)
        .bind(goal.completed)
        .bind(goal.completed_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::GoalNotFound(goal.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM learning_goals WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::GoalNotFound(id));
        }

        Ok(())
    }
}
