//! PostgreSQL implementation of ChatRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use edu_core::entities::ChatMessage;
use edu_core::traits::{ChatRepository, RepoResult};
use edu_core::value_objects::Snowflake;

use crate::models::ChatMessageModel;

use super::error::map_db_error;
use super::support::page_limit;

#[derive(Clone)]
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    #[instrument(skip(self, message), fields(user_id = %message.user_id, role = message.role.as_str()))]
    async fn create(&self, message: &ChatMessage) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO chat_messages (id, user_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(message.id.into_inner())
        .bind(message.user_id.into_inner())
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn recent(&self, user_id: Snowflake, limit: i64) -> RepoResult<Vec<ChatMessage>> {
        let rows = sqlx::query_as::<_, ChatMessageModel>(
            r"
            SELECT * FROM (
                SELECT id, user_id, role, content, created_at
                FROM chat_messages
                WHERE user_id = $1
                ORDER BY id DESC
                LIMIT $2
            ) latest
            ORDER BY id ASC
            ",
        )
        .bind(user_id.into_inner())
        .bind(page_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(ChatMessage::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn clear(&self, user_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE user_id = $1")
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
