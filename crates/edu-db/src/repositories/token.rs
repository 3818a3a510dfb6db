//! PostgreSQL implementation of VerificationTokenRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use edu_core::entities::{TokenPurpose, VerificationToken};
use edu_core::error::DomainError;
use edu_core::traits::{RepoResult, VerificationTokenRepository};
use edu_core::value_objects::Snowflake;

use crate::models::VerificationTokenModel;

use super::error::{map_db_error, map_fk_violation};

#[derive(Clone)]
pub struct PgVerificationTokenRepository {
    pool: PgPool,
}

impl PgVerificationTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationTokenRepository for PgVerificationTokenRepository {
    #[instrument(skip(self, token), fields(user_id = %token.user_id, purpose = token.purpose.as_str()))]
    async fn create(&self, token: &VerificationToken) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Earlier links of the same kind stop working once a new one is sent
        sqlx::query(
            r"
            DELETE FROM verification_tokens
            WHERE user_id = $1 AND purpose = $2 AND used_at IS NULL
            ",
        )
        .bind(token.user_id.into_inner())
        .bind(token.purpose.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO verification_tokens (token, user_id, purpose, expires_at, used_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&token.token)
        .bind(token.user_id.into_inner())
        .bind(token.purpose.as_str())
        .bind(token.expires_at)
        .bind(token.used_at)
        .bind(token.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_fk_violation(e, || DomainError::UserNotFound(token.user_id)))?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn find(&self, token: &str) -> RepoResult<Option<VerificationToken>> {
        let result = sqlx::query_as::<_, VerificationTokenModel>(
            r"
            SELECT token, user_id, purpose, expires_at, used_at, created_at
            FROM verification_tokens
            WHERE token = $1
            ",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(VerificationToken::try_from).transpose()
    }

    #[instrument(skip(self, token))]
    async fn consume(&self, token: &str) -> RepoResult<bool> {
        // Row-level atomicity: only one concurrent caller sees rows_affected == 1
        let result = sqlx::query(
            r"
            UPDATE verification_tokens
            SET used_at = NOW()
            WHERE token = $1 AND used_at IS NULL AND expires_at > NOW()
            ",
        )
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn latest_for_user(
        &self,
        user_id: Snowflake,
        purpose: TokenPurpose,
    ) -> RepoResult<Option<VerificationToken>> {
        let result = sqlx::query_as::<_, VerificationTokenModel>(
            r"
            SELECT token, user_id, purpose, expires_at, used_at, created_at
            FROM verification_tokens
            WHERE user_id = $1 AND purpose = $2
            ORDER BY created_at DESC
            LIMIT 1
            ",
        )
        .bind(user_id.into_inner())
        .bind(purpose.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(VerificationToken::try_from).transpose()
    }
}
