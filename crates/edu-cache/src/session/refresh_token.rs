//! Refresh session storage in Redis.

use async_trait::async_trait;
use edu_core::Snowflake;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use crate::pool::{RedisPool, RedisResult};

const REFRESH_TOKEN_PREFIX: &str = "refresh_token:";
const USER_SESSIONS_PREFIX: &str = "user_sessions:";

/// Data stored for one live refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSession {
    pub user_id: Snowflake,
    /// Unix epoch seconds
    pub created_at: i64,
    pub user_agent: Option<String>,
}

impl RefreshSession {
    #[must_use]
    pub fn new(user_id: Snowflake) -> Self {
        Self {
            user_id,
            created_at: chrono::Utc::now().timestamp(),
            user_agent: None,
        }
    }

    #[must_use]
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }
}

/// Storage for refresh sessions keyed by token id
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn store(&self, token_id: &str, session: &RefreshSession) -> RedisResult<()>;

    async fn get(&self, token_id: &str) -> RedisResult<Option<RefreshSession>>;

    /// Returns true when the session existed
    async fn revoke(&self, token_id: &str) -> RedisResult<bool>;

    /// Drop every session of a user (logout everywhere, password change)
    async fn revoke_all_for_user(&self, user_id: Snowflake) -> RedisResult<u32>;
}

/// Redis implementation of [`SessionStore`]
#[derive(Clone)]
pub struct RedisSessionStore {
    pool: RedisPool,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    /// `ttl_seconds` should match the refresh token lifetime
    #[must_use]
    pub fn new(pool: RedisPool, ttl_seconds: u64) -> Self {
        Self { pool, ttl_seconds }
    }

    fn key(token_id: &str) -> String {
        format!("{REFRESH_TOKEN_PREFIX}{token_id}")
    }

    fn user_key(user_id: Snowflake) -> String {
        format!("{USER_SESSIONS_PREFIX}{user_id}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn store(&self, token_id: &str, session: &RefreshSession) -> RedisResult<()> {
        self.pool
            .set_json(&Self::key(token_id), session, self.ttl_seconds)
            .await?;

        let user_key = Self::user_key(session.user_id);
        let ttl = i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX);
        let mut conn = self.pool.get().await?;
        conn.sadd::<_, _, ()>(&user_key, token_id).await?;
        conn.expire::<_, ()>(&user_key, ttl).await?;

        tracing::debug!(token_id = %token_id, user_id = %session.user_id, "Stored refresh session");
        Ok(())
    }

    async fn get(&self, token_id: &str) -> RedisResult<Option<RefreshSession>> {
        self.pool.get_json(&Self::key(token_id)).await
    }

    async fn revoke(&self, token_id: &str) -> RedisResult<bool> {
        if let Some(session) = self.get(token_id).await? {
            let mut conn = self.pool.get().await?;
            conn.srem::<_, _, ()>(Self::user_key(session.user_id), token_id)
                .await?;
        }

        let deleted = self.pool.delete(&Self::key(token_id)).await?;
        if deleted {
            tracing::debug!(token_id = %token_id, "Revoked refresh session");
        }
        Ok(deleted)
    }

    async fn revoke_all_for_user(&self, user_id: Snowflake) -> RedisResult<u32> {
        let user_key = Self::user_key(user_id);
        let mut conn = self.pool.get().await?;

        let token_ids: Vec<String> = conn.smembers(&user_key).await?;
        let keys: Vec<String> = token_ids.iter().map(|id| Self::key(id)).collect();
        self.pool.delete_many(&keys).await?;
        conn.del::<_, ()>(&user_key).await?;

        let count = u32::try_from(token_ids.len()).unwrap_or(u32::MAX);
        tracing::info!(user_id = %user_id, count, "Revoked all refresh sessions for user");
        Ok(count)
    }
}
