//! Counts a viewer once per post within a time window.

use async_trait::async_trait;
use edu_core::Snowflake;

use crate::pool::{RedisPool, RedisResult};

/// A repeat view inside this window does not bump the counter
pub const VIEW_WINDOW_SECS: u64 = 60 * 60;

const VIEW_PREFIX: &str = "post_view:";

#[async_trait]
pub trait ViewTracker: Send + Sync {
    /// True when this is the viewer's first view of the post in the window
    async fn first_view(&self, post_id: Snowflake, viewer_id: Snowflake) -> RedisResult<bool>;
}

#[derive(Clone)]
pub struct RedisViewTracker {
    pool: RedisPool,
}

impl RedisViewTracker {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn key(post_id: Snowflake, viewer_id: Snowflake) -> String {
        format!("{VIEW_PREFIX}{post_id}:{viewer_id}")
    }
}

#[async_trait]
impl ViewTracker for RedisViewTracker {
    async fn first_view(&self, post_id: Snowflake, viewer_id: Snowflake) -> RedisResult<bool> {
        self.pool
            .set_nx(&Self::key(post_id, viewer_id), "1", VIEW_WINDOW_SECS)
            .await
    }
}
