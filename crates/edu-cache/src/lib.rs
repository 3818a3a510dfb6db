//! # edu-cache
//!
//! Redis-backed state that does not belong in PostgreSQL.
//!
//! - **Connection Pool**: managed Redis connection pool with deadpool
//! - **Refresh Sessions**: one entry per issued refresh token, rotated on use
//! - **View Tracking**: counts a forum post view once per viewer per hour
//!
//! The services depend on the [`SessionStore`] and [`ViewTracker`] traits so
//! that tests can swap in in-memory implementations.
//!
//! ```ignore
//! use edu_cache::{RedisPool, RedisPoolConfig, RedisSessionStore, RefreshSession};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let sessions = RedisSessionStore::new(pool.clone(), 7 * 24 * 3600);
//! sessions.store(&claims.jti, &RefreshSession::new(user_id)).await?;
//! ```

pub mod pool;
pub mod session;
pub mod views;

// Re-export pool types
pub use pool::{
    create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
};

pub use session::{RedisSessionStore, RefreshSession, SessionStore};
pub use views::{RedisViewTracker, ViewTracker, VIEW_WINDOW_SECS};
