//! # edu-db
//!
//! Database layer implementing repository traits with PostgreSQL via SQLx.
//!
//! This crate provides PostgreSQL implementations for all repository traits
//! defined in `edu-core`. It handles:
//!
//! - Connection pool management and migrations
//! - Database models with SQLx `FromRow` derives
//! - Model → entity mappers
//! - Repository implementations
//!
//! ```rust,ignore
//! use edu_db::{create_pool, run_migrations, DatabaseConfig, PgUserRepository};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! run_migrations(&pool, "./migrations").await?;
//! let users = PgUserRepository::new(pool);
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{
    PgAchievementRepository, PgBookmarkRepository, PgChatRepository, PgCmsRepository,
    PgDownloadRepository, PgForumRepository, PgGoalRepository, PgResourceRepository,
    PgStatsRepository, PgUserRepository, PgVerificationTokenRepository,
};
