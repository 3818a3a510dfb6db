//! Achievement database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct AchievementModel {
    pub user_id: i64,
    pub kind: String,
    pub awarded_at: DateTime<Utc>,
}

/// Row produced by the per-user activity counter query
#[derive(Debug, Clone, Copy, FromRow)]
pub struct ActivityStatsModel {
    pub uploads: i64,
    pub downloads: i64,
    pub forum_posts: i64,
    pub forum_replies: i64,
    pub bookmarks: i64,
    pub goals_completed: i64,
}

#[derive(Debug, Clone, Copy, FromRow)]
pub struct LeaderboardRowModel {
    pub user_id: i64,
    pub achievement_count: i64,
}
