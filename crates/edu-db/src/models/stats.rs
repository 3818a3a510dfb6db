//! Aggregate counters

use sqlx::FromRow;

#[derive(Debug, Clone, Copy, FromRow)]
pub struct PlatformCountsModel {
    pub total_users: i64,
    pub total_admins: i64,
    pub verified_users: i64,
    pub papers: i64,
    pub notes: i64,
    pub syllabus: i64,
    pub downloads: i64,
    pub forum_posts: i64,
}
