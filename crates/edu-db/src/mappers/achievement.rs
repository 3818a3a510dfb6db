//! Achievement and activity mappers

use edu_core::entities::ActivityStats;
use edu_core::value_objects::Snowflake;

use crate::models::{ActivityStatsModel, LeaderboardRowModel};

impl From<ActivityStatsModel> for ActivityStats {
    fn from(model: ActivityStatsModel) -> Self {
        ActivityStats {
            uploads: model.uploads,
            downloads: model.downloads,
            forum_posts: model.forum_posts,
            forum_replies: model.forum_replies,
            bookmarks: model.bookmarks,
            goals_completed: model.goals_completed,
        }
    }
}

pub fn leaderboard_row(row: LeaderboardRowModel) -> (Snowflake, i64) {
    (Snowflake::new(row.user_id), row.achievement_count)
}
