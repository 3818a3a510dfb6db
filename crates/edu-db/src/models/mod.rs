//! Database models - SQLx-compatible structs for PostgreSQL tables

mod achievement;
mod chat;
mod cms;
mod forum;
mod goal;
mod resource;
mod stats;
mod token;
mod user;

pub use achievement::{AchievementModel, ActivityStatsModel, LeaderboardRowModel};
pub use chat::ChatMessageModel;
pub use cms::CmsContentModel;
pub use forum::{ForumPostModel, ForumReplyModel};
pub use goal::LearningGoalModel;
pub use resource::{BookmarkModel, DownloadModel, ResourceModel};
pub use stats::PlatformCountsModel;
pub use token::VerificationTokenModel;
pub use user::UserModel;
