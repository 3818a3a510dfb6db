//! # edu-core
//!
//! Domain layer containing entities, value objects and repository traits.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    generate_token, is_allowed_extension, normalize_email, normalize_tags, sanitize_file_name,
    Achievement, AchievementKind, ActivityStats, Bookmark, ChatMessage, ChatRole, CmsContent,
    CmsContentType, Download, ForumPost, ForumReply, LearningGoal, Resource, ResourceKind,
    TokenPurpose, User, UserRole, VerificationToken, ALLOWED_EXTENSIONS, MAX_POST_TAGS,
};
pub use error::DomainError;
pub use traits::{
    AchievementRepository, BookmarkRepository, ChatRepository, CmsQuery, CmsRepository,
    DownloadRepository, ForumRepository, GoalRepository, PlatformCounts, PostQuery, RepoResult,
    ResourceQuery, ResourceRepository, StatsRepository, UserRepository,
    VerificationTokenRepository,
};
pub use value_objects::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
