//! Domain entities - core business objects

mod achievement;
mod bookmark;
mod chat;
mod cms;
mod forum;
mod goal;
mod resource;
mod token;
mod user;

pub use achievement::{Achievement, AchievementKind, ActivityStats};
pub use bookmark::{Bookmark, Download};
pub use chat::{ChatMessage, ChatRole};
pub use cms::{CmsContent, CmsContentType};
pub use forum::{normalize_tags, ForumPost, ForumReply, MAX_POST_TAGS};
pub use goal::LearningGoal;
pub use resource::{
    is_allowed_extension, sanitize_file_name, Resource, ResourceKind, ALLOWED_EXTENSIONS,
};
pub use token::{generate_token, TokenPurpose, VerificationToken};
pub use user::{normalize_email, User, UserRole};
