//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in edu-core.
//! Each repository handles database operations for a specific domain entity.

mod achievement;
mod bookmark;
mod chat;
mod cms;
mod download;
mod error;
mod forum;
mod goal;
mod resource;
mod stats;
mod support;
mod token;
mod user;

pub use achievement::PgAchievementRepository;
pub use bookmark::PgBookmarkRepository;
pub use chat::PgChatRepository;
pub use cms::PgCmsRepository;
pub use download::PgDownloadRepository;
pub use forum::PgForumRepository;
pub use goal::PgGoalRepository;
pub use resource::PgResourceRepository;
pub use stats::PgStatsRepository;
pub use token::PgVerificationTokenRepository;
pub use user::PgUserRepository;
