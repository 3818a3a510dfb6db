//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! business logic, validation, and orchestration of domain operations.

pub mod achievement;
pub mod admin;
pub mod auth;
pub mod bookmark;
pub mod chat;
pub mod cms;
pub mod context;
pub mod error;
pub mod forum;
pub mod goal;
pub mod resource;
pub mod stats;
pub mod support;
pub mod user;

#[cfg(test)]
mod testing;

// Re-export all services for convenience
pub use achievement::AchievementService;
pub use admin::AdminService;
pub use auth::AuthService;
pub use bookmark::BookmarkService;
pub use chat::ChatService;
pub use cms::CmsService;
pub use context::{ServiceContext, ServiceContextBuilder, ServiceSettings};
pub use error::{ServiceError, ServiceResult};
pub use forum::ForumService;
pub use goal::GoalService;
pub use resource::ResourceService;
pub use stats::StatsService;
pub use user::UserService;
