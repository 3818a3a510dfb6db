//! # edu-service
//!
//! Application layer containing business logic, services, DTOs and the
//! outbound integrations (file storage, mail relay, AI endpoint).

pub mod dto;
pub mod integrations;
pub mod services;

pub use services::{
    AchievementService, AdminService, AuthService, BookmarkService, ChatService, CmsService,
    ForumService, GoalService, ResourceService, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult, ServiceSettings, StatsService, UserService,
};
