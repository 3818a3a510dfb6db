//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    ChangePasswordRequest, ChatRequest, ContentFilter, ContentRequest, CreateBookmarkRequest,
    CreateGoalRequest, CreatePostRequest, CreateReplyRequest, EmailRequest, LoginRequest,
    LogoutRequest, PageQuery, PostFilter, RefreshTokenRequest, RegisterRequest,
    ResetPasswordRequest, ResourceFilter, UpdateGoalRequest, UpdatePostRequest,
    UpdateProfileRequest, UpdateResourceRequest, UpdateRoleRequest, UploadResourceRequest,
    UploadedFile,
};

pub use responses::{
    AchievementResponse, AchievementsResponse, AuthResponse, AuthorSummary, BackupResponse,
    BookmarkResponse, ChatMessageResponse, ChatReplyResponse, ContentResponse,
    DashboardResponse, DownloadResponse, FileDownload, GoalResponse, HealthChecks,
    HealthResponse, LeaderboardEntry, MessageResponse, PaginatedResponse, PaginationMeta,
    PostDetailResponse, PostResponse, ProfileResponse, PublicUserResponse, ReadinessResponse,
    RegisterResponse, ReplyResponse, ResourceResponse, StatsResponse,
};
