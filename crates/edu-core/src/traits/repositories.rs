//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::{
    AchievementKind, ActivityStats, Bookmark, ChatMessage, CmsContent, CmsContentType, Download,
    ForumPost, ForumReply, LearningGoal, Resource, ResourceKind, TokenPurpose, User, UserRole,
    VerificationToken,
};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID (soft-deleted users are not returned)
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Find several users at once, in no particular order
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<User>>;

    /// Find user by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Check if email is already taken
    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Create a new user; a duplicate email yields `EmailAlreadyExists`
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()>;

    /// Update profile fields (name, usn, course, semester, bio)
    async fn update(&self, user: &User) -> RepoResult<()>;

    async fn set_role(&self, id: Snowflake, role: UserRole) -> RepoResult<()>;

    async fn mark_verified(&self, id: Snowflake) -> RepoResult<()>;

    /// Soft delete a user
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>>;

    /// Update password hash
    async fn update_password(&self, id: Snowflake, password_hash: &str) -> RepoResult<()>;

    /// List users newest first, starting below the `before` cursor
    async fn list(&self, before: Option<Snowflake>, limit: i64) -> RepoResult<Vec<User>>;
}

// ============================================================================
// Verification Token Repository
// ============================================================================

#[async_trait]
pub trait VerificationTokenRepository: Send + Sync {
    /// Store a new token, invalidating the user's earlier unused tokens of the same purpose
    async fn create(&self, token: &VerificationToken) -> RepoResult<()>;

    /// Look a token up regardless of state
    async fn find(&self, token: &str) -> RepoResult<Option<VerificationToken>>;

    /// Mark the token used if it is still unused.
    ///
    /// Returns false when another request consumed it first.
    async fn consume(&self, token: &str) -> RepoResult<bool>;

    /// Most recently issued token for (user, purpose)
    async fn latest_for_user(
        &self,
        user_id: Snowflake,
        purpose: TokenPurpose,
    ) -> RepoResult<Option<VerificationToken>>;
}

// ============================================================================
// Resource Repository
// ============================================================================

/// Filters for resource listings
#[derive(Debug, Clone)]
pub struct ResourceQuery {
    pub kind: ResourceKind,
    pub subject: Option<String>,
    pub semester: Option<i32>,
    pub year: Option<i32>,
    /// Case-insensitive title search
    pub search: Option<String>,
    pub uploaded_by: Option<Snowflake>,
    pub before: Option<Snowflake>,
    pub limit: i64,
}

impl ResourceQuery {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            subject: None,
            semester: None,
            year: None,
            search: None,
            uploaded_by: None,
            before: None,
            limit: 50,
        }
    }
}

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Resource>>;

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Resource>>;

    /// Newest first
    async fn list(&self, query: &ResourceQuery) -> RepoResult<Vec<Resource>>;

    async fn create(&self, resource: &Resource) -> RepoResult<()>;

    /// Update metadata fields only
    async fn update(&self, resource: &Resource) -> RepoResult<()>;

    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    async fn increment_downloads(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Download Repository
// ============================================================================

#[async_trait]
pub trait DownloadRepository: Send + Sync {
    async fn record(&self, download: &Download) -> RepoResult<()>;

    /// Newest first
    async fn list_by_user(&self, user_id: Snowflake, limit: i64) -> RepoResult<Vec<Download>>;
}

// ============================================================================
// Bookmark Repository
// ============================================================================

#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// Duplicate (user, resource) pairs yield `BookmarkAlreadyExists`
    async fn create(&self, bookmark: &Bookmark) -> RepoResult<()>;

    /// Returns false when no bookmark existed
    async fn delete(&self, user_id: Snowflake, resource_id: Snowflake) -> RepoResult<bool>;

    /// Newest first
    async fn list_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Bookmark>>;
}

// ============================================================================
// Forum Repository
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub before: Option<Snowflake>,
    pub limit: i64,
}

#[async_trait]
pub trait ForumRepository: Send + Sync {
    async fn find_post(&self, id: Snowflake) -> RepoResult<Option<ForumPost>>;

    /// Newest first
    async fn list_posts(&self, query: &PostQuery) -> RepoResult<Vec<ForumPost>>;

    async fn create_post(&self, post: &ForumPost) -> RepoResult<()>;

    /// Update title, content, category and tags
    async fn update_post(&self, post: &ForumPost) -> RepoResult<()>;

    /// Delete a post together with its replies
    async fn delete_post(&self, id: Snowflake) -> RepoResult<()>;

    async fn increment_views(&self, id: Snowflake) -> RepoResult<()>;

    async fn find_reply(&self, id: Snowflake) -> RepoResult<Option<ForumReply>>;

    /// Oldest first
    async fn list_replies(&self, post_id: Snowflake) -> RepoResult<Vec<ForumReply>>;

    /// Insert a reply and bump the post's reply count and last activity
    async fn create_reply(&self, reply: &ForumReply) -> RepoResult<()>;

    /// Delete a reply and decrement the post's reply count
    async fn delete_reply(&self, reply: &ForumReply) -> RepoResult<()>;
}

// ============================================================================
// Achievement Repository
// ============================================================================

#[async_trait]
pub trait AchievementRepository: Send + Sync {
    /// Awarded kinds with their timestamps
    async fn list_by_user(
        &self,
        user_id: Snowflake,
    ) -> RepoResult<Vec<(AchievementKind, DateTime<Utc>)>>;

    /// Record an award; returns false if it was already present
    async fn award(&self, user_id: Snowflake, kind: AchievementKind) -> RepoResult<bool>;

    /// Current activity counters for a user
    async fn activity_stats(&self, user_id: Snowflake) -> RepoResult<ActivityStats>;

    /// (user id, achievement count), highest first
    async fn leaderboard(&self, limit: i64) -> RepoResult<Vec<(Snowflake, i64)>>;
}

// ============================================================================
// Learning Goal Repository
// ============================================================================

#[async_trait]
pub trait GoalRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<LearningGoal>>;

    /// Open goals first, then by target date
    async fn list_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<LearningGoal>>;

    async fn create(&self, goal: &LearningGoal) -> RepoResult<()>;

    async fn update(&self, goal: &LearningGoal) -> RepoResult<()>;

    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// CMS Repository
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CmsQuery {
    pub content_type: Option<CmsContentType>,
    pub featured: Option<bool>,
    pub include_unpublished: bool,
    pub limit: i64,
}

#[async_trait]
pub trait CmsRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<CmsContent>>;

    /// Featured first, then newest first
    async fn list(&self, query: &CmsQuery) -> RepoResult<Vec<CmsContent>>;

    async fn create(&self, content: &CmsContent) -> RepoResult<()>;

    async fn update(&self, content: &CmsContent) -> RepoResult<()>;

    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Chat Repository
// ============================================================================

#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn create(&self, message: &ChatMessage) -> RepoResult<()>;

    /// The latest `limit` messages, returned oldest first
    async fn recent(&self, user_id: Snowflake, limit: i64) -> RepoResult<Vec<ChatMessage>>;

    /// Delete the whole history, returning the number of removed messages
    async fn clear(&self, user_id: Snowflake) -> RepoResult<u64>;
}

// ============================================================================
// Stats Repository
// ============================================================================

/// Platform-wide totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlatformCounts {
    pub total_users: i64,
    pub total_admins: i64,
    pub verified_users: i64,
    pub papers: i64,
    pub notes: i64,
    pub syllabus: i64,
    pub downloads: i64,
    pub forum_posts: i64,
}

impl PlatformCounts {
    pub fn total_students(&self) -> i64 {
        self.total_users - self.total_admins
    }

    pub fn total_resources(&self) -> i64 {
        self.papers + self.notes + self.syllabus
    }
}

#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn counts(&self) -> RepoResult<PlatformCounts>;
}
