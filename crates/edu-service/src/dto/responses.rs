//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

// ============================================================================
// Common Response Types
// ============================================================================

/// Paginated response with cursor-based pagination
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    /// `next_before` is the cursor for the following page when the page came back full
    pub fn new(data: Vec<T>, next_before: Option<String>, limit: i64) -> Self {
        let has_more = i64::try_from(data.len()).unwrap_or(i64::MAX) >= limit;
        Self {
            pagination: PaginationMeta {
                next_before: if has_more { next_before } else { None },
                has_more,
                limit,
            },
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_before: Option<String>,
    pub has_more: bool,
    pub limit: i64,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Auth Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: String,
}

/// Authentication response with tokens
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: ProfileResponse,
}

// ============================================================================
// User Responses
// ============================================================================

/// The signed-in user's own view, also used by admin listings
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub verified: bool,
    pub usn: Option<String>,
    pub course: Option<String>,
    pub semester: Option<i32>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What other users may see
#[derive(Debug, Clone, Serialize)]
pub struct PublicUserResponse {
    pub id: String,
    pub name: String,
    pub role: String,
    pub course: Option<String>,
    pub semester: Option<i32>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorSummary {
    pub id: String,
    pub name: String,
}

// ============================================================================
// Resource Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ResourceResponse {
    pub id: String,
    pub kind: String,
    pub title: String,
    pub subject: String,
    pub branch: Option<String>,
    pub semester: i32,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub file_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub uploaded_by: String,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// File contents handed to the HTTP layer for a download
#[derive(Debug, Clone)]
pub struct FileDownload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookmarkResponse {
    pub resource: ResourceResponse,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadResponse {
    pub id: String,
    /// None when the resource has since been deleted
    pub resource: Option<ResourceResponse>,
    pub downloaded_at: DateTime<Utc>,
}

// ============================================================================
// Forum Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    pub id: String,
    pub author: Option<AuthorSummary>,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub views: i64,
    pub reply_count: i64,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyResponse {
    pub id: String,
    pub post_id: String,
    pub author: Option<AuthorSummary>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub replies: Vec<ReplyResponse>,
}

// ============================================================================
// Achievement / Goal Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AchievementResponse {
    pub kind: String,
    pub title: String,
    pub description: String,
    pub threshold: i64,
    pub progress: i64,
    pub earned: bool,
    pub awarded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AchievementsResponse {
    pub earned_count: usize,
    pub achievements: Vec<AchievementResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user: AuthorSummary,
    pub achievement_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub overdue: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// CMS Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ContentResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub content_type: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub published: bool,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Stats / Admin Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub total_users: i64,
    pub total_resources: i64,
    pub papers: i64,
    pub notes: i64,
    pub syllabus: i64,
    pub downloads: i64,
    pub forum_posts: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub total_users: i64,
    pub total_admins: i64,
    pub total_students: i64,
    pub verified_users: i64,
    pub papers: i64,
    pub notes: i64,
    pub syllabus: i64,
    pub downloads: i64,
    pub forum_posts: i64,
    pub recent_users: Vec<ProfileResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupResponse {
    pub message: String,
    pub file: String,
}

// ============================================================================
// Chat Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessageResponse {
    pub id: String,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReplyResponse {
    pub reply: String,
    pub message: ChatMessageResponse,
}

// ============================================================================
// Health Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub redis: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool, redis_healthy: bool) -> Self {
        let label = |ok: bool| if ok { "healthy" } else { "unhealthy" }.to_string();
        Self {
            status: if database_healthy && redis_healthy {
                "ready"
            } else {
                "not_ready"
            }
            .to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: label(database_healthy),
                redis: label(redis_healthy),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
