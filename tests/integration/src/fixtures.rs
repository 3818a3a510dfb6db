//! Test fixtures and data generators
//!
//! Request bodies the tests send and the slices of the responses they read.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
///
/// Includes the start time so reruns against the same database never
/// collide on email addresses.
pub fn unique_suffix() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{millis}x{}", COUNTER.fetch_add(1, Ordering::SeqCst))
}

pub const TEST_PASSWORD: &str = "Library42!";

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub course: Option<String>,
    pub semester: Option<i32>,
}

impl RegisterRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            name: format!("Student {suffix}"),
            email: format!("student{suffix}@college.test"),
            password: TEST_PASSWORD.to_string(),
            course: Some("Computer Science".to_string()),
            semester: Some(4),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_register(reg: &RegisterRequest) -> Self {
        Self {
            email: reg.email.clone(),
            password: reg.password.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: ProfileResponse,
}

#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub verified: bool,
}

// ============================================================================
// Resources
// ============================================================================

/// Multipart upload body for a small PDF
pub fn upload_form(title: &str, subject: &str, semester: i32) -> Form {
    let file = Part::bytes(b"%PDF-1.4 integration".to_vec())
        .file_name("notes.pdf")
        .mime_str("application/pdf")
        .unwrap_or_else(|_| Part::bytes(Vec::new()));
    Form::new()
        .text("title", title.to_string())
        .text("subject", subject.to_string())
        .text("semester", semester.to_string())
        .text("year", "2024")
        .part("file", file)
}

#[derive(Debug, Deserialize)]
pub struct ResourceResponse {
    pub id: String,
    pub kind: String,
    pub title: String,
    pub subject: String,
    pub semester: i32,
    pub file_name: String,
    pub download_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
}

// ============================================================================
// Forum
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
}

impl CreatePostRequest {
    pub fn unique() -> Self {
        Self {
            title: format!("Exam tips {}", unique_suffix()),
            content: "Which chapters matter most for the finals?".to_string(),
            category: "general".to_string(),
            tags: vec!["exams".to_string()],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateReplyRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub views: i64,
    pub reply_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub replies: Vec<serde_json::Value>,
}

// ============================================================================
// Library
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CreateBookmarkRequest {
    pub resource_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreateGoalRequest {
    pub title: String,
    pub target_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompleteGoalRequest {
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct GoalResponse {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub completed_at: Option<String>,
}

// ============================================================================
// CMS / Admin
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ContentRequest {
    pub title: String,
    pub content: String,
    pub content_type: String,
    pub featured: bool,
    pub published: bool,
}

#[derive(Debug, Deserialize)]
pub struct ContentResponse {
    pub id: String,
    pub title: String,
    pub published: bool,
}

#[derive(Debug, Serialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}
