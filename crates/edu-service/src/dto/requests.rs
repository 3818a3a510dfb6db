//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use chrono::NaiveDate;
use edu_core::Snowflake;
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Auth Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(length(max = 20, message = "USN must be at most 20 characters"))]
    pub usn: Option<String>,

    #[validate(length(max = 100, message = "Course must be at most 100 characters"))]
    pub course: Option<String>,

    #[validate(range(min = 1, max = 12, message = "Semester must be between 1 and 12"))]
    pub semester: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Logout request (optional refresh token to revoke)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// Body of resend-verification and forgot-password
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub new_password: String,
}

// ============================================================================
// User Requests
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 20, message = "USN must be at most 20 characters"))]
    pub usn: Option<String>,

    #[validate(length(max = 100, message = "Course must be at most 100 characters"))]
    pub course: Option<String>,

    #[validate(range(min = 1, max = 12, message = "Semester must be between 1 and 12"))]
    pub semester: Option<i32>,

    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// Cursor pagination parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub before: Option<Snowflake>,
    pub limit: Option<i64>,
}

// ============================================================================
// Resource Requests
// ============================================================================

/// Metadata fields of a multipart upload
#[derive(Debug, Clone, Default, Validate)]
pub struct UploadResourceRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 100, message = "Subject must be 1-100 characters"))]
    pub subject: String,

    #[validate(range(min = 1, max = 12, message = "Semester must be between 1 and 12"))]
    pub semester: i32,

    #[validate(range(min = 1950, max = 2100, message = "Year is out of range"))]
    pub year: Option<i32>,

    #[validate(length(max = 100, message = "Branch must be at most 100 characters"))]
    pub branch: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

/// An uploaded file as received from the client
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateResourceRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Subject must be 1-100 characters"))]
    pub subject: Option<String>,

    #[validate(range(min = 1, max = 12, message = "Semester must be between 1 and 12"))]
    pub semester: Option<i32>,

    #[validate(range(min = 1950, max = 2100, message = "Year is out of range"))]
    pub year: Option<i32>,

    #[validate(length(max = 100, message = "Branch must be at most 100 characters"))]
    pub branch: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

/// Query string of resource listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceFilter {
    pub subject: Option<String>,
    pub semester: Option<i32>,
    pub year: Option<i32>,
    pub q: Option<String>,
    pub before: Option<Snowflake>,
    pub limit: Option<i64>,
}

// ============================================================================
// Forum Requests
// ============================================================================

fn default_category() -> String {
    "general".to_string()
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 10000, message = "Content must be 1-10000 characters"))]
    pub content: String,

    #[serde(default = "default_category")]
    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: String,

    #[serde(default)]
    #[validate(length(max = 5, message = "At most 5 tags are allowed"))]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 10000, message = "Content must be 1-10000 characters"))]
    pub content: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: Option<String>,

    #[validate(length(max = 5, message = "At most 5 tags are allowed"))]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReplyRequest {
    #[validate(length(min = 1, max = 5000, message = "Reply must be 1-5000 characters"))]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub q: Option<String>,
    pub before: Option<Snowflake>,
    pub limit: Option<i64>,
}

// ============================================================================
// Bookmark / Goal Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookmarkRequest {
    pub resource_id: Snowflake,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateGoalRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub target_date: Option<NaiveDate>,

    pub completed: Option<bool>,
}

// ============================================================================
// CMS Requests
// ============================================================================

fn default_published() -> bool {
    true
}

/// Create and full-replace body of CMS content
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContentRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 50000, message = "Content must be 1-50000 characters"))]
    pub content: String,

    pub content_type: String,

    #[validate(length(max = 50, message = "Category must be at most 50 characters"))]
    pub category: Option<String>,

    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 tags are allowed"))]
    pub tags: Vec<String>,

    #[serde(default)]
    pub featured: bool,

    #[serde(default = "default_published")]
    pub published: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentFilter {
    pub content_type: Option<String>,
    pub featured: Option<bool>,
    pub limit: Option<i64>,
}

// ============================================================================
// Chat Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        let valid: RegisterRequest = serde_json::from_str(
            r#"{"name":"Asha","email":"asha@college.edu","password":"library42","semester":5}"#,
        )
        .unwrap();
        assert!(valid.validate().is_ok());

        let mut bad = valid.clone();
        bad.email = "not-an-email".to_string();
        assert!(bad.validate().is_err());

        let mut bad = valid;
        bad.semester = Some(13);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_post_defaults() {
        let post: CreatePostRequest =
            serde_json::from_str(r#"{"title":"Deadlocks","content":"Help"}"#).unwrap();
        assert_eq!(post.category, "general");
        assert!(post.tags.is_empty());
        assert!(post.validate().is_ok());
    }

    #[test]
    fn test_too_many_tags() {
        let post = CreatePostRequest {
            title: "Deadlocks".into(),
            content: "Help".into(),
            category: "doubts".into(),
            tags: (0..6).map(|i| format!("t{i}")).collect(),
        };
        assert!(post.validate().is_err());
    }

    #[test]
    fn test_content_defaults_to_published() {
        let body: ContentRequest = serde_json::from_str(
            r#"{"title":"Exam dates","content":"Finals start May 2","content_type":"announcement"}"#,
        )
        .unwrap();
        assert!(body.published);
        assert!(!body.featured);
    }

    #[test]
    fn test_bookmark_accepts_string_id() {
        let body: CreateBookmarkRequest =
            serde_json::from_str(r#"{"resource_id":"123456789"}"#).unwrap();
        assert_eq!(body.resource_id, Snowflake::new(123_456_789));
    }
}
