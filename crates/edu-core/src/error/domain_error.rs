//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Resource not found: {0}")]
    ResourceNotFound(Snowflake),

    #[error("Forum post not found: {0}")]
    PostNotFound(Snowflake),

    #[error("Forum reply not found: {0}")]
    ReplyNotFound(Snowflake),

    #[error("Learning goal not found: {0}")]
    GoalNotFound(Snowflake),

    #[error("Content not found: {0}")]
    ContentNotFound(Snowflake),

    #[error("Bookmark not found")]
    BookmarkNotFound,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("File too large: max {max_bytes} bytes")]
    FileTooLarge { max_bytes: u64 },

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid resource kind: {0}")]
    InvalidResourceKind(String),

    #[error("Email already in use")]
    EmailAlreadyExists,

    // =========================================================================
    // Token Lifecycle Errors
    // =========================================================================
    #[error("Invalid or unknown token")]
    InvalidVerificationToken,

    #[error("Token has expired")]
    VerificationTokenExpired,

    #[error("Token has already been used")]
    VerificationTokenUsed,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Administrator role required")]
    AdminRequired,

    #[error("Not the owner of this resource")]
    NotResourceOwner,

    #[error("Not the author of this post")]
    NotPostAuthor,

    #[error("Email address has not been verified")]
    EmailNotVerified,

    #[error("Administrators cannot change or delete their own account here")]
    CannotModifySelf,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Resource already bookmarked")]
    BookmarkAlreadyExists,

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Please wait {retry_after_secs}s before requesting another email")]
    ResendTooSoon { retry_after_secs: i64 },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::ResourceNotFound(_) => "UNKNOWN_RESOURCE",
            Self::PostNotFound(_) => "UNKNOWN_POST",
            Self::ReplyNotFound(_) => "UNKNOWN_REPLY",
            Self::GoalNotFound(_) => "UNKNOWN_GOAL",
            Self::ContentNotFound(_) => "UNKNOWN_CONTENT",
            Self::BookmarkNotFound => "UNKNOWN_BOOKMARK",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::UnsupportedFileType(_) => "UNSUPPORTED_FILE_TYPE",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::InvalidRole(_) => "INVALID_ROLE",
            Self::InvalidResourceKind(_) => "INVALID_RESOURCE_KIND",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",

            // Tokens
            Self::InvalidVerificationToken => "INVALID_VERIFICATION_TOKEN",
            Self::VerificationTokenExpired => "VERIFICATION_TOKEN_EXPIRED",
            Self::VerificationTokenUsed => "VERIFICATION_TOKEN_USED",

            // Authorization
            Self::AdminRequired => "ADMIN_REQUIRED",
            Self::NotResourceOwner => "NOT_RESOURCE_OWNER",
            Self::NotPostAuthor => "NOT_POST_AUTHOR",
            Self::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            Self::CannotModifySelf => "CANNOT_MODIFY_SELF",

            // Conflict
            Self::BookmarkAlreadyExists => "BOOKMARK_ALREADY_EXISTS",

            // Business Rules
            Self::ResendTooSoon { .. } => "RATE_LIMIT_EXCEEDED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::ResourceNotFound(_)
                | Self::PostNotFound(_)
                | Self::ReplyNotFound(_)
                | Self::GoalNotFound(_)
                | Self::ContentNotFound(_)
                | Self::BookmarkNotFound
        )
    }

    /// Check if this is a validation error.
    ///
    /// Duplicate emails and token lifecycle failures are reported as bad
    /// requests, so they are grouped here.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidEmail
                | Self::WeakPassword(_)
                | Self::ContentTooLong { .. }
                | Self::UnsupportedFileType(_)
                | Self::InvalidRole(_)
                | Self::InvalidResourceKind(_)
                | Self::EmailAlreadyExists
        ) || self.is_token_error()
    }

    /// Check if this is a token lifecycle error
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidVerificationToken
                | Self::VerificationTokenExpired
                | Self::VerificationTokenUsed
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::AdminRequired
                | Self::NotResourceOwner
                | Self::NotPostAuthor
                | Self::EmailNotVerified
                | Self::CannotModifySelf
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::BookmarkAlreadyExists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DomainError::UserNotFound(Snowflake::new(1)).code(), "UNKNOWN_USER");
        assert_eq!(
            DomainError::VerificationTokenExpired.code(),
            "VERIFICATION_TOKEN_EXPIRED"
        );
        assert_eq!(
            DomainError::ResendTooSoon { retry_after_secs: 5 }.code(),
            "RATE_LIMIT_EXCEEDED"
        );
    }

    #[test]
    fn test_duplicate_email_is_validation() {
        let err = DomainError::EmailAlreadyExists;
        assert!(err.is_validation());
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_token_errors_are_validation() {
        assert!(DomainError::InvalidVerificationToken.is_validation());
        assert!(DomainError::VerificationTokenUsed.is_token_error());
        assert!(!DomainError::EmailNotVerified.is_token_error());
    }

    #[test]
    fn test_classification() {
        assert!(DomainError::ResourceNotFound(Snowflake::new(1)).is_not_found());
        assert!(DomainError::NotResourceOwner.is_authorization());
        assert!(DomainError::BookmarkAlreadyExists.is_conflict());
        assert!(!DomainError::BookmarkAlreadyExists.is_not_found());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            DomainError::PostNotFound(Snowflake::new(123)).to_string(),
            "Forum post not found: 123"
        );
        assert_eq!(
            DomainError::FileTooLarge { max_bytes: 1024 }.to_string(),
            "File too large: max 1024 bytes"
        );
    }
}
