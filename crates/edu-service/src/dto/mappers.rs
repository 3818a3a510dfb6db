//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use chrono::Utc;
use edu_core::entities::{ChatMessage, CmsContent, LearningGoal, Resource, User};
use edu_core::traits::PlatformCounts;

use super::responses::{
    AuthorSummary, ChatMessageResponse, ContentResponse, GoalResponse, ProfileResponse,
    PublicUserResponse, ResourceResponse, StatsResponse,
};

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            verified: user.verified,
            usn: user.usn.clone(),
            course: user.course.clone(),
            semester: user.semester,
            bio: user.bio.clone(),
            created_at: user.created_at,
        }
    }
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

impl From<&User> for PublicUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            role: user.role.as_str().to_string(),
            course: user.course.clone(),
            semester: user.semester,
            bio: user.bio.clone(),
            created_at: user.created_at,
        }
    }
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
        }
    }
}

// ============================================================================
// Resource Mappers
// ============================================================================

impl From<&Resource> for ResourceResponse {
    fn from(resource: &Resource) -> Self {
        Self {
            id: resource.id.to_string(),
            kind: resource.kind.as_str().to_string(),
            title: resource.title.clone(),
            subject: resource.subject.clone(),
            branch: resource.branch.clone(),
            semester: resource.semester,
            year: resource.year,
            description: resource.description.clone(),
            file_name: resource.file_name.clone(),
            content_type: resource.content_type.clone(),
            file_size: resource.file_size,
            uploaded_by: resource.uploaded_by.to_string(),
            download_count: resource.download_count,
            created_at: resource.created_at,
            updated_at: resource.updated_at,
        }
    }
}

impl From<Resource> for ResourceResponse {
    fn from(resource: Resource) -> Self {
        Self::from(&resource)
    }
}

// ============================================================================
// Goal / CMS / Chat Mappers
// ============================================================================

impl From<LearningGoal> for GoalResponse {
    fn from(goal: LearningGoal) -> Self {
        let overdue = goal.is_overdue(Utc::now().date_naive());
        Self {
            id: goal.id.to_string(),
            title: goal.title,
            description: goal.description,
            target_date: goal.target_date,
            completed: goal.completed,
            completed_at: goal.completed_at,
            overdue,
            created_at: goal.created_at,
            updated_at: goal.updated_at,
        }
    }
}

impl From<CmsContent> for ContentResponse {
    fn from(content: CmsContent) -> Self {
        Self {
            id: content.id.to_string(),
            title: content.title,
            description: content.description,
            content: content.content,
            content_type: content.content_type.as_str().to_string(),
            category: content.category,
            tags: content.tags,
            featured: content.featured,
            published: content.published,
            author_id: content.author_id.to_string(),
            created_at: content.created_at,
            updated_at: content.updated_at,
        }
    }
}

impl From<ChatMessage> for ChatMessageResponse {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id.to_string(),
            role: message.role.as_str().to_string(),
            content: message.content,
            created_at: message.created_at,
        }
    }
}

impl From<PlatformCounts> for StatsResponse {
    fn from(counts: PlatformCounts) -> Self {
        Self {
            total_users: counts.total_users,
            total_resources: counts.total_resources(),
            papers: counts.papers,
            notes: counts.notes,
            syllabus: counts.syllabus,
            downloads: counts.downloads,
            forum_posts: counts.forum_posts,
        }
    }
}
