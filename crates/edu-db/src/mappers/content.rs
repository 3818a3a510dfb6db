//! Goal, CMS, chat and stats mappers

use edu_core::entities::{ChatMessage, ChatRole, CmsContent, CmsContentType, LearningGoal};
use edu_core::error::DomainError;
use edu_core::traits::PlatformCounts;
use edu_core::value_objects::Snowflake;

use crate::models::{ChatMessageModel, CmsContentModel, LearningGoalModel, PlatformCountsModel};

impl From<LearningGoalModel> for LearningGoal {
    fn from(model: LearningGoalModel) -> Self {
        LearningGoal {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            title: model.title,
            description: model.description,
            target_date: model.target_date,
            completed: model.completed,
            completed_at: model.completed_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl TryFrom<CmsContentModel> for CmsContent {
    type Error = DomainError;

    fn try_from(model: CmsContentModel) -> Result<Self, Self::Error> {
        Ok(CmsContent {
            id: Snowflake::new(model.id),
            title: model.title,
            description: model.description,
            content: model.content,
            content_type: model
                .content_type
                .parse::<CmsContentType>()
                .map_err(|e| DomainError::InternalError(e.to_string()))?,
            category: model.category,
            tags: model.tags,
            featured: model.featured,
            published: model.published,
            author_id: Snowflake::new(model.author_id),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl TryFrom<ChatMessageModel> for ChatMessage {
    type Error = DomainError;

    fn try_from(model: ChatMessageModel) -> Result<Self, Self::Error> {
        Ok(ChatMessage {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            role: model.role.parse::<ChatRole>()?,
            content: model.content,
            created_at: model.created_at,
        })
    }
}

impl From<PlatformCountsModel> for PlatformCounts {
    fn from(model: PlatformCountsModel) -> Self {
        PlatformCounts {
            total_users: model.total_users,
            total_admins: model.total_admins,
            verified_users: model.verified_users,
            papers: model.papers,
            notes: model.notes,
            syllabus: model.syllabus,
            downloads: model.downloads,
            forum_posts: model.forum_posts,
        }
    }
}
