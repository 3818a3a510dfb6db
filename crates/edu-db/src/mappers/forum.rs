//! Forum mappers

use edu_core::entities::{ForumPost, ForumReply};
use edu_core::value_objects::Snowflake;

use crate::models::{ForumPostModel, ForumReplyModel};

impl From<ForumPostModel> for ForumPost {
    fn from(model: ForumPostModel) -> Self {
        ForumPost {
            id: Snowflake::new(model.id),
            author_id: Snowflake::new(model.author_id),
            title: model.title,
            content: model.content,
            category: model.category,
            tags: model.tags,
            views: model.views,
            reply_count: model.reply_count,
            last_activity: model.last_activity,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<ForumReplyModel> for ForumReply {
    fn from(model: ForumReplyModel) -> Self {
        ForumReply {
            id: Snowflake::new(model.id),
            post_id: Snowflake::new(model.post_id),
            author_id: Snowflake::new(model.author_id),
            content: model.content,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
