//! Forum posts and replies

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Maximum number of tags on a post
pub const MAX_POST_TAGS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumPost {
    pub id: Snowflake,
    pub author_id: Snowflake,
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

impl ForumPost {
    pub fn new(
        id: Snowflake,
        author_id: Snowflake,
        title: String,
        content: String,
        category: String,
        tags: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            author_id,
            title,
            content,
            category,
            tags: normalize_tags(tags),
            views: 0,
            reply_count: 0,
            last_activity: now,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumReply {
    pub id: Snowflake,
    pub post_id: Snowflake,
    pub author_id: Snowflake,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ForumReply {
    pub fn new(id: Snowflake, post_id: Snowflake, author_id: Snowflake, content: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            post_id,
            author_id,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Trim, lowercase and de-duplicate tags, dropping empty ones
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
