//! CMS content database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct CmsContentModel {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub content_type: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub published: bool,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
