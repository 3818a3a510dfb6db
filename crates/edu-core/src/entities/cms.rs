//! CMS content - announcements, news, updates and info pages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CmsContentType {
    Announcement,
    News,
    Update,
    Info,
}

impl CmsContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Announcement => "announcement",
            Self::News => "news",
            Self::Update => "update",
            Self::Info => "info",
        }
    }
}

impl std::str::FromStr for CmsContentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "announcement" => Ok(Self::Announcement),
            "news" => Ok(Self::News),
            "update" => Ok(Self::Update),
            "info" => Ok(Self::Info),
            other => Err(DomainError::ValidationError(format!(
                "unknown content type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmsContent {
    pub id: Snowflake,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub content_type: CmsContentType,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub published: bool,
    pub author_id: Snowflake,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CmsContent {
    pub fn new(
        id: Snowflake,
        author_id: Snowflake,
        title: String,
        content: String,
        content_type: CmsContentType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            description: None,
            content,
            content_type,
            category: None,
            tags: Vec::new(),
            featured: false,
            published: true,
            author_id,
            created_at: now,
            updated_at: now,
        }
    }
}
