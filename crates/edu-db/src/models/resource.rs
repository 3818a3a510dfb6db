//! Resource, download and bookmark database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ResourceModel {
    pub id: i64,
    pub kind: String,
    pub title: String,
    pub subject: String,
    pub branch: Option<String>,
    pub semester: i32,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub file_path: String,
    pub file_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub uploaded_by: i64,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DownloadModel {
    pub id: i64,
    pub user_id: i64,
    pub resource_id: i64,
    pub downloaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct BookmarkModel {
    pub user_id: i64,
    pub resource_id: i64,
    pub created_at: DateTime<Utc>,
}
