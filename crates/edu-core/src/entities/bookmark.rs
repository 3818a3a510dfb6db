//! Bookmarks and download history

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// A resource saved by a user; one per (user, resource)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub user_id: Snowflake,
    pub resource_id: Snowflake,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(user_id: Snowflake, resource_id: Snowflake) -> Self {
        Self {
            user_id,
            resource_id,
            created_at: Utc::now(),
        }
    }
}

/// One download of a resource by an authenticated user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub resource_id: Snowflake,
    pub downloaded_at: DateTime<Utc>,
}

impl Download {
    pub fn new(id: Snowflake, user_id: Snowflake, resource_id: Snowflake) -> Self {
        Self {
            id,
            user_id,
            resource_id,
            downloaded_at: Utc::now(),
        }
    }
}
