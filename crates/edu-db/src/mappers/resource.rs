//! Resource, download and bookmark mappers

use edu_core::entities::{Bookmark, Download, Resource, ResourceKind};
use edu_core::error::DomainError;
use edu_core::value_objects::Snowflake;

use crate::models::{BookmarkModel, DownloadModel, ResourceModel};

impl TryFrom<ResourceModel> for Resource {
    type Error = DomainError;

    fn try_from(model: ResourceModel) -> Result<Self, Self::Error> {
        Ok(Resource {
            id: Snowflake::new(model.id),
            kind: model.kind.parse::<ResourceKind>()?,
            title: model.title,
            subject: model.subject,
            branch: model.branch,
            semester: model.semester,
            year: model.year,
            description: model.description,
            file_path: model.file_path,
            file_name: model.file_name,
            content_type: model.content_type,
            file_size: model.file_size,
            uploaded_by: Snowflake::new(model.uploaded_by),
            download_count: model.download_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<DownloadModel> for Download {
    fn from(model: DownloadModel) -> Self {
        Download {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            resource_id: Snowflake::new(model.resource_id),
            downloaded_at: model.downloaded_at,
        }
    }
}

impl From<BookmarkModel> for Bookmark {
    fn from(model: BookmarkModel) -> Self {
        Bookmark {
            user_id: Snowflake::new(model.user_id),
            resource_id: Snowflake::new(model.resource_id),
            created_at: model.created_at,
        }
    }
}
