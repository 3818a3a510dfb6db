//! Bookmark and download history service

use std::collections::HashMap;

use edu_core::entities::{Bookmark, Resource};
use edu_core::{DomainError, Snowflake};
use tracing::{info, instrument};

use crate::dto::{BookmarkResponse, CreateBookmarkRequest, DownloadResponse, ResourceResponse};

use super::achievement::AchievementService;
use super::context::ServiceContext;
use super::error::ServiceResult;
use super::support::page_limit;

pub struct BookmarkService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BookmarkService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        user_id: Snowflake,
        request: CreateBookmarkRequest,
    ) -> ServiceResult<BookmarkResponse> {
        let resource = self
            .ctx
            .resource_repo()
            .find_by_id(request.resource_id)
            .await?
            .ok_or(DomainError::ResourceNotFound(request.resource_id))?;

        let bookmark = Bookmark::new(user_id, resource.id);
        self.ctx.bookmark_repo().create(&bookmark).await?;

        info!(user_id = %user_id, resource_id = %resource.id, "Bookmark added");
        AchievementService::new(self.ctx)
            .evaluate_after_action(user_id)
            .await;

        Ok(BookmarkResponse {
            resource: ResourceResponse::from(&resource),
            created_at: bookmark.created_at,
        })
    }

    /// Own bookmarks, newest first; bookmarks of deleted resources are skipped
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Snowflake) -> ServiceResult<Vec<BookmarkResponse>> {
        let bookmarks = self.ctx.bookmark_repo().list_by_user(user_id).await?;
        let ids: Vec<Snowflake> = bookmarks.iter().map(|b| b.resource_id).collect();
        let resources = self.resources_by_id(&ids).await?;

        Ok(bookmarks
            .into_iter()
            .filter_map(|b| {
                resources.get(&b.resource_id).map(|r| BookmarkResponse {
                    resource: ResourceResponse::from(r),
                    created_at: b.created_at,
                })
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Snowflake, resource_id: Snowflake) -> ServiceResult<()> {
        if !self.ctx.bookmark_repo().delete(user_id, resource_id).await? {
            return Err(DomainError::BookmarkNotFound.into());
        }

        info!(user_id = %user_id, resource_id = %resource_id, "Bookmark removed");
        Ok(())
    }

    /// Own download history, newest first
    #[instrument(skip(self))]
    pub async fn downloads(
        &self,
        user_id: Snowflake,
        limit: Option<i64>,
    ) -> ServiceResult<Vec<DownloadResponse>> {
        let downloads = self
            .ctx
            .download_repo()
            .list_by_user(user_id, page_limit(limit))
            .await?;
        let ids: Vec<Snowflake> = downloads.iter().map(|d| d.resource_id).collect();
        let resources = self.resources_by_id(&ids).await?;

        Ok(downloads
            .into_iter()
            .map(|d| DownloadResponse {
                id: d.id.to_string(),
                resource: resources.get(&d.resource_id).map(ResourceResponse::from),
                downloaded_at: d.downloaded_at,
            })
            .collect())
    }

    async fn resources_by_id(&self, ids: &[Snowflake]) -> ServiceResult<HashMap<Snowflake, Resource>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self
            .ctx
            .resource_repo()
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect())
    }
}
