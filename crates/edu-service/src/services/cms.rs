//! CMS service
//!
//! Announcements, news, updates and info pages. Reads are public and see
//! published items only, unless the reader is an admin.

use chrono::Utc;
use edu_core::entities::{normalize_tags, CmsContent, CmsContentType};
use edu_core::traits::CmsQuery;
use edu_core::{DomainError, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{ContentFilter, ContentRequest, ContentResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::support::{clean_optional, page_limit, require_admin};

pub struct CmsService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CmsService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Featured first, then newest first
    #[instrument(skip(self, filter))]
    pub async fn list(
        &self,
        viewer_id: Option<Snowflake>,
        filter: ContentFilter,
    ) -> ServiceResult<Vec<ContentResponse>> {
        let content_type = clean_optional(filter.content_type)
            .map(|t| t.parse::<CmsContentType>())
            .transpose()?;

        let query = CmsQuery {
            content_type,
            featured: filter.featured,
            include_unpublished: self.viewer_is_admin(viewer_id).await?,
            limit: page_limit(filter.limit),
        };

        let items = self.ctx.cms_repo().list(&query).await?;
        Ok(items.into_iter().map(ContentResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, viewer_id: Option<Snowflake>, id: Snowflake) -> ServiceResult<ContentResponse> {
        let content = self
            .ctx
            .cms_repo()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::ContentNotFound(id))?;

        if !content.published && !self.viewer_is_admin(viewer_id).await? {
            return Err(DomainError::ContentNotFound(id).into());
        }
        Ok(ContentResponse::from(content))
    }

    #[instrument(skip(self, request))]
    pub async fn create(&self, user_id: Snowflake, request: ContentRequest) -> ServiceResult<ContentResponse> {
        require_admin(self.ctx, user_id).await?;
        request.validate()?;

        let mut content = CmsContent::new(
            self.ctx.generate_id(),
            user_id,
            request.title.trim().to_string(),
            request.content,
            request.content_type.parse()?,
        );
        content.description = clean_optional(request.description);
        content.category = clean_optional(request.category);
        content.tags = normalize_tags(request.tags);
        content.featured = request.featured;
        content.published = request.published;

        self.ctx.cms_repo().create(&content).await?;

        info!(content_id = %content.id, content_type = content.content_type.as_str(), "CMS content created");
        Ok(ContentResponse::from(content))
    }

    /// Full replacement of the editable fields
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        user_id: Snowflake,
        id: Snowflake,
        request: ContentRequest,
    ) -> ServiceResult<ContentResponse> {
        require_admin(self.ctx, user_id).await?;
        request.validate()?;

        let mut content = self
            .ctx
            .cms_repo()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::ContentNotFound(id))?;

        content.title = request.title.trim().to_string();
        content.description = clean_optional(request.description);
        content.content = request.content;
        content.content_type = request.content_type.parse()?;
        content.category = clean_optional(request.category);
        content.tags = normalize_tags(request.tags);
        content.featured = request.featured;
        content.published = request.published;
        content.updated_at = Utc::now();

        self.ctx.cms_repo().update(&content).await?;

        info!(content_id = %id, "CMS content updated");
        Ok(ContentResponse::from(content))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Snowflake, id: Snowflake) -> ServiceResult<()> {
        require_admin(self.ctx, user_id).await?;
        self.ctx.cms_repo().delete(id).await?;

        info!(content_id = %id, "CMS content deleted");
        Ok(())
    }

    async fn viewer_is_admin(&self, viewer_id: Option<Snowflake>) -> ServiceResult<bool> {
        let Some(viewer_id) = viewer_id else {
            return Ok(false);
        };
        let viewer = self.ctx.user_repo().find_by_id(viewer_id).await?;
        Ok(viewer.is_some_and(|u| u.is_admin()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::TestHarness;

    fn notice(title: &str, published: bool, featured: bool) -> ContentRequest {
        ContentRequest {
            title: title.to_string(),
            description: None,
            content: "The library stays open until 10pm during exams.".to_string(),
            content_type: "announcement".to_string(),
            category: Some("  ".to_string()),
            tags: vec!["Exams".to_string()],
            featured,
            published,
        }
    }

    #[tokio::test]
    async fn test_only_admins_write() {
        let h = TestHarness::new();
        let asha = h.verified_user("Asha", "asha@college.edu").await;
        let err = CmsService::new(&h.ctx)
            .create(asha, notice("Library hours", true, false))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_drafts_are_hidden_from_students() {
        let h = TestHarness::new();
        let dean = h.admin().await;
        let asha = h.verified_user("Asha", "asha@college.edu").await;
        let cms = CmsService::new(&h.ctx);

        let draft = cms.create(dean, notice("Exam timetable", false, false)).await.unwrap();
        assert_eq!(draft.category, None);
        assert_eq!(draft.tags, vec!["exams".to_string()]);
        let live = cms.create(dean, notice("Library hours", true, false)).await.unwrap();
        let pinned = cms.create(dean, notice("Fee deadline", true, true)).await.unwrap();

        let public = cms.list(None, ContentFilter::default()).await.unwrap();
        let titles: Vec<&str> = public.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Fee deadline", "Library hours"]);
        assert_eq!(cms.list(Some(asha), ContentFilter::default()).await.unwrap().len(), 2);
        assert_eq!(cms.list(Some(dean), ContentFilter::default()).await.unwrap().len(), 3);

        let draft_id = Snowflake::parse(&draft.id).unwrap();
        assert_eq!(cms.get(Some(asha), draft_id).await.unwrap_err().status_code(), 404);
        assert!(cms.get(Some(dean), draft_id).await.is_ok());
        assert!(cms.get(None, Snowflake::parse(&live.id).unwrap()).await.is_ok());

        let featured = cms
            .list(
                None,
                ContentFilter {
                    featured: Some(true),
                    ..ContentFilter::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].id, pinned.id);
    }

    #[tokio::test]
    async fn test_unknown_content_type() {
        let h = TestHarness::new();
        let dean = h.admin().await;
        let cms = CmsService::new(&h.ctx);

        let mut request = notice("Library hours", true, false);
        request.content_type = "gossip".to_string();
        assert_eq!(cms.create(dean, request).await.unwrap_err().status_code(), 400);

        let filter = ContentFilter {
            content_type: Some("gossip".to_string()),
            ..ContentFilter::default()
        };
        assert_eq!(cms.list(None, filter).await.unwrap_err().status_code(), 400);
    }

    #[tokio::test]
    async fn test_publish_draft() {
        let h = TestHarness::new();
        let dean = h.admin().await;
        let cms = CmsService::new(&h.ctx);

        let draft = cms.create(dean, notice("Exam timetable", false, false)).await.unwrap();
        let id = Snowflake::parse(&draft.id).unwrap();
        let published = cms
            .update(dean, id, notice("Exam timetable (final)", true, false))
            .await
            .unwrap();
        assert!(published.published);
        assert_eq!(cms.get(None, id).await.unwrap().title, "Exam timetable (final)");

        cms.delete(dean, id).await.unwrap();
        assert_eq!(cms.get(Some(dean), id).await.unwrap_err().status_code(), 404);
    }
}
