//! Resource service
//!
//! Upload, listing, download and maintenance of papers, notes and syllabus
//! documents. File bytes live in [`FileStorage`](crate::integrations::FileStorage),
//! metadata in the resource repository.

use chrono::Utc;
use edu_core::entities::{
    is_allowed_extension, sanitize_file_name, Download, Resource, ResourceKind,
};
use edu_core::traits::ResourceQuery;
use edu_core::{DomainError, Snowflake};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{
    FileDownload, PaginatedResponse, ResourceFilter, ResourceResponse, UpdateResourceRequest,
    UploadResourceRequest, UploadedFile,
};

use super::achievement::AchievementService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::support::{clean_optional, load_actor, next_cursor, page_limit};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub struct ResourceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ResourceService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Store an uploaded document. Only verified accounts may upload.
    #[instrument(skip(self, request, file), fields(file_name = %file.file_name, size = file.bytes.len()))]
    pub async fn upload(
        &self,
        user_id: Snowflake,
        kind: ResourceKind,
        request: UploadResourceRequest,
        file: UploadedFile,
    ) -> ServiceResult<ResourceResponse> {
        let user = load_actor(self.ctx, user_id).await?;
        if !user.verified {
            return Err(DomainError::EmailNotVerified.into());
        }

        request.validate()?;

        let file_name = sanitize_file_name(&file.file_name)
            .ok_or_else(|| ServiceError::validation("A file with a usable name is required"))?;
        if !is_allowed_extension(&file_name) {
            return Err(DomainError::UnsupportedFileType(file_name).into());
        }
        if file.bytes.is_empty() {
            return Err(ServiceError::validation("Uploaded file is empty"));
        }
        let max_bytes = self.ctx.settings().max_upload_bytes;
        if file.bytes.len() as u64 > max_bytes {
            return Err(DomainError::FileTooLarge { max_bytes }.into());
        }

        let stored = self.ctx.storage().save(kind, &file_name, &file.bytes).await?;

        let now = Utc::now();
        let resource = Resource {
            id: self.ctx.generate_id(),
            kind,
            title: request.title.trim().to_string(),
            subject: request.subject.trim().to_string(),
            branch: clean_optional(request.branch),
            semester: request.semester,
            year: request.year,
            description: clean_optional(request.description),
            file_path: stored.path,
            file_name,
            content_type: file
                .content_type
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            file_size: i64::try_from(stored.size).unwrap_or(i64::MAX),
            uploaded_by: user_id,
            download_count: 0,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.ctx.resource_repo().create(&resource).await {
            self.remove_file(&resource.file_path).await;
            return Err(e.into());
        }

        info!(resource_id = %resource.id, kind = kind.as_str(), "Resource uploaded");
        AchievementService::new(self.ctx)
            .evaluate_after_action(user_id)
            .await;

        Ok(ResourceResponse::from(&resource))
    }

    #[instrument(skip(self, filter))]
    pub async fn list(
        &self,
        kind: ResourceKind,
        filter: ResourceFilter,
    ) -> ServiceResult<PaginatedResponse<ResourceResponse>> {
        let limit = page_limit(filter.limit);
        let query = ResourceQuery {
            subject: clean_optional(filter.subject),
            semester: filter.semester,
            year: filter.year,
            search: clean_optional(filter.q),
            before: filter.before,
            limit,
            ..ResourceQuery::new(kind)
        };

        let resources = self.ctx.resource_repo().list(&query).await?;
        let next = next_cursor(&resources, limit, |r| r.id);

        Ok(PaginatedResponse::new(
            resources.iter().map(ResourceResponse::from).collect(),
            next,
            limit,
        ))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, kind: ResourceKind, id: Snowflake) -> ServiceResult<ResourceResponse> {
        let resource = self.find(kind, id).await?;
        Ok(ResourceResponse::from(&resource))
    }

    /// Read the file, record the download and bump the counter
    #[instrument(skip(self))]
    pub async fn download(
        &self,
        user_id: Snowflake,
        kind: ResourceKind,
        id: Snowflake,
    ) -> ServiceResult<FileDownload> {
        let resource = self.find(kind, id).await?;
        let bytes = self.ctx.storage().read(&resource.file_path).await?;

        let download = Download::new(self.ctx.generate_id(), user_id, resource.id);
        self.ctx.download_repo().record(&download).await?;
        self.ctx.resource_repo().increment_downloads(resource.id).await?;

        info!(resource_id = %resource.id, user_id = %user_id, "Resource downloaded");
        AchievementService::new(self.ctx)
            .evaluate_after_action(user_id)
            .await;

        Ok(FileDownload {
            file_name: resource.file_name,
            content_type: resource.content_type,
            bytes,
        })
    }

    /// Update metadata. Uploader or admin only.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        user_id: Snowflake,
        kind: ResourceKind,
        id: Snowflake,
        request: UpdateResourceRequest,
    ) -> ServiceResult<ResourceResponse> {
        request.validate()?;

        let mut resource = self.find(kind, id).await?;
        let actor = load_actor(self.ctx, user_id).await?;
        if !actor.can_manage(resource.uploaded_by) {
            return Err(DomainError::NotResourceOwner.into());
        }

        if let Some(title) = request.title {
            resource.title = title.trim().to_string();
        }
        if let Some(subject) = request.subject {
            resource.subject = subject.trim().to_string();
        }
        if let Some(semester) = request.semester {
            resource.semester = semester;
        }
        if request.year.is_some() {
            resource.year = request.year;
        }
        if request.branch.is_some() {
            resource.branch = clean_optional(request.branch);
        }
        if request.description.is_some() {
            resource.description = clean_optional(request.description);
        }
        resource.updated_at = Utc::now();

        self.ctx.resource_repo().update(&resource).await?;

        info!(resource_id = %id, user_id = %user_id, "Resource updated");
        Ok(ResourceResponse::from(&resource))
    }

    /// Delete the row, then the file. Uploader or admin only.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Snowflake, kind: ResourceKind, id: Snowflake) -> ServiceResult<()> {
        let resource = self.find(kind, id).await?;
        let actor = load_actor(self.ctx, user_id).await?;
        if !actor.can_manage(resource.uploaded_by) {
            warn!(resource_id = %id, user_id = %user_id, "Delete refused: not the uploader");
            return Err(DomainError::NotResourceOwner.into());
        }

        self.ctx.resource_repo().delete(id).await?;
        self.remove_file(&resource.file_path).await;

        info!(resource_id = %id, user_id = %user_id, "Resource deleted");
        Ok(())
    }

    /// A resource of another kind is reported as missing
    async fn find(&self, kind: ResourceKind, id: Snowflake) -> ServiceResult<Resource> {
        self.ctx
            .resource_repo()
            .find_by_id(id)
            .await?
            .filter(|r| r.kind == kind)
            .ok_or_else(|| DomainError::ResourceNotFound(id).into())
    }

    async fn remove_file(&self, path: &str) {
        if let Err(e) = self.ctx.storage().remove(path).await {
            warn!(path = %path, error = %e, "Failed to remove stored file");
        }
    }
}
