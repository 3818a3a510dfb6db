//! Multipart extractor for resource uploads
//!
//! Collects the `file` part plus the metadata text fields into the service
//! DTOs. Unknown parts are skipped.

use axum::{
    async_trait,
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::StatusCode,
};
use edu_core::DomainError;
use edu_service::dto::{UploadResourceRequest, UploadedFile};

use crate::response::ApiError;

/// Largest accepted file, carried as a request extension for error reporting
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub u64);

/// A parsed upload form
#[derive(Debug)]
pub struct ResourceUpload {
    pub metadata: UploadResourceRequest,
    pub file: UploadedFile,
}

#[derive(Default)]
struct Form {
    title: Option<String>,
    subject: Option<String>,
    semester: Option<String>,
    year: Option<String>,
    branch: Option<String>,
    description: Option<String>,
    file: Option<UploadedFile>,
}

fn parse_number(field: &str, value: Option<String>) -> Result<Option<i32>, ApiError> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| ApiError::invalid_body(format!("'{field}' must be a number"))),
    }
}

/// A body cut off by the size limit is a too-large file, not a malformed form
fn multipart_error(err: &MultipartError, max_bytes: u64) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        DomainError::FileTooLarge { max_bytes }.into()
    } else {
        ApiError::invalid_body(err.body_text())
    }
}

impl Form {
    fn finish(self) -> Result<ResourceUpload, ApiError> {
        let file = self
            .file
            .ok_or_else(|| ApiError::invalid_body("Missing 'file' part"))?;
        let semester = parse_number("semester", self.semester)?
            .ok_or_else(|| ApiError::invalid_body("Missing 'semester' field"))?;

        Ok(ResourceUpload {
            metadata: UploadResourceRequest {
                title: self.title.unwrap_or_default(),
                subject: self.subject.unwrap_or_default(),
                semester,
                year: parse_number("year", self.year)?,
                branch: self.branch,
                description: self.description,
            },
            file,
        })
    }
}

#[async_trait]
impl<S> FromRequest<S> for ResourceUpload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let max_bytes = req
            .extensions()
            .get::<UploadLimit>()
            .map_or(0, |limit| limit.0);
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::invalid_body(e.body_text()))?;

        let mut form = Form::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(&e, max_bytes))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(&e, max_bytes))?;
                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
                continue;
            }

            let slot = match name.as_str() {
                "title" => &mut form.title,
                "subject" => &mut form.subject,
                "semester" => &mut form.semester,
                "year" => &mut form.year,
                "branch" => &mut form.branch,
                "description" => &mut form.description,
                _ => continue,
            };
            *slot = Some(
                field
                    .text()
                    .await
                    .map_err(|e| multipart_error(&e, max_bytes))?,
            );
        }

        form.finish()
    }
}
