//! Resource entity - an uploaded paper, note or syllabus file

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// File extensions accepted for upload (lowercase, without the dot)
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "ppt", "pptx", "txt", "md", "png", "jpg", "jpeg",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Paper,
    Note,
    Syllabus,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [Self::Paper, Self::Note, Self::Syllabus];

    /// Value stored in the `kind` column
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paper => "paper",
            Self::Note => "note",
            Self::Syllabus => "syllabus",
        }
    }

    /// Path segment under `/api` and directory under the upload root
    pub fn collection(self) -> &'static str {
        match self {
            Self::Paper => "papers",
            Self::Note => "notes",
            Self::Syllabus => "syllabus",
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DomainError::InvalidResourceKind(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: Snowflake,
    pub kind: ResourceKind,
    pub title: String,
    pub subject: String,
    pub branch: Option<String>,
    pub semester: i32,
    pub year: Option<i32>,
    pub description: Option<String>,
    /// Path relative to the upload root
    pub file_path: String,
    /// Sanitized original file name, used for Content-Disposition
    pub file_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub uploaded_by: Snowflake,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lowercased extension of a file name, if any
fn extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn is_allowed_extension(file_name: &str) -> bool {
    extension(file_name).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Longest sanitized file name kept, extension included
pub const MAX_FILE_NAME_LEN: usize = 100;

/// Strip directories and anything outside `[A-Za-z0-9._-]` from a client supplied name.
///
/// Long names are cut to [`MAX_FILE_NAME_LEN`] keeping the extension.
/// Returns `None` when nothing usable is left.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_' || c == '.') {
        return None;
    }
    Some(truncate_file_name(cleaned))
}

/// Input is ASCII, so byte offsets are char boundaries
fn truncate_file_name(name: String) -> String {
    if name.len() <= MAX_FILE_NAME_LEN {
        return name;
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() < MAX_FILE_NAME_LEN / 2 => {
            let keep = MAX_FILE_NAME_LEN - ext.len() - 1;
            format!("{}.{ext}", &stem[..keep.min(stem.len())])
        }
        _ => name[..MAX_FILE_NAME_LEN].to_string(),
    }
}
