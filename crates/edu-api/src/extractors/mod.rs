//! Axum extractors for request handling
//!
//! Custom extractors for authentication, validation, pagination, path ids
//! and multipart uploads.

mod auth;
mod pagination;
mod path;
mod upload;
mod validated;

pub use auth::{AuthUser, OptionalAuthUser, ACCESS_TOKEN_COOKIE};
pub use pagination::{Pagination, PaginationParams};
pub use path::IdPath;
pub use upload::{ResourceUpload, UploadLimit};
pub use validated::ValidatedJson;
