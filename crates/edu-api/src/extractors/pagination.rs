//! Pagination extractor
//!
//! Parses the `before` cursor and `limit` from the query string. Clamping
//! the limit is left to the services.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use edu_core::Snowflake;
use edu_service::dto::PageQuery;
use serde::Deserialize;

use crate::response::ApiError;

/// Raw pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Parsed pagination parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct Pagination {
    /// Return items older than this id
    pub before: Option<Snowflake>,
    pub limit: Option<i64>,
}

impl TryFrom<PaginationParams> for Pagination {
    type Error = ApiError;

    fn try_from(params: PaginationParams) -> Result<Self, Self::Error> {
        let before = params
            .before
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<Snowflake>()
                    .map_err(|_| ApiError::invalid_query("Invalid 'before' cursor format"))
            })
            .transpose()?;

        Ok(Pagination {
            before,
            limit: params.limit,
        })
    }
}

impl From<Pagination> for PageQuery {
    fn from(p: Pagination) -> Self {
        PageQuery {
            before: p.before,
            limit: p.limit,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;

        Pagination::try_from(params)
    }
}
