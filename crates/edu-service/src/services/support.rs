//! Small helpers shared by the services

use edu_core::entities::User;
use edu_core::{DomainError, Snowflake};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`
pub fn page_limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Cursor for the next page: the id of the last row of a full page
pub fn next_cursor<T>(rows: &[T], limit: i64, id: impl Fn(&T) -> Snowflake) -> Option<String> {
    if i64::try_from(rows.len()).unwrap_or(i64::MAX) < limit {
        return None;
    }
    rows.last().map(|row| id(row).to_string())
}

/// Load the acting user, failing when the account no longer exists
pub async fn load_actor(ctx: &ServiceContext, user_id: Snowflake) -> ServiceResult<User> {
    ctx.user_repo()
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))
}

/// Re-read the role from the database and require admin
pub async fn require_admin(ctx: &ServiceContext, user_id: Snowflake) -> ServiceResult<User> {
    let user = load_actor(ctx, user_id).await?;
    if !user.is_admin() {
        return Err(DomainError::AdminRequired.into());
    }
    Ok(user)
}

/// Trim optional free text, mapping blank input to `None`
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
