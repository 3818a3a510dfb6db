//! User service
//!
//! Handles the signed-in user's profile and public profiles.

use chrono::Utc;
use edu_core::Snowflake;
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{ProfileResponse, PublicUserResponse, UpdateProfileRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::support::{clean_optional, load_actor};

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Get user by ID (public profile)
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: Snowflake) -> ServiceResult<PublicUserResponse> {
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;

        Ok(PublicUserResponse::from(&user))
    }

    /// The caller's own profile
    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: Snowflake) -> ServiceResult<ProfileResponse> {
        let user = load_actor(self.ctx, user_id).await?;
        Ok(ProfileResponse::from(&user))
    }

    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: Snowflake,
        request: UpdateProfileRequest,
    ) -> ServiceResult<ProfileResponse> {
        request.validate()?;

        let mut user = load_actor(self.ctx, user_id).await?;

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ServiceError::validation("Name cannot be blank"));
            }
            user.name = name;
        }
        if request.usn.is_some() {
            user.usn = clean_optional(request.usn);
        }
        if request.course.is_some() {
            user.course = clean_optional(request.course);
        }
        if let Some(semester) = request.semester {
            user.semester = Some(semester);
        }
        if request.bio.is_some() {
            user.bio = clean_optional(request.bio);
        }
        user.updated_at = Utc::now();

        self.ctx.user_repo().update(&user).await?;

        info!(user_id = %user_id, "Profile updated");
        Ok(ProfileResponse::from(&user))
    }
}
