//! Authentication extractor
//!
//! Reads the access token from the `Authorization: Bearer` header, falling
//! back to the `access_token` cookie set at login.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use edu_core::Snowflake;
use tracing::{debug, warn};

use crate::response::ApiError;
use crate::state::AppState;

/// Name of the HTTP-only cookie carrying the access token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authenticated user extracted from JWT token
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Snowflake,
}

impl AuthUser {
    pub fn new(user_id: Snowflake) -> Self {
        Self { user_id }
    }
}

async fn bearer_or_cookie<S>(parts: &mut Parts, state: &S) -> Option<String>
where
    S: Send + Sync,
{
    if let Ok(TypedHeader(Authorization(bearer))) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await
    {
        return Some(bearer.token().to_string());
    }

    let jar = CookieJar::from_headers(&parts.headers);
    jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string())
}

fn user_from_token(state: &AppState, token: &str) -> Result<Snowflake, ApiError> {
    let claims = state
        .jwt_service()
        .validate_access_token(token)
        .map_err(|e| {
            warn!(error = %e, "Invalid access token");
            ApiError::InvalidToken
        })?;

    claims.user_id().map_err(|e| {
        warn!(error = %e, "Invalid user ID in token");
        ApiError::InvalidToken
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_or_cookie(parts, state)
            .await
            .ok_or(ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);
        Ok(AuthUser::new(user_from_token(&app_state, &token)?))
    }
}

/// Optional authenticated user
///
/// Public endpoints use this to tailor the response (view counting, CMS
/// drafts). A missing or stale token reads as anonymous.
#[derive(Debug, Clone, Copy)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl OptionalAuthUser {
    pub fn user_id(&self) -> Option<Snowflake> {
        self.0.map(|u| u.user_id)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_or_cookie(parts, state).await else {
            return Ok(OptionalAuthUser(None));
        };

        let app_state = AppState::from_ref(state);
        match user_from_token(&app_state, &token) {
            Ok(user_id) => Ok(OptionalAuthUser(Some(AuthUser::new(user_id)))),
            Err(_) => {
                debug!("Ignoring invalid token on public endpoint");
                Ok(OptionalAuthUser(None))
            }
        }
    }
}
