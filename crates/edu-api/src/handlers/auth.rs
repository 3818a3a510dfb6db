//! Authentication handlers
//!
//! Registration, email verification, login and logout, token refresh and
//! the password reset flow.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use edu_service::dto::{
    AuthResponse, ChangePasswordRequest, EmailRequest, LoginRequest, LogoutRequest,
    MessageResponse, RefreshTokenRequest, RegisterRequest, RegisterResponse,
    ResetPasswordRequest,
};
use edu_service::AuthService;

use crate::extractors::{AuthUser, ValidatedJson, ACCESS_TOKEN_COOKIE};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

fn access_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config().app.env.is_production())
        .build()
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<Created<Json<RegisterResponse>>> {
    let service = AuthService::new(state.service_context());
    let response = service.register(request).await?;
    Ok(Created(Json(response)))
}

/// GET /auth/verify-email/{token}
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let service = AuthService::new(state.service_context());
    Ok(Json(service.verify_email(&token).await?))
}

/// POST /auth/resend-verification
pub async fn resend_verification(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<EmailRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = AuthService::new(state.service_context());
    Ok(Json(service.resend_verification(request).await?))
}

/// POST /auth/login
///
/// Returns the token pair and also sets the access token cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());

    let service = AuthService::new(state.service_context());
    let response = service.login(request, user_agent).await?;

    let jar = jar.add(access_cookie(&state, response.access_token.clone()));
    Ok((jar, Json(response)))
}

/// POST /auth/refresh
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<RefreshTokenRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    let service = AuthService::new(state.service_context());
    let response = service.refresh(request).await?;

    let jar = jar.add(access_cookie(&state, response.access_token.clone()));
    Ok((jar, Json(response)))
}

/// POST /auth/logout
///
/// Revokes the given refresh token, or every session when none is sent.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
    body: Option<Json<LogoutRequest>>,
) -> ApiResult<(CookieJar, NoContent)> {
    let refresh_token = body.and_then(|Json(b)| b.refresh_token);

    let service = AuthService::new(state.service_context());
    service.logout(auth.user_id, refresh_token.as_deref()).await?;

    let jar = jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"));
    Ok((jar, NoContent))
}

/// POST /auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<EmailRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = AuthService::new(state.service_context());
    Ok(Json(service.forgot_password(request).await?))
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = AuthService::new(state.service_context());
    Ok(Json(service.reset_password(request).await?))
}

/// POST /auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = AuthService::new(state.service_context());
    Ok(Json(service.change_password(auth.user_id, request).await?))
}
