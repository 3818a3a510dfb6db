//! Authentication service
//!
//! Handles registration, email verification, login, token refresh, logout
//! and the password reset flow.

use chrono::Utc;
use edu_cache::RefreshSession;
use edu_common::auth::{hash_password, validate_password_strength, verify_password};
use edu_common::AppError;
use edu_core::entities::{normalize_email, TokenPurpose, User, UserRole, VerificationToken};
use edu_core::{DomainError, Snowflake};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{
    AuthResponse, ChangePasswordRequest, EmailRequest, LoginRequest, MessageResponse,
    ProfileResponse, RefreshTokenRequest, RegisterRequest, RegisterResponse,
    ResetPasswordRequest,
};
use crate::integrations::{reset_email, verification_email, EmailMessage};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account exists for that email, a password reset link has been sent";

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new, unverified account and send the verification email
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<RegisterResponse> {
        request.validate()?;
        validate_password_strength(&request.password)?;

        let email = normalize_email(&request.email);
        if self.ctx.user_repo().email_exists(&email).await? {
            return Err(DomainError::EmailAlreadyExists.into());
        }

        let password_hash = hash_password(&request.password)?;

        let mut user = User::new(self.ctx.generate_id(), request.name.trim().to_string(), email);
        user.usn = request.usn;
        user.course = request.course;
        user.semester = request.semester;
        if self.ctx.settings().admin.is_admin_email(&user.email) {
            user.set_role(UserRole::Admin);
        }

        self.ctx.user_repo().create(&user, &password_hash).await?;
        info!(user_id = %user.id, role = %user.role, "User registered");

        let token = self
            .issue_token(&user, TokenPurpose::EmailVerification)
            .await?;
        self.deliver(verification_email(
            &self.ctx.settings().frontend_url,
            &user.email,
            &token.token,
            self.ctx.settings().tokens.verification_ttl_minutes,
        ))
        .await;

        Ok(RegisterResponse {
            message: "Registration successful. Please check your email to verify your account."
                .to_string(),
            user_id: user.id.to_string(),
        })
    }

    /// Consume an email verification token and mark its user verified
    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, token: &str) -> ServiceResult<MessageResponse> {
        let record = self
            .consume_token(token, TokenPurpose::EmailVerification)
            .await?;
        self.ctx.user_repo().mark_verified(record.user_id).await?;

        info!(user_id = %record.user_id, "Email verified");
        Ok(MessageResponse::new("Email verified successfully. You can now log in."))
    }

    /// Send a fresh verification email
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn resend_verification(&self, request: EmailRequest) -> ServiceResult<MessageResponse> {
        request.validate()?;

        let email = normalize_email(&request.email);
        let user = self
            .ctx
            .user_repo()
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", email.clone()))?;

        if user.verified {
            return Ok(MessageResponse::new("Email is already verified"));
        }

        let token = self
            .issue_token(&user, TokenPurpose::EmailVerification)
            .await?;
        self.deliver(verification_email(
            &self.ctx.settings().frontend_url,
            &user.email,
            &token.token,
            self.ctx.settings().tokens.verification_ttl_minutes,
        ))
        .await;

        Ok(MessageResponse::new("Verification email sent"))
    }

    /// Login with email and password
    #[instrument(skip(self, request, user_agent), fields(email = %request.email))]
    pub async fn login(
        &self,
        request: LoginRequest,
        user_agent: Option<&str>,
    ) -> ServiceResult<AuthResponse> {
        request.validate()?;

        let user = self
            .ctx
            .user_repo()
            .find_by_email(&normalize_email(&request.email))
            .await?
            .ok_or_else(|| {
                warn!("Login failed: unknown email");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        let password_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .ok_or(ServiceError::App(AppError::InvalidCredentials))?;

        if !verify_password(&request.password, &password_hash)? {
            warn!(user_id = %user.id, "Login failed: invalid password");
            return Err(ServiceError::App(AppError::InvalidCredentials));
        }

        if !user.verified {
            warn!(user_id = %user.id, "Login refused: email not verified");
            return Err(DomainError::EmailNotVerified.into());
        }

        info!(user_id = %user.id, "User logged in");
        self.start_session(&user, user_agent).await
    }

    /// Rotate a refresh token: the presented session is revoked and a new pair issued
    #[instrument(skip(self, request))]
    pub async fn refresh(&self, request: RefreshTokenRequest) -> ServiceResult<AuthResponse> {
        let claims = self
            .ctx
            .jwt_service()
            .validate_refresh_token(&request.refresh_token)?;
        let user_id = claims.user_id()?;

        let session = self
            .ctx
            .session_store()
            .get(&claims.jti)
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or(ServiceError::App(AppError::InvalidToken))?;

        if !self.ctx.session_store().revoke(&claims.jti).await? {
            // Revoked concurrently by another refresh
            return Err(ServiceError::App(AppError::InvalidToken));
        }

        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::App(AppError::InvalidToken))?;

        info!(user_id = %user.id, "Tokens refreshed");
        self.start_session(&user, session.user_agent.as_deref()).await
    }

    /// Revoke the given refresh token, or every session of the user
    #[instrument(skip(self, refresh_token))]
    pub async fn logout(&self, user_id: Snowflake, refresh_token: Option<&str>) -> ServiceResult<()> {
        match refresh_token {
            Some(token) => {
                let claims = self.ctx.jwt_service().validate_refresh_token(token)?;
                if claims.user_id()? != user_id {
                    return Err(ServiceError::App(AppError::InvalidToken));
                }
                self.ctx.session_store().revoke(&claims.jti).await?;
            }
            None => {
                let revoked = self.ctx.session_store().revoke_all_for_user(user_id).await?;
                info!(user_id = %user_id, revoked, "Revoked all sessions");
            }
        }

        info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Issue a password reset token. Unknown emails get the same answer.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn forgot_password(&self, request: EmailRequest) -> ServiceResult<MessageResponse> {
        request.validate()?;

        let email = normalize_email(&request.email);
        let Some(user) = self.ctx.user_repo().find_by_email(&email).await? else {
            info!("Password reset requested for unknown email");
            return Ok(MessageResponse::new(FORGOT_PASSWORD_MESSAGE));
        };

        match self.issue_token(&user, TokenPurpose::PasswordReset).await {
            Ok(token) => {
                self.deliver(reset_email(
                    &self.ctx.settings().frontend_url,
                    &user.email,
                    &token.token,
                    self.ctx.settings().tokens.reset_ttl_minutes,
                ))
                .await;
            }
            Err(ServiceError::Domain(DomainError::ResendTooSoon { retry_after_secs })) => {
                info!(user_id = %user.id, retry_after_secs, "Password reset throttled");
            }
            Err(e) => return Err(e),
        }

        Ok(MessageResponse::new(FORGOT_PASSWORD_MESSAGE))
    }

    /// Consume a reset token, store the new password and end every session
    #[instrument(skip(self, request))]
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> ServiceResult<MessageResponse> {
        request.validate()?;
        validate_password_strength(&request.new_password)?;

        let record = self
            .consume_token(&request.token, TokenPurpose::PasswordReset)
            .await?;

        let password_hash = hash_password(&request.new_password)?;
        self.ctx
            .user_repo()
            .update_password(record.user_id, &password_hash)
            .await?;
        let revoked = self
            .ctx
            .session_store()
            .revoke_all_for_user(record.user_id)
            .await?;

        info!(user_id = %record.user_id, revoked, "Password reset");
        Ok(MessageResponse::new("Password has been reset. Please log in."))
    }

    #[instrument(skip(self, request))]
    pub async fn change_password(
        &self,
        user_id: Snowflake,
        request: ChangePasswordRequest,
    ) -> ServiceResult<MessageResponse> {
        request.validate()?;

        let current_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;

        if !verify_password(&request.current_password, &current_hash)? {
            warn!(user_id = %user_id, "Password change refused: wrong current password");
            return Err(ServiceError::App(AppError::InvalidCredentials));
        }
        validate_password_strength(&request.new_password)?;

        let password_hash = hash_password(&request.new_password)?;
        self.ctx
            .user_repo()
            .update_password(user_id, &password_hash)
            .await?;

        info!(user_id = %user_id, "Password changed");
        Ok(MessageResponse::new("Password changed successfully"))
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    async fn start_session(&self, user: &User, user_agent: Option<&str>) -> ServiceResult<AuthResponse> {
        let jwt = self.ctx.jwt_service();
        let pair = jwt.generate_token_pair(user.id)?;
        let jti = jwt.validate_refresh_token(&pair.refresh_token)?.jti;

        let mut session = RefreshSession::new(user.id);
        if let Some(agent) = user_agent {
            session = session.with_user_agent(agent);
        }
        self.ctx.session_store().store(&jti, &session).await?;

        Ok(AuthResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type,
            expires_in: pair.expires_in,
            user: ProfileResponse::from(user),
        })
    }

    /// Issue a new token after enforcing the resend cooldown
    async fn issue_token(&self, user: &User, purpose: TokenPurpose) -> ServiceResult<VerificationToken> {
        let settings = self.ctx.settings();

        if let Some(previous) = self.ctx.token_repo().latest_for_user(user.id, purpose).await? {
            if let Some(retry_after_secs) =
                previous.cooldown_remaining(settings.resend_cooldown(), Utc::now())
            {
                warn!(user_id = %user.id, purpose = purpose.as_str(), "Token requested during cooldown");
                return Err(DomainError::ResendTooSoon { retry_after_secs }.into());
            }
        }

        let ttl = match purpose {
            TokenPurpose::EmailVerification => settings.verification_ttl(),
            TokenPurpose::PasswordReset => settings.reset_ttl(),
        };
        let token = VerificationToken::issue(user.id, purpose, ttl);
        self.ctx.token_repo().create(&token).await?;

        Ok(token)
    }

    /// Look up, check and atomically consume a token
    async fn consume_token(&self, token: &str, purpose: TokenPurpose) -> ServiceResult<VerificationToken> {
        let record = self
            .ctx
            .token_repo()
            .find(token)
            .await?
            .ok_or(DomainError::InvalidVerificationToken)?;
        record.ensure_usable(purpose)?;

        if !self.ctx.token_repo().consume(token).await? {
            return Err(DomainError::VerificationTokenUsed.into());
        }
        Ok(record)
    }

    /// Email delivery never fails the request
    async fn deliver(&self, message: EmailMessage) {
        if let Err(e) = self.ctx.mailer().send(&message).await {
            warn!(to = %message.to, error = %e, "Failed to send email");
        }
    }
}
