//! Verification token entity - single-use, expiring tokens for email
//! verification and password reset

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

const TOKEN_LEN: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    EmailVerification,
    PasswordReset,
}

impl TokenPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailVerification => "email_verification",
            Self::PasswordReset => "password_reset",
        }
    }
}

impl std::str::FromStr for TokenPurpose {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email_verification" => Ok(Self::EmailVerification),
            "password_reset" => Ok(Self::PasswordReset),
            other => Err(DomainError::InternalError(format!(
                "unknown token purpose: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationToken {
    pub token: String,
    pub user_id: Snowflake,
    pub purpose: TokenPurpose,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl VerificationToken {
    /// Issue a fresh random token valid for `ttl`
    pub fn issue(user_id: Snowflake, purpose: TokenPurpose, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            token: generate_token(),
            user_id,
            purpose,
            expires_at: now + ttl,
            used_at: None,
            created_at: now,
        }
    }

    #[inline]
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check a looked-up token before consuming it.
    ///
    /// A token issued for another purpose is reported exactly like an unknown one.
    pub fn ensure_usable(&self, purpose: TokenPurpose) -> Result<(), DomainError> {
        if self.purpose != purpose {
            return Err(DomainError::InvalidVerificationToken);
        }
        if self.is_used() {
            return Err(DomainError::VerificationTokenUsed);
        }
        if self.is_expired() {
            return Err(DomainError::VerificationTokenExpired);
        }
        Ok(())
    }

    /// Seconds left before another token of the same purpose may be issued
    pub fn cooldown_remaining(&self, cooldown: Duration, now: DateTime<Utc>) -> Option<i64> {
        let ready_at = self.created_at + cooldown;
        (now < ready_at).then(|| (ready_at - now).num_seconds().max(1))
    }
}

/// Generate a cryptographically secure random token string
pub fn generate_token() -> String {
    use rand::Rng;

    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reset_token() -> VerificationToken {
        VerificationToken::issue(
            Snowflake::new(7),
            TokenPurpose::PasswordReset,
            Duration::minutes(60),
        )
    }

    #[test]
    fn test_fresh_token_is_usable() {
        let token = reset_token();
        assert_eq!(token.token.len(), TOKEN_LEN);
        assert!(token.ensure_usable(TokenPurpose::PasswordReset).is_ok());
    }

    #[test]
    fn test_wrong_purpose_is_invalid() {
        let token = reset_token();
        assert!(matches!(
            token.ensure_usable(TokenPurpose::EmailVerification),
            Err(DomainError::InvalidVerificationToken)
        ));
    }

    #[test]
    fn test_expired_token() {
        let mut token = reset_token();
        token.expires_at = Utc::now() - Duration::seconds(1);
        assert!(matches!(
            token.ensure_usable(TokenPurpose::PasswordReset),
            Err(DomainError::VerificationTokenExpired)
        ));
    }

    #[test]
    fn test_used_wins_over_expired() {
        let mut token = reset_token();
        token.expires_at = Utc::now() - Duration::seconds(1);
        token.used_at = Some(Utc::now());
        assert!(matches!(
            token.ensure_usable(TokenPurpose::PasswordReset),
            Err(DomainError::VerificationTokenUsed)
        ));
    }

    #[test]
    fn test_cooldown_remaining() {
        let token = reset_token();
        let cooldown = Duration::seconds(60);
        assert!(token
            .cooldown_remaining(cooldown, token.created_at + Duration::seconds(10))
            .is_some_and(|s| s <= 50));
        assert_eq!(
            token.cooldown_remaining(cooldown, token.created_at + Duration::seconds(61)),
            None
        );
    }

    #[test]
    fn test_generated_tokens_differ() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
