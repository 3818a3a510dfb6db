//! User and verification token mappers

use edu_core::entities::{TokenPurpose, User, UserRole, VerificationToken};
use edu_core::error::DomainError;
use edu_core::value_objects::Snowflake;

use crate::models::{UserModel, VerificationTokenModel};

impl TryFrom<UserModel> for User {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        Ok(User {
            id: Snowflake::new(model.id),
            name: model.name,
            email: model.email,
            role: model
                .role
                .parse::<UserRole>()
                .map_err(|_| DomainError::InternalError(format!("bad role in row: {}", model.role)))?,
            verified: model.verified,
            usn: model.usn,
            course: model.course,
            semester: model.semester,
            bio: model.bio,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl TryFrom<VerificationTokenModel> for VerificationToken {
    type Error = DomainError;

    fn try_from(model: VerificationTokenModel) -> Result<Self, Self::Error> {
        Ok(VerificationToken {
            token: model.token,
            user_id: Snowflake::new(model.user_id),
            purpose: model.purpose.parse::<TokenPurpose>()?,
            expires_at: model.expires_at,
            used_at: model.used_at,
            created_at: model.created_at,
        })
    }
}
