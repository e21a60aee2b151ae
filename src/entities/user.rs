use super::{OneTimeCode, UserId, Version};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum UserRole {
    Student,
    Institution,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Institution => "INSTITUTION",
            Self::Admin => "ADMIN",
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum UserRoleTryFromError {
    #[error("Invalid user role: {0}")]
    Unsupported(String),
}

impl TryFrom<&str> for UserRole {
    type Error = UserRoleTryFromError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "STUDENT" => Ok(Self::Student),
            "INSTITUTION" => Ok(Self::Institution),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(UserRoleTryFromError::Unsupported(value.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub institution_name: Option<String>,
    pub role: UserRole,
    pub email_verified: bool,
    pub verification_code: Option<OneTimeCode>,
    pub reset_code: Option<OneTimeCode>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: Version,
}
