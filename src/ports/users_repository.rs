use crate::entities;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub institution_name: Option<String>,
    pub role: entities::UserRole,
    pub verification_code: entities::OneTimeCode,
}

#[async_trait]
pub trait UsersRepository {
    async fn create(
        &mut self,
        now: DateTime<Utc>,
        new_user: NewUser,
    ) -> anyhow::Result<entities::User>;

    async fn get_by_id(
        &mut self,
        id: &entities::UserId,
    ) -> anyhow::Result<Option<entities::User>>;

    async fn get_by_email(&mut self, email: &str) -> anyhow::Result<Option<entities::User>>;

    /// Looks a user up by pending email-verification code.
    async fn get_by_verification_code(
        &mut self,
        code: &str,
    ) -> anyhow::Result<Option<entities::User>>;

    /// Looks a user up by pending password-reset code.
    async fn get_by_reset_code(&mut self, code: &str) -> anyhow::Result<Option<entities::User>>;

    /// Persists the mutable fields of the entity; version-guarded.
    async fn update(
        &mut self,
        user: entities::User,
        now: DateTime<Utc>,
    ) -> anyhow::Result<entities::User>;
}
