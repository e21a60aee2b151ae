use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Acquire, Postgres};
use ulid::Ulid;

use crate::entities;
use crate::ports;

#[derive(Debug, Clone, sqlx::FromRow)]
struct UserModel {
    id: String,
    email: String,
    password_hash: String,
    full_name: String,
    institution_name: Option<String>,
    role: String,
    email_verified: bool,
    verification_code: Option<String>,
    verification_code_expires_at: Option<DateTime<Utc>>,
    reset_code: Option<String>,
    reset_code_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i32,
}

fn code_from_columns(
    code: Option<String>,
    expires_at: Option<DateTime<Utc>>,
) -> anyhow::Result<Option<entities::OneTimeCode>> {
    match (code, expires_at) {
        (Some(code), Some(expires_at)) => {
            Ok(Some(entities::OneTimeCode::from_parts(code, expires_at)))
        }
        (None, None) => Ok(None),
        _ => Err(anyhow!("code and expiry columns must be populated together")),
    }
}

impl UserModel {
    fn into_entity(self) -> anyhow::Result<entities::User> {
        Ok(entities::User {
            id: entities::UserId::from(self.id),
            email: self.email,
            password_hash: self.password_hash,
            full_name: self.full_name,
            institution_name: self.institution_name,
            role: entities::UserRole::try_from(self.role.as_str())?,
            email_verified: self.email_verified,
            verification_code: code_from_columns(
                self.verification_code,
                self.verification_code_expires_at,
            )?,
            reset_code: code_from_columns(self.reset_code, self.reset_code_expires_at)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: entities::Version::try_from(self.version)?,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    id,
    email,
    password_hash,
    full_name,
    institution_name,
    role,
    email_verified,
    verification_code,
    verification_code_expires_at,
    reset_code,
    reset_code_expires_at,
    created_at,
    updated_at,
    version
"#;

#[derive(Debug, Clone)]
pub struct UsersRepositoryImpl<A> {
    db: A,
}

impl<A> UsersRepositoryImpl<A> {
    pub fn new(db: A) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<A> ports::UsersRepository for UsersRepositoryImpl<A>
where
    A: Send + Sync,
    for<'c> &'c A: Acquire<'c, Database = Postgres>,
{
    async fn create(
        &mut self,
        now: DateTime<Utc>,
        new_user: ports::NewUser,
    ) -> anyhow::Result<entities::User> {
        let mut trx = self.db.begin().await?;
        let user = entities::User {
            id: entities::UserId::from(Ulid::from_datetime(now.into()).to_string()),
            email: new_user.email,
            password_hash: new_user.password_hash,
            full_name: new_user.full_name,
            institution_name: new_user.institution_name,
            role: new_user.role,
            email_verified: false,
            verification_code: Some(new_user.verification_code),
            reset_code: None,
            created_at: now,
            updated_at: now,
            version: entities::Version::new(),
        };

        let code = user
            .verification_code
            .as_ref()
            .map(|c| c.code().to_string());
        let code_expires_at = user.verification_code.as_ref().map(|c| c.expires_at());

        sqlx::query(
            r#"
                INSERT INTO users
                    (id, email, password_hash, full_name, institution_name, role,
                     email_verified, verification_code, verification_code_expires_at,
                     created_at, updated_at, version)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.institution_name)
        .bind(user.role.as_str())
        .bind(user.email_verified)
        .bind(&code)
        .bind(code_expires_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(i32::from(user.version))
        .execute(&mut *trx)
        .await
        .context("insert user")?;

        trx.commit().await?;
        Ok(user)
    }

    async fn get_by_id(
        &mut self,
        id: &entities::UserId,
    ) -> anyhow::Result<Option<entities::User>> {
        let mut conn = self.db.acquire().await?;

        let model = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&mut *conn)
        .await
        .context("fetch user by id")?;

        model.map(UserModel::into_entity).transpose()
    }

    async fn get_by_email(&mut self, email: &str) -> anyhow::Result<Option<entities::User>> {
        let mut conn = self.db.acquire().await?;

        let model = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&mut *conn)
        .await
        .context("fetch user by email")?;

        model.map(UserModel::into_entity).transpose()
    }

    async fn get_by_verification_code(
        &mut self,
        code: &str,
    ) -> anyhow::Result<Option<entities::User>> {
        let mut conn = self.db.acquire().await?;

        let model = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE verification_code = $1"
        ))
        .bind(code)
        .fetch_optional(&mut *conn)
        .await
        .context("fetch user by verification code")?;

        model.map(UserModel::into_entity).transpose()
    }

    async fn get_by_reset_code(&mut self, code: &str) -> anyhow::Result<Option<entities::User>> {
        let mut conn = self.db.acquire().await?;

        let model = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE reset_code = $1"
        ))
        .bind(code)
        .fetch_optional(&mut *conn)
        .await
        .context("fetch user by reset code")?;

        model.map(UserModel::into_entity).transpose()
    }

    async fn update(
        &mut self,
        mut user: entities::User,
        now: DateTime<Utc>,
    ) -> anyhow::Result<entities::User> {
        let mut trx = self.db.begin().await?;
        let prev_version = user.version;

        user.version = user.version.next();
        user.updated_at = now;

        let verification_code = user
            .verification_code
            .as_ref()
            .map(|c| c.code().to_string());
        let verification_code_expires_at =
            user.verification_code.as_ref().map(|c| c.expires_at());
        let reset_code = user.reset_code.as_ref().map(|c| c.code().to_string());
        let reset_code_expires_at = user.reset_code.as_ref().map(|c| c.expires_at());

        let result = sqlx::query(
            r#"
                UPDATE users
                    SET
                        password_hash = $1,
                        email_verified = $2,
                        verification_code = $3,
                        verification_code_expires_at = $4,
                        reset_code = $5,
                        reset_code_expires_at = $6,
                        updated_at = $7,
                        version = $8
                    WHERE id = $9 AND version = $10
            "#,
        )
        .bind(&user.password_hash)
        .bind(user.email_verified)
        .bind(&verification_code)
        .bind(verification_code_expires_at)
        .bind(&reset_code)
        .bind(reset_code_expires_at)
        .bind(user.updated_at)
        .bind(i32::from(user.version))
        .bind(user.id.as_str())
        .bind(i32::from(prev_version))
        .execute(&mut *trx)
        .await
        .context("update user")?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("conflict"));
        }

        trx.commit().await?;
        Ok(user)
    }
}
