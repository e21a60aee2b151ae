use anyhow::anyhow;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::entities;
use crate::ports::{NewUser, Notifier, UsersRepository};

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Email already registered")]
    EmailTaken,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password must be at least {} characters", MIN_PASSWORD_LENGTH)]
    WeakPassword,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid or expired verification code")]
    InvalidCode,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Clone, Debug)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub institution_name: Option<String>,
    pub role: entities::UserRole,
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("hash password: {}", err))?;
    Ok(hash.to_string())
}

fn verify_password(hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn validate_email(email: &str) -> Result<(), AccountError> {
    // Shallow check; deliverability is proven by the emailed code.
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AccountError::InvalidEmail);
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(AccountError::InvalidEmail);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AccountError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AccountError::WeakPassword);
    }
    Ok(())
}

/// Creates the account and mails a verification code. Notification failure is
/// logged, never fatal: the code can be re-requested.
pub async fn register<R: UsersRepository, N: Notifier>(
    repo: &mut R,
    notifier: &N,
    now: DateTime<Utc>,
    input: RegisterInput,
) -> Result<entities::User, AccountError> {
    validate_email(&input.email)?;
    validate_password(&input.password)?;

    if repo.get_by_email(&input.email).await?.is_some() {
        return Err(AccountError::EmailTaken);
    }

    let code = entities::OneTimeCode::generate(now);
    let user = repo
        .create(
            now,
            NewUser {
                email: input.email,
                password_hash: hash_password(&input.password)?,
                full_name: input.full_name,
                institution_name: input.institution_name,
                role: input.role,
                verification_code: code.clone(),
            },
        )
        .await?;

    if let Err(err) = notifier
        .send_verification_code(&user.email, code.code())
        .await
    {
        log::error!("failed to send verification email to {}: {:#}", user.email, err);
    }

    Ok(user)
}

/// Marks the account verified when the code matches and has not expired.
pub async fn verify_email<R: UsersRepository>(
    repo: &mut R,
    now: DateTime<Utc>,
    code: &str,
) -> Result<entities::User, AccountError> {
    let Some(mut user) = repo.get_by_verification_code(code).await? else {
        return Err(AccountError::InvalidCode);
    };
    let valid = user
        .verification_code
        .as_ref()
        .is_some_and(|c| c.matches(code, now));
    if !valid {
        return Err(AccountError::InvalidCode);
    }

    user.email_verified = true;
    user.verification_code = None;
    let user = repo.update(user, now).await?;
    Ok(user)
}

/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login<R: UsersRepository>(
    repo: &mut R,
    email: &str,
    password: &str,
) -> Result<entities::User, AccountError> {
    let Some(user) = repo.get_by_email(email).await? else {
        return Err(AccountError::InvalidCredentials);
    };
    if !verify_password(&user.password_hash, password) {
        return Err(AccountError::InvalidCredentials);
    }
    Ok(user)
}

/// Stores a reset code and notifies. Unknown emails succeed silently so the
/// endpoint cannot be used to enumerate accounts.
pub async fn request_password_reset<R: UsersRepository, N: Notifier>(
    repo: &mut R,
    notifier: &N,
    now: DateTime<Utc>,
    email: &str,
) -> Result<(), AccountError> {
    let Some(mut user) = repo.get_by_email(email).await? else {
        return Ok(());
    };

    let code = entities::OneTimeCode::generate(now);
    user.reset_code = Some(code.clone());
    let user = repo.update(user, now).await?;

    if let Err(err) = notifier
        .send_password_reset_code(&user.email, code.code())
        .await
    {
        log::error!("failed to send reset email to {}: {:#}", user.email, err);
    }

    Ok(())
}

pub async fn reset_password<R: UsersRepository>(
    repo: &mut R,
    now: DateTime<Utc>,
    code: &str,
    new_password: &str,
) -> Result<entities::User, AccountError> {
    validate_password(new_password)?;

    let Some(mut user) = repo.get_by_reset_code(code).await? else {
        return Err(AccountError::InvalidCode);
    };
    let valid = user.reset_code.as_ref().is_some_and(|c| c.matches(code, now));
    if !valid {
        return Err(AccountError::InvalidCode);
    }

    user.password_hash = hash_password(new_password)?;
    user.reset_code = None;
    let user = repo.update(user, now).await?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password(&hash, "correct horse"));
        assert!(!verify_password(&hash, "wrong horse"));
        assert!(!verify_password("not a phc string", "correct horse"));
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("a@example.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@nodot").is_err());
    }
}
