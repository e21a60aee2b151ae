use thiserror::Error;

use crate::entities;
use crate::ports::UsersRepository;

#[derive(Error, Debug)]
pub enum AccountQueryError {
    #[error("User not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The authenticated user's own account. A stale session id (the account was
/// removed since login) reads as NotFound.
pub async fn profile<R: UsersRepository>(
    repo: &mut R,
    user_id: &entities::UserId,
) -> Result<entities::User, AccountQueryError> {
    repo.get_by_id(user_id)
        .await?
        .ok_or(AccountQueryError::NotFound)
}
