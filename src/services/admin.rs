//! Cross-cutting admin views. Callers are checked by the admin middleware.

use crate::{
    error::AppError,
    models::{
        status::StatusWithOwner,
        user::{Role, User},
    },
    store::{StatusRepository, UserRepository},
};

/// Every account. Password hashes never serialize.
pub async fn list_users<R>(repo: &R) -> Result<Vec<User>, AppError>
where
    R: UserRepository + ?Sized,
{
    repo.list_users().await
}

pub async fn set_user_role<R>(repo: &R, user_id: i64, role: Role) -> Result<User, AppError>
where
    R: UserRepository + ?Sized,
{
    let user = repo
        .set_user_role(user_id, role)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id, role = %role, "User role changed");
    Ok(user)
}

/// Every status with its owner's name and email. Not paginated.
pub async fn list_all_statuses<R>(repo: &R) -> Result<Vec<StatusWithOwner>, AppError>
where
    R: StatusRepository + ?Sized,
{
    repo.list_statuses_with_owner().await
}
