//! Registration, login and start-up admin seeding.

use serde::Serialize;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginRequest, NewUser, RegisterRequest, Role, User},
    store::UserRepository,
    utils::{
        access::Caller,
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Token plus the sanitized account it was issued for.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub user: User,
}

impl AuthResponse {
    fn issue(user: User, config: &Config) -> Result<Self, AppError> {
        let token = sign_jwt(&user, &config.jwt_secret, config.jwt_expiration)?;
        Ok(Self {
            token,
            token_type: "Bearer",
            user,
        })
    }
}

/// Creates a regular account and signs the new user in.
pub async fn register<R>(
    repo: &R,
    config: &Config,
    payload: RegisterRequest,
) -> Result<AuthResponse, AppError>
where
    R: UserRepository + ?Sized,
{
    payload.validate()?;

    if repo.find_user_by_email(&payload.email).await?.is_some() {
        return Err(AppError::BadRequest("User already exists".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = repo
        .insert_user(NewUser {
            name: payload.name,
            email: payload.email,
            password_hash,
            role: Role::User,
        })
        .await
        .map_err(|e| match e {
            AppError::Conflict(msg) => AppError::BadRequest(msg),
            other => other,
        })?;

    tracing::info!(user_id = user.id, "User registered");
    AuthResponse::issue(user, config)
}

pub async fn login<R>(
    repo: &R,
    config: &Config,
    payload: LoginRequest,
) -> Result<AuthResponse, AppError>
where
    R: UserRepository + ?Sized,
{
    payload.validate()?;

    let invalid = || AppError::AuthError("Invalid email or password".to_string());

    let user = repo
        .find_user_by_email(&payload.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password)? {
        tracing::debug!(user_id = user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    AuthResponse::issue(user, config)
}

/// The account behind a verified token.
pub async fn me<R>(repo: &R, caller: &Caller) -> Result<User, AppError>
where
    R: UserRepository + ?Sized,
{
    repo.find_user_by_id(caller.id)
        .await?
        .ok_or_else(|| AppError::AuthError("Not authorized, user not found".to_string()))
}

/// Creates the configured admin account if it does not exist yet.
/// Returns whether a user was created.
pub async fn seed_admin<R>(repo: &R, config: &Config) -> Result<bool, AppError>
where
    R: UserRepository + ?Sized,
{
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(false);
    };

    if repo.find_user_by_email(email).await?.is_some() {
        return Ok(false);
    }

    tracing::info!("Seeding admin user: {}", email);
    let password_hash = hash_password(password)?;
    repo.insert_user(NewUser {
        name: config.admin_name.clone(),
        email: email.clone(),
        password_hash,
        role: Role::Admin,
    })
    .await?;
    tracing::info!("Admin user created successfully.");
    Ok(true)
}
