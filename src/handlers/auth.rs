// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginRequest, RegisterRequest},
    services::auth,
    store::SharedStore,
    utils::{extract::JsonBody, jwt::Claims},
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created with a token and the user object (excluding password).
pub async fn register(
    State(store): State<SharedStore>,
    State(config): State<Config>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = auth::register(store.as_ref(), &config, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(store): State<SharedStore>,
    State(config): State<Config>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = auth::login(store.as_ref(), &config, payload).await?;
    Ok(Json(response))
}

/// Returns the account behind the bearer token.
pub async fn me(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let caller = claims.caller()?;
    let user = auth::me(store.as_ref(), &caller).await?;
    Ok(Json(user))
}
