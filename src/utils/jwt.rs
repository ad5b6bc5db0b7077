// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::user::{Role, User},
    state::AppState,
    store::UserRepository,
    utils::access::{Caller, authorize_admin},
};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl Claims {
    /// The verified identity carried by this token.
    pub fn caller(&self) -> Result<Caller, AppError> {
        let id = self
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::AuthError("Not authorized, token failed".to_string()))?;
        Ok(Caller {
            id,
            role: self.role,
        })
    }
}

/// Signs a new JWT for the user.
pub fn sign_jwt(user: &User, secret: &str, expiration_seconds: u64) -> Result<String, AppError> {
    // Calculate expiration: current time + expiration_seconds
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        sub: user.id.to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
///
/// Returns the `Claims` if valid, otherwise returns an `AppError`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Not authorized, token failed".to_string()))?;

    Ok(token_data.claims)
}

/// Axum Middleware: Authentication.
///
/// Intercepts requests, validates the 'Authorization: Bearer <token>' header.
/// If valid, injects `Claims` into the request extensions for handlers to use.
/// The role is re-read from the store, so a role change applies to tokens
/// that are already issued. If invalid, returns 401 Unauthorized.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match auth_header.and_then(|header| header.strip_prefix("Bearer ")) {
        Some(token) if !token.is_empty() => token,
        _ => return Err(AppError::AuthError("Not authorized, no token".to_string())),
    };

    let mut claims = verify_jwt(token, &state.config.jwt_secret)?;
    let caller = claims.caller()?;

    let user = state
        .store
        .find_user_by_id(caller.id)
        .await?
        .ok_or_else(|| AppError::AuthError("Not authorized, user not found".to_string()))?;
    claims.role = user.role;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Axum Middleware: Admin Authorization.
///
/// Must be used AFTER `auth_middleware`. Checks if the injected `Claims` has 'admin' role.
/// If not, returns 403 Forbidden.
pub async fn admin_middleware(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let caller = req
        .extensions()
        .get::<Claims>()
        .map(Claims::caller)
        .transpose()?;

    authorize_admin(caller.as_ref()).into_result("resource")?;

    Ok(next.run(req).await)
}
