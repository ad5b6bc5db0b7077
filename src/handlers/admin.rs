// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::user::UpdateRoleRequest,
    services::admin,
    store::SharedStore,
    utils::extract::JsonBody,
};

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(State(store): State<SharedStore>) -> Result<impl IntoResponse, AppError> {
    let users = admin::list_users(store.as_ref()).await?;
    Ok(Json(users))
}

/// Changes a user's role.
/// Admin only.
pub async fn update_user_role(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<UpdateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = admin::set_user_role(store.as_ref(), id, payload.role).await?;
    Ok(Json(user))
}

/// Lists every status with its owner's name and email.
/// Admin only.
pub async fn list_statuses(State(store): State<SharedStore>) -> Result<impl IntoResponse, AppError> {
    let statuses = admin::list_all_statuses(store.as_ref()).await?;
    Ok(Json(statuses))
}
