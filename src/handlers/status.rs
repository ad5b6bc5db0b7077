// src/handlers/status.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::{
        category::CategoryRequest,
        status::{BulkStatusesRequest, BulkStatusesResponse, NewStatus, StatusListParams, StatusPatch},
    },
    services::{bulk, status},
    store::SharedStore,
    utils::{extract::JsonBody, jwt::Claims},
};

/// Lists statuses, newest first.
/// Public. Supports `page`, `limit`, `category` and `search`.
pub async fn list_statuses(
    State(store): State<SharedStore>,
    query: Result<Query<StatusListParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let page = status::list(store.as_ref(), params).await?;
    Ok(Json(page))
}

/// Creates a status owned by the caller.
/// Requires: Login.
pub async fn create_status(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
    JsonBody(payload): JsonBody<NewStatus>,
) -> Result<impl IntoResponse, AppError> {
    let caller = claims.caller()?;
    let created = status::create(store.as_ref(), &caller, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Updates a status.
/// Requires: Login + (Owner OR Admin).
pub async fn update_status(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    JsonBody(patch): JsonBody<StatusPatch>,
) -> Result<impl IntoResponse, AppError> {
    let caller = claims.caller()?;
    let updated = status::update(store.as_ref(), id, Some(&caller), patch).await?;
    Ok(Json(updated))
}

/// Deletes a status.
/// Requires: Login + (Owner OR Admin).
pub async fn delete_status(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let caller = claims.caller()?;
    status::delete(store.as_ref(), id, Some(&caller)).await?;
    Ok(Json(json!({ "message": "Status deleted successfully" })))
}

/// Distinct category names currently used by statuses.
/// Public.
pub async fn list_feed_categories(
    State(store): State<SharedStore>,
) -> Result<impl IntoResponse, AppError> {
    let names = status::distinct_categories(store.as_ref()).await?;
    Ok(Json(names))
}

/// Validates and echoes a feed category name.
/// Requires: Login.
pub async fn add_feed_category(
    JsonBody(payload): JsonBody<CategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let accepted = status::propose_feed_category(payload)?;
    Ok((StatusCode::CREATED, Json(json!({ "name": accepted.name }))))
}

/// Confirms a feed category is unused.
/// Requires: Login.
pub async fn delete_feed_category(
    State(store): State<SharedStore>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    status::retire_feed_category(store.as_ref(), &name).await?;
    Ok(Json(json!({ "message": format!("Category '{}' deleted", name) })))
}

/// Creates many statuses for the caller, reporting failures per item.
/// Requires: Login.
pub async fn bulk_create_statuses(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
    JsonBody(payload): JsonBody<BulkStatusesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let caller = claims.caller()?;
    let report = bulk::import_statuses(store.as_ref(), &caller, payload.statuses).await?;
    Ok((StatusCode::CREATED, Json(BulkStatusesResponse::from(report))))
}
