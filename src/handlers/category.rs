// src/handlers/category.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::category::{BulkCategoriesRequest, BulkCategoriesResponse, CategoryRequest},
    services::{bulk, category},
    store::SharedStore,
    utils::extract::JsonBody,
};

/// Lists all categories, newest first.
/// Public.
pub async fn list_categories(
    State(store): State<SharedStore>,
) -> Result<impl IntoResponse, AppError> {
    let categories = category::list(store.as_ref()).await?;
    Ok(Json(categories))
}

/// Creates a category.
/// Admin only.
pub async fn create_category(
    State(store): State<SharedStore>,
    JsonBody(payload): JsonBody<CategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = category::create(store.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Renames a category, moving its statuses along.
/// Admin only.
pub async fn update_category(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<CategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = category::update(store.as_ref(), id, payload).await?;
    Ok(Json(updated))
}

/// Deletes an unused category.
/// Admin only.
pub async fn delete_category(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    category::delete(store.as_ref(), id).await?;
    Ok(Json(json!({ "message": "Category removed" })))
}

/// Creates many categories, reporting failures per item.
/// Admin only.
pub async fn bulk_create_categories(
    State(store): State<SharedStore>,
    JsonBody(payload): JsonBody<BulkCategoriesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let report = bulk::import_categories(store.as_ref(), payload.categories).await?;
    Ok((StatusCode::CREATED, Json(BulkCategoriesResponse::from(report))))
}
