use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'categories' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating or renaming a category.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Category name is required"))]
    pub name: String,
}

/// Body of `POST /api/categories/bulk`.
///
/// Kept as a raw value so a non-array payload is reported as such instead of
/// being rejected by the JSON extractor.
#[derive(Debug, Deserialize)]
pub struct BulkCategoriesRequest {
    #[serde(default)]
    pub categories: serde_json::Value,
}

/// Response of a category bulk import.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCategoriesResponse {
    pub success_count: usize,
    pub error_count: usize,
    pub created_categories: Vec<Category>,
    pub errors: Vec<BulkCategoryError>,
}

#[derive(Debug, Serialize)]
pub struct BulkCategoryError {
    pub category: serde_json::Value,
    pub error: String,
}
