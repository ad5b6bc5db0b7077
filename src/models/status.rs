use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::user::OwnerSummary;

/// The filter value meaning "every category".
pub const ALL_CATEGORIES: &str = "all";

/// Represents the 'statuses' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub id: i64,
    pub title: String,
    pub description: String,

    /// Category name, copied rather than referenced.
    pub category: String,

    /// Owner id. Set from the authenticated caller, never from the body.
    #[serde(rename = "user")]
    pub user_id: i64,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A status with its owner's public fields joined in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusWithOwner {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub user: Option<OwnerSummary>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl StatusWithOwner {
    pub fn new(status: Status, user: Option<OwnerSummary>) -> Self {
        Self {
            id: status.id,
            title: status.title,
            description: status.description,
            category: status.category,
            user,
            created_at: status.created_at,
            updated_at: status.updated_at,
        }
    }
}

/// DTO for creating a new status.
///
/// Any `user` field in the body is ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewStatus {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title is required (max 100 characters)"
    ))]
    pub title: String,

    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Description is required (max 1000 characters)"
    ))]
    pub description: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
}

/// DTO for updating a status. Fields are optional but may not be blanked.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct StatusPatch {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title cannot be empty (max 100 characters)"
    ))]
    pub title: Option<String>,

    #[validate(length(
        min = 1,
        max = 1000,
        message = "Description cannot be empty (max 1000 characters)"
    ))]
    pub description: Option<String>,

    #[validate(length(min = 1, message = "Category cannot be empty"))]
    pub category: Option<String>,
}

impl StatusPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.category.is_none()
    }
}

/// Query parameters for listing statuses.
#[derive(Debug, Default, Deserialize)]
pub struct StatusListParams {
    /// 1-indexed page number (default: 1).
    pub page: Option<i64>,

    /// Number of items per page (default: 20, max: 100).
    pub limit: Option<i64>,

    /// Exact category name, or "all".
    pub category: Option<String>,

    /// Case-insensitive substring matched against title, description and category.
    pub search: Option<String>,
}

/// Normalised feed filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFilter {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl StatusFilter {
    pub fn new(category: Option<String>, search: Option<String>) -> Self {
        Self {
            category: category.filter(|c| !c.is_empty() && c != ALL_CATEGORIES),
            search: search.filter(|s| !s.is_empty()),
        }
    }

    pub fn matches(&self, status: &Status) -> bool {
        if let Some(category) = &self.category {
            if &status.category != category {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            return [&status.title, &status.description, &status.category]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
        }

        true
    }
}

/// One page of the status feed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPage {
    pub statuses: Vec<StatusWithOwner>,
    pub total: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

/// Body of `POST /api/status/bulk`.
#[derive(Debug, Deserialize)]
pub struct BulkStatusesRequest {
    #[serde(default)]
    pub statuses: serde_json::Value,
}

/// Response of a status bulk import.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatusesResponse {
    pub success_count: usize,
    pub error_count: usize,
    pub created_statuses: Vec<Status>,
    pub errors: Vec<BulkStatusError>,
}

#[derive(Debug, Serialize)]
pub struct BulkStatusError {
    pub status: serde_json::Value,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn status(title: &str, description: &str, category: &str) -> Status {
        Status {
            id: 1,
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            user_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn all_sentinel_and_blank_values_are_dropped() {
        let filter = StatusFilter::new(Some("all".into()), Some(String::new()));
        assert_eq!(filter, StatusFilter::default());
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let filter = StatusFilter::new(None, Some("monday".into()));
        assert!(filter.matches(&status("Happy Monday", "x", "Joy")));
        assert!(filter.matches(&status("x", "see you MONDAY", "Joy")));
        assert!(filter.matches(&status("x", "y", "Mondays")));
        assert!(!filter.matches(&status("Tuesday", "y", "Joy")));
    }

    #[test]
    fn category_and_search_both_apply() {
        let filter = StatusFilter::new(Some("Joy".into()), Some("happy".into()));
        assert!(filter.matches(&status("Happy", "x", "Joy")));
        assert!(!filter.matches(&status("Happy", "x", "Sad")));
        assert!(!filter.matches(&status("Glad", "x", "Joy")));
    }

    #[test]
    fn category_match_is_exact() {
        let filter = StatusFilter::new(Some("joy".into()), None);
        assert!(!filter.matches(&status("a", "b", "Joy")));
    }
}
