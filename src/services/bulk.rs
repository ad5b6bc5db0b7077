//! Batch creation with per-item failure accounting.
//!
//! Items are created one after another in input order. A failed item is
//! recorded and the loop moves on; earlier successes are never rolled back.

use serde_json::Value;

use crate::{
    error::AppError,
    models::{
        category::{BulkCategoriesResponse, BulkCategoryError, Category, CategoryRequest},
        status::{BulkStatusError, BulkStatusesResponse, NewStatus, Status},
    },
    services::{category, status},
    store::{CategoryRepository, StatusRepository},
    utils::access::Caller,
};

/// Ordered outcome of a batch.
#[derive(Debug)]
pub struct BulkReport<T> {
    pub created: Vec<T>,
    pub errors: Vec<(Value, String)>,
}

impl<T> Default for BulkReport<T> {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> BulkReport<T> {
    fn record(&mut self, item: Value, outcome: Result<T, AppError>) {
        match outcome {
            Ok(created) => self.created.push(created),
            Err(e) => {
                if let AppError::InternalServerError(detail) = &e {
                    tracing::error!("Bulk item failed: {}", detail);
                }
                self.errors.push((item, e.message().to_string()));
            }
        }
    }

    pub fn success_count(&self) -> usize {
        self.created.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// A batch where nothing was created fails as a whole.
    fn into_result(self, all_failed: &str) -> Result<Self, AppError> {
        if self.created.is_empty() {
            return Err(AppError::BadRequest(all_failed.to_string()));
        }
        Ok(self)
    }
}

/// Unpacks the request list, rejecting anything but a non-empty array.
fn batch_items(value: Value, plural: &str) -> Result<Vec<Value>, AppError> {
    match value {
        Value::Array(items) if items.is_empty() => {
            Err(AppError::BadRequest(format!("No {} provided", plural)))
        }
        Value::Array(items) => Ok(items),
        _ => {
            let mut label = plural.to_string();
            if let Some(first) = label.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            Err(AppError::BadRequest(format!("{} must be an array", label)))
        }
    }
}

pub async fn import_categories<R>(repo: &R, items: Value) -> Result<BulkReport<Category>, AppError>
where
    R: CategoryRepository + ?Sized,
{
    let items = batch_items(items, "categories")?;
    let mut report = BulkReport::default();

    for item in items {
        let outcome = match serde_json::from_value::<CategoryRequest>(item.clone()) {
            Ok(request) => category::create(repo, request).await,
            Err(_) => Err(AppError::BadRequest("Category name is required".to_string())),
        };
        report.record(item, outcome);
    }

    tracing::info!(
        created = report.success_count(),
        failed = report.error_count(),
        "Category bulk import finished"
    );
    report.into_result("All categories failed to create")
}

pub async fn import_statuses<R>(
    repo: &R,
    owner: &Caller,
    items: Value,
) -> Result<BulkReport<Status>, AppError>
where
    R: StatusRepository + ?Sized,
{
    let items = batch_items(items, "statuses")?;
    let mut report = BulkReport::default();

    for item in items {
        let outcome = match serde_json::from_value::<NewStatus>(item.clone()) {
            Ok(request) => status::create(repo, owner, request).await,
            Err(_) => Err(AppError::BadRequest("All fields are required".to_string())),
        };
        report.record(item, outcome);
    }

    tracing::info!(
        owner_id = owner.id,
        created = report.success_count(),
        failed = report.error_count(),
        "Status bulk import finished"
    );
    report.into_result("All statuses failed to create")
}

impl From<BulkReport<Category>> for BulkCategoriesResponse {
    fn from(report: BulkReport<Category>) -> Self {
        Self {
            success_count: report.success_count(),
            error_count: report.error_count(),
            created_categories: report.created,
            errors: report
                .errors
                .into_iter()
                .map(|(category, error)| BulkCategoryError { category, error })
                .collect(),
        }
    }
}

impl From<BulkReport<Status>> for BulkStatusesResponse {
    fn from(report: BulkReport<Status>) -> Self {
        Self {
            success_count: report.success_count(),
            error_count: report.error_count(),
            created_statuses: report.created,
            errors: report
                .errors
                .into_iter()
                .map(|(status, error)| BulkStatusError { status, error })
                .collect(),
        }
    }
}
