//! Status feed rules: validation, pagination and ownership checks.

use validator::Validate;

use crate::{
    error::AppError,
    models::{
        category::CategoryRequest,
        page::PageRequest,
        status::{NewStatus, Status, StatusFilter, StatusListParams, StatusPage, StatusPatch},
    },
    store::StatusRepository,
    utils::{
        access::{Action, Caller, authorize},
        html::clean_html,
    },
};

fn sanitize_new(status: NewStatus) -> NewStatus {
    NewStatus {
        title: clean_html(&status.title),
        description: clean_html(&status.description),
        category: status.category,
    }
}

fn sanitize_patch(patch: StatusPatch) -> StatusPatch {
    StatusPatch {
        title: patch.title.as_deref().map(clean_html),
        description: patch.description.as_deref().map(clean_html),
        category: patch.category,
    }
}

/// Creates a status owned by `owner`. Ownership never comes from the payload.
pub async fn create<R>(repo: &R, owner: &Caller, payload: NewStatus) -> Result<Status, AppError>
where
    R: StatusRepository + ?Sized,
{
    let payload = sanitize_new(payload);
    payload.validate()?;

    let status = repo.insert_status(payload, owner.id).await?;
    tracing::info!(status_id = status.id, owner_id = owner.id, "Status created");
    Ok(status)
}

/// One page of the feed, newest first.
///
/// A page past the end is an empty page, not an error.
pub async fn list<R>(repo: &R, params: StatusListParams) -> Result<StatusPage, AppError>
where
    R: StatusRepository + ?Sized,
{
    let page = PageRequest::new(params.page, params.limit);
    let filter = StatusFilter::new(params.category, params.search);

    let statuses = repo.query_statuses(&filter, page.skip(), page.limit).await?;
    let total = repo.count_statuses(&filter).await?;

    Ok(StatusPage {
        statuses,
        total,
        total_pages: page.total_pages(total),
        current_page: page.page,
    })
}

/// Category names in use by statuses. Independent of the category collection.
pub async fn distinct_categories<R>(repo: &R) -> Result<Vec<String>, AppError>
where
    R: StatusRepository + ?Sized,
{
    repo.distinct_categories().await
}

pub async fn update<R>(
    repo: &R,
    id: i64,
    caller: Option<&Caller>,
    patch: StatusPatch,
) -> Result<Status, AppError>
where
    R: StatusRepository + ?Sized,
{
    let status = repo
        .find_status(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Status not found".to_string()))?;

    if let Err(e) = authorize(caller, Action::Update, status.user_id).into_result("status") {
        tracing::warn!(status_id = id, "Rejected status update: {}", e.message());
        return Err(e);
    }

    let patch = sanitize_patch(patch);
    patch.validate()?;
    if patch.is_empty() {
        return Ok(status);
    }

    repo.update_status(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Status not found".to_string()))
}

pub async fn delete<R>(repo: &R, id: i64, caller: Option<&Caller>) -> Result<(), AppError>
where
    R: StatusRepository + ?Sized,
{
    let status = repo
        .find_status(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Status not found".to_string()))?;

    if let Err(e) = authorize(caller, Action::Delete, status.user_id).into_result("status") {
        tracing::warn!(status_id = id, "Rejected status delete: {}", e.message());
        return Err(e);
    }

    if !repo.delete_status(id).await? {
        return Err(AppError::NotFound("Status not found".to_string()));
    }

    tracing::info!(status_id = id, "Status deleted");
    Ok(())
}

/// Validates a feed category name. Feed categories exist only as values on
/// statuses, so nothing is stored.
pub fn propose_feed_category(payload: CategoryRequest) -> Result<CategoryRequest, AppError> {
    payload.validate()?;
    Ok(payload)
}

/// Succeeds only if no status uses `name`. Nothing is stored, so nothing is removed.
pub async fn retire_feed_category<R>(repo: &R, name: &str) -> Result<(), AppError>
where
    R: StatusRepository + ?Sized,
{
    if repo.count_statuses_in_category(name).await? > 0 {
        return Err(AppError::Conflict(
            "Cannot delete category that is in use".to_string(),
        ));
    }
    Ok(())
}
