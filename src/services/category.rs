//! Category collection management.
//!
//! Categories are referenced by name from statuses, so renames cascade and
//! deletes are refused while the name is in use. Neither step runs in a
//! transaction: a status written between the check and the write is not seen.

use validator::Validate;

use crate::{
    error::AppError,
    models::category::{Category, CategoryRequest},
    store::{CategoryRepository, StatusRepository},
};

pub async fn list<R>(repo: &R) -> Result<Vec<Category>, AppError>
where
    R: CategoryRepository + ?Sized,
{
    repo.list_categories().await
}

pub async fn create<R>(repo: &R, payload: CategoryRequest) -> Result<Category, AppError>
where
    R: CategoryRepository + ?Sized,
{
    payload.validate()?;

    if repo.find_category_by_name(&payload.name).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Category \"{}\" already exists",
            payload.name
        )));
    }

    let category = repo.insert_category(&payload.name).await?;
    tracing::info!(category_id = category.id, name = %category.name, "Category created");
    Ok(category)
}

/// Renames a category. Statuses are moved to the new name first, then the
/// category row itself is renamed.
pub async fn update<R>(repo: &R, id: i64, payload: CategoryRequest) -> Result<Category, AppError>
where
    R: CategoryRepository + StatusRepository + ?Sized,
{
    payload.validate()?;

    let category = repo
        .find_category(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    if let Some(existing) = repo.find_category_by_name(&payload.name).await? {
        if existing.id != id {
            return Err(AppError::Conflict(
                "Category name already exists".to_string(),
            ));
        }
    }

    let moved = repo.reassign_category(&category.name, &payload.name).await?;

    let renamed = repo
        .rename_category(id, &payload.name)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    tracing::info!(
        category_id = id,
        from = %category.name,
        to = %renamed.name,
        statuses = moved,
        "Category renamed"
    );
    Ok(renamed)
}

/// Deletes a category unless a status still uses its name.
pub async fn delete<R>(repo: &R, id: i64) -> Result<(), AppError>
where
    R: CategoryRepository + StatusRepository + ?Sized,
{
    let category = repo
        .find_category(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    let in_use = repo.count_statuses_in_category(&category.name).await?;
    if in_use > 0 {
        tracing::debug!(category_id = id, in_use, "Refusing to delete category in use");
        return Err(AppError::Conflict(
            "Cannot delete category that is in use".to_string(),
        ));
    }

    if !repo.delete_category(id).await? {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    tracing::info!(category_id = id, name = %category.name, "Category deleted");
    Ok(())
}
