use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::{
        category::Category,
        status::{NewStatus, Status, StatusFilter, StatusPatch, StatusWithOwner},
        user::{NewUser, OwnerSummary, Role, User},
    },
    store::{CategoryRepository, StatusRepository, UserRepository},
};

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    statuses: Vec<Status>,
    categories: Vec<Category>,
    last_id: i64,
}

impl Collections {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn owner_of(&self, status: &Status) -> Option<OwnerSummary> {
        self.users
            .iter()
            .find(|u| u.id == status.user_id)
            .map(OwnerSummary::from)
    }

    /// Statuses matching `filter`, newest first.
    fn feed(&self, filter: &StatusFilter) -> Vec<&Status> {
        let mut matching: Vec<&Status> = self.statuses.iter().filter(|s| filter.matches(s)).collect();
        matching.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        matching
    }

    fn with_owner(&self, status: &Status) -> StatusWithOwner {
        StatusWithOwner::new(status.clone(), self.owner_of(status))
    }
}

/// Process-local store. Contents are lost on shutdown.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut db = self.inner.write().await;
        if db.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let record = User {
            id: db.next_id(),
            name: user.name,
            email: user.email,
            password: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        db.users.push(record.clone());
        Ok(record)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let db = self.inner.read().await;
        Ok(db.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let db = self.inner.read().await;
        Ok(db.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let db = self.inner.read().await;
        let mut users = db.users.clone();
        users.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(users)
    }

    async fn set_user_role(&self, id: i64, role: Role) -> Result<Option<User>, AppError> {
        let mut db = self.inner.write().await;
        Ok(db.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.role = role;
            user.clone()
        }))
    }
}

#[async_trait]
impl StatusRepository for MemoryStore {
    async fn insert_status(&self, status: NewStatus, owner_id: i64) -> Result<Status, AppError> {
        let mut db = self.inner.write().await;
        let now = Utc::now();
        let record = Status {
            id: db.next_id(),
            title: status.title,
            description: status.description,
            category: status.category,
            user_id: owner_id,
            created_at: now,
            updated_at: now,
        };
        db.statuses.push(record.clone());
        Ok(record)
    }

    async fn find_status(&self, id: i64) -> Result<Option<Status>, AppError> {
        let db = self.inner.read().await;
        Ok(db.statuses.iter().find(|s| s.id == id).cloned())
    }

    async fn query_statuses(
        &self,
        filter: &StatusFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<StatusWithOwner>, AppError> {
        let db = self.inner.read().await;
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(db
            .feed(filter)
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|s| db.with_owner(s))
            .collect())
    }

    async fn count_statuses(&self, filter: &StatusFilter) -> Result<i64, AppError> {
        let db = self.inner.read().await;
        Ok(db.statuses.iter().filter(|s| filter.matches(s)).count() as i64)
    }

    async fn list_statuses_with_owner(&self) -> Result<Vec<StatusWithOwner>, AppError> {
        let db = self.inner.read().await;
        Ok(db
            .feed(&StatusFilter::default())
            .into_iter()
            .map(|s| db.with_owner(s))
            .collect())
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, AppError> {
        let db = self.inner.read().await;
        let names: BTreeSet<&String> = db.statuses.iter().map(|s| &s.category).collect();
        Ok(names.into_iter().cloned().collect())
    }

    async fn update_status(&self, id: i64, patch: StatusPatch) -> Result<Option<Status>, AppError> {
        let mut db = self.inner.write().await;
        let Some(status) = db.statuses.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            status.title = title;
        }
        if let Some(description) = patch.description {
            status.description = description;
        }
        if let Some(category) = patch.category {
            status.category = category;
        }
        status.updated_at = Utc::now();

        Ok(Some(status.clone()))
    }

    async fn delete_status(&self, id: i64) -> Result<bool, AppError> {
        let mut db = self.inner.write().await;
        let before = db.statuses.len();
        db.statuses.retain(|s| s.id != id);
        Ok(db.statuses.len() != before)
    }

    async fn count_statuses_in_category(&self, category: &str) -> Result<i64, AppError> {
        let db = self.inner.read().await;
        Ok(db.statuses.iter().filter(|s| s.category == category).count() as i64)
    }

    async fn reassign_category(&self, from: &str, to: &str) -> Result<u64, AppError> {
        let mut db = self.inner.write().await;
        let now = Utc::now();
        let mut touched = 0;
        for status in db.statuses.iter_mut().filter(|s| s.category == from) {
            status.category = to.to_string();
            status.updated_at = now;
            touched += 1;
        }
        Ok(touched)
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let db = self.inner.read().await;
        let mut categories = db.categories.clone();
        categories.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(categories)
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>, AppError> {
        let db = self.inner.read().await;
        Ok(db.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, AppError> {
        let db = self.inner.read().await;
        Ok(db.categories.iter().find(|c| c.name == name).cloned())
    }

    async fn insert_category(&self, name: &str) -> Result<Category, AppError> {
        let mut db = self.inner.write().await;
        if db.categories.iter().any(|c| c.name == name) {
            return Err(AppError::Conflict(format!("Category \"{}\" already exists", name)));
        }

        let now = Utc::now();
        let record = Category {
            id: db.next_id(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        db.categories.push(record.clone());
        Ok(record)
    }

    async fn rename_category(&self, id: i64, name: &str) -> Result<Option<Category>, AppError> {
        let mut db = self.inner.write().await;
        if db.categories.iter().any(|c| c.name == name && c.id != id) {
            return Err(AppError::Conflict("Category name already exists".to_string()));
        }

        Ok(db.categories.iter_mut().find(|c| c.id == id).map(|category| {
            category.name = name.to_string();
            category.updated_at = Utc::now();
            category.clone()
        }))
    }

    async fn delete_category(&self, id: i64) -> Result<bool, AppError> {
        let mut db = self.inner.write().await;
        let before = db.categories.len();
        db.categories.retain(|c| c.id != id);
        Ok(db.categories.len() != before)
    }
}
