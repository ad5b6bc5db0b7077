//! Persistence ports.
//!
//! Services only talk to these traits. `postgres` is the production adapter,
//! `memory` backs development runs without a database and the test suite.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        category::Category,
        status::{NewStatus, Status, StatusFilter, StatusPatch, StatusWithOwner},
        user::{NewUser, Role, User},
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    /// Returns `None` when no user has this id.
    async fn set_user_role(&self, id: i64, role: Role) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait StatusRepository: Send + Sync {
    async fn insert_status(&self, status: NewStatus, owner_id: i64) -> Result<Status, AppError>;

    async fn find_status(&self, id: i64) -> Result<Option<Status>, AppError>;

    /// Newest first, owner joined in.
    async fn query_statuses(
        &self,
        filter: &StatusFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<StatusWithOwner>, AppError>;

    async fn count_statuses(&self, filter: &StatusFilter) -> Result<i64, AppError>;

    /// Every status, newest first, owner joined in.
    async fn list_statuses_with_owner(&self) -> Result<Vec<StatusWithOwner>, AppError>;

    /// Unique category strings currently used by statuses, sorted.
    async fn distinct_categories(&self) -> Result<Vec<String>, AppError>;

    /// Returns `None` when no status has this id.
    async fn update_status(&self, id: i64, patch: StatusPatch) -> Result<Option<Status>, AppError>;

    /// Returns `false` when nothing was deleted.
    async fn delete_status(&self, id: i64) -> Result<bool, AppError>;

    async fn count_statuses_in_category(&self, category: &str) -> Result<i64, AppError>;

    /// Rewrites `category` on every status using `from`. Returns the number touched.
    async fn reassign_category(&self, from: &str, to: &str) -> Result<u64, AppError>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Newest first.
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;

    async fn find_category(&self, id: i64) -> Result<Option<Category>, AppError>;

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, AppError>;

    /// Fails with `Conflict` when the name is taken.
    async fn insert_category(&self, name: &str) -> Result<Category, AppError>;

    /// Returns `None` when no category has this id.
    async fn rename_category(&self, id: i64, name: &str) -> Result<Option<Category>, AppError>;

    /// Returns `false` when nothing was deleted.
    async fn delete_category(&self, id: i64) -> Result<bool, AppError>;
}

/// The full document store.
pub trait Store: UserRepository + StatusRepository + CategoryRepository {}

impl<T> Store for T where T: UserRepository + StatusRepository + CategoryRepository {}

pub type SharedStore = Arc<dyn Store>;
