use std::time::Duration;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, postgres::PgPoolOptions};

use crate::{
    error::AppError,
    models::{
        category::Category,
        status::{NewStatus, Status, StatusFilter, StatusPatch, StatusWithOwner},
        user::{NewUser, OwnerSummary, Role, User},
    },
    store::{CategoryRepository, StatusRepository, UserRepository},
};

const MAX_CONNECT_ATTEMPTS: u32 = 5;

const USER_COLUMNS: &str = "id, name, email, password, role, created_at";
const STATUS_COLUMNS: &str = "id, title, description, category, user_id, created_at, updated_at";
const CATEGORY_COLUMNS: &str = "id, name, created_at, updated_at";

/// Status row joined with its owner.
#[derive(Debug, FromRow)]
struct StatusOwnerRow {
    id: i64,
    title: String,
    description: String,
    category: String,
    user_id: i64,
    owner_name: Option<String>,
    owner_email: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<StatusOwnerRow> for StatusWithOwner {
    fn from(row: StatusOwnerRow) -> Self {
        let user = match (row.owner_name, row.owner_email) {
            (Some(name), Some(email)) => Some(OwnerSummary {
                id: row.user_id,
                name,
                email,
            }),
            _ => None,
        };

        StatusWithOwner {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            user,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Turns a search term into an `ILIKE` pattern matching it literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_status_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &StatusFilter) {
    builder.push(" WHERE TRUE");

    if let Some(category) = &filter.category {
        builder.push(" AND s.category = ");
        builder.push_bind(category.clone());
    }

    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        builder.push(" AND (s.title ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" ESCAPE '\\' OR s.description ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" ESCAPE '\\' OR s.category ILIKE ");
        builder.push_bind(pattern);
        builder.push(" ESCAPE '\\')");
    }
}

fn joined_status_select() -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(
        r#"
        SELECT
            s.id, s.title, s.description, s.category, s.user_id,
            u.name AS owner_name, u.email AS owner_email,
            s.created_at, s.updated_at
        FROM statuses s
        LEFT JOIN users u ON u.id = s.user_id
        "#,
    )
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects with a short retry loop, for databases that start after us.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let mut attempt = 0;
        loop {
            match PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await
            {
                Ok(pool) => return Ok(Self::new(pool)),
                Err(e) if attempt < MAX_CONNECT_ATTEMPTS => {
                    attempt += 1;
                    tracing::warn!(
                        "Database not ready, retrying in 2s... (Attempt {}): {}",
                        attempt,
                        e
                    );
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password, role) VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("User already exists".to_string())
            } else {
                tracing::error!("Failed to insert user: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id DESC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list users: {:?}", e);
                AppError::from(e)
            })?;
        Ok(users)
    }

    async fn set_user_role(&self, id: i64, role: Role) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = $1 WHERE id = $2 RETURNING {USER_COLUMNS}"
        ))
        .bind(role.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl StatusRepository for PgStore {
    async fn insert_status(&self, status: NewStatus, owner_id: i64) -> Result<Status, AppError> {
        sqlx::query_as::<_, Status>(&format!(
            r#"
            INSERT INTO statuses (title, description, category, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {STATUS_COLUMNS}
            "#
        ))
        .bind(&status.title)
        .bind(&status.description)
        .bind(&status.category)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create status: {:?}", e);
            AppError::from(e)
        })
    }

    async fn find_status(&self, id: i64) -> Result<Option<Status>, AppError> {
        let status =
            sqlx::query_as::<_, Status>(&format!("SELECT {STATUS_COLUMNS} FROM statuses WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(status)
    }

    async fn query_statuses(
        &self,
        filter: &StatusFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<StatusWithOwner>, AppError> {
        let mut builder = joined_status_select();
        push_status_filter(&mut builder, filter);
        builder.push(" ORDER BY s.created_at DESC, s.id DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(skip);

        let rows = builder
            .build_query_as::<StatusOwnerRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list statuses: {:?}", e);
                AppError::from(e)
            })?;

        Ok(rows.into_iter().map(StatusWithOwner::from).collect())
    }

    async fn count_statuses(&self, filter: &StatusFilter) -> Result<i64, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM statuses s");
        push_status_filter(&mut builder, filter);

        let (total,): (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn list_statuses_with_owner(&self) -> Result<Vec<StatusWithOwner>, AppError> {
        let mut builder = joined_status_select();
        builder.push(" ORDER BY s.created_at DESC, s.id DESC");

        let rows = builder
            .build_query_as::<StatusOwnerRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(StatusWithOwner::from).collect())
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, AppError> {
        let names: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT category FROM statuses ORDER BY category")
                .fetch_all(&self.pool)
                .await?;
        Ok(names)
    }

    async fn update_status(&self, id: i64, patch: StatusPatch) -> Result<Option<Status>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE statuses SET updated_at = NOW()");

        if let Some(title) = patch.title {
            builder.push(", title = ");
            builder.push_bind(title);
        }

        if let Some(description) = patch.description {
            builder.push(", description = ");
            builder.push_bind(description);
        }

        if let Some(category) = patch.category {
            builder.push(", category = ");
            builder.push_bind(category);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING ");
        builder.push(STATUS_COLUMNS);

        let status = builder
            .build_query_as::<Status>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update status: {:?}", e);
                AppError::from(e)
            })?;
        Ok(status)
    }

    async fn delete_status(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM statuses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete status: {:?}", e);
                AppError::from(e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_statuses_in_category(&self, category: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM statuses WHERE category = $1")
            .bind(category)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn reassign_category(&self, from: &str, to: &str) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE statuses SET category = $1, updated_at = NOW() WHERE category = $2",
        )
        .bind(to)
        .bind(from)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl CategoryRepository for PgStore {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn insert_category(&self, name: &str) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (name) VALUES ($1) RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Category \"{}\" already exists", name))
            } else {
                tracing::error!("Failed to create category: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn rename_category(&self, id: i64, name: &str) -> Result<Option<Category>, AppError> {
        sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories SET name = $1, updated_at = NOW() WHERE id = $2 RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Category name already exists".to_string())
            } else {
                tracing::error!("Failed to rename category: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn delete_category(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete category: {:?}", e);
                AppError::from(e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
