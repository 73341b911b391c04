use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::StoreResult;
use crate::paging::PageWindow;
use crate::users::repo_types::{User, UserCreation, UserUpdate, DELETED_ROLE};

/// Persistence boundary for user rows.
///
/// Each method is one independent statement; nothing here spans a transaction.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a row and returns the store-assigned identity.
    async fn insert(&self, user: &UserCreation) -> StoreResult<i64>;

    /// Fetches a row by identity regardless of role.
    async fn find_by_id(&self, id: i64) -> StoreResult<User>;

    /// Number of rows whose role is not the deleted sentinel.
    async fn count_active(&self) -> StoreResult<i64>;

    /// Active rows ordered by identity within `window`.
    async fn list_active(&self, window: PageWindow) -> StoreResult<Vec<User>>;

    /// Overwrites the columns set in `changes`. Missing rows are not an error.
    async fn update(&self, id: i64, changes: &UserUpdate) -> StoreResult<()>;

    /// Sets role to the deleted sentinel. Missing rows are not an error.
    async fn soft_delete(&self, id: i64) -> StoreResult<()>;
}

const USER_COLUMNS: &str = "id, username, first_name, last_name, mobile_number, email, password, role, created_at, updated_at";

/// `UPDATE` touching only the columns set in `changes`, plus `updated_at`.
/// `None` when there is nothing to write.
fn update_query(id: i64, changes: &UserUpdate) -> Option<QueryBuilder<'_, Postgres>> {
    if changes.is_empty() {
        return None;
    }

    let mut qb = QueryBuilder::new("UPDATE users SET ");
    {
        let mut set = qb.separated(", ");
        for (column, value) in changes.text_columns() {
            set.push(format!("{column} = "));
            set.push_bind_unseparated(value);
        }
        if let Some(role) = changes.role {
            set.push("role = ");
            set.push_bind_unseparated(role);
        }
        set.push("updated_at = NOW()");
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    Some(qb)
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &UserCreation) -> StoreResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, first_name, last_name, mobile_number, email, password, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.mobile_number)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role)
        .fetch_one(&self.db)
        .await?;
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 ORDER BY id LIMIT 1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_one(&self.db)
            .await?;
        Ok(user)
    }

    async fn count_active(&self) -> StoreResult<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role <> $1")
            .bind(DELETED_ROLE)
            .fetch_one(&self.db)
            .await?;
        Ok(total)
    }

    async fn list_active(&self, window: PageWindow) -> StoreResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role <> $1 ORDER BY id LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, User>(&sql)
            .bind(DELETED_ROLE)
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn update(&self, id: i64, changes: &UserUpdate) -> StoreResult<()> {
        let Some(mut qb) = update_query(id, changes) else {
            return Ok(());
        };
        qb.build().execute(&self.db).await?;
        Ok(())
    }

    async fn soft_delete(&self, id: i64) -> StoreResult<()> {
        sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(DELETED_ROLE)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
