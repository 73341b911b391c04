use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::paging::PageWindow;
use crate::users::repo::UserStore;
use crate::users::repo_types::{User, UserCreation, UserUpdate, DELETED_ROLE};

/// Process-local store with the same semantics as the `users` table.
#[derive(Default)]
pub struct MemoryUserStore {
    table: RwLock<Table>,
}

#[derive(Default)]
struct Table {
    rows: BTreeMap<i64, User>,
    last_id: i64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_usize(n: i64) -> usize {
    usize::try_from(n.max(0)).unwrap_or(usize::MAX)
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &UserCreation) -> StoreResult<i64> {
        let mut table = self.table.write().await;
        let id = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Internal("identity sequence exhausted".into()))?;
        table.last_id = id;

        let now = OffsetDateTime::now_utc();
        table.rows.insert(
            id,
            User {
                id,
                username: user.username.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                mobile_number: user.mobile_number.clone(),
                email: user.email.clone(),
                password: user.password.clone(),
                role: user.role,
                created_at: Some(now),
                updated_at: Some(now),
            },
        );
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<User> {
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn count_active(&self) -> StoreResult<i64> {
        let table = self.table.read().await;
        Ok(table.rows.values().filter(|u| u.is_active()).count() as i64)
    }

    async fn list_active(&self, window: PageWindow) -> StoreResult<Vec<User>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|u| u.is_active())
            .skip(to_usize(window.offset))
            .take(to_usize(window.limit))
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, changes: &UserUpdate) -> StoreResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        if let Some(row) = self.table.write().await.rows.get_mut(&id) {
            changes.apply_to(row);
            row.updated_at = Some(OffsetDateTime::now_utc());
        }
        Ok(())
    }

    async fn soft_delete(&self, id: i64) -> StoreResult<()> {
        if let Some(row) = self.table.write().await.rows.get_mut(&id) {
            row.role = DELETED_ROLE;
        }
        Ok(())
    }
}
