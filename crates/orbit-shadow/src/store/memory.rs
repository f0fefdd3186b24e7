//! In-memory shadow store for tests.
//!
//! Behaves like the Postgres store over a `BTreeMap` and journals every
//! applied change batch so tests can assert on the merge policy's
//! persistence behavior.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use crate::criteria::Criterion;
use crate::store::{FieldChanges, ShadowUser, StoreError, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    rows: RwLock<BTreeMap<i64, ShadowUser>>,
    schema_ready: AtomicBool,
    /// Journal of `(id, changes)` batches, in application order.
    pub applied: Mutex<Vec<(i64, FieldChanges)>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema_ready: AtomicBool::new(true),
            ..Default::default()
        }
    }

    /// Simulate a store whose migrations have not run.
    pub fn set_schema_ready(&self, ready: bool) {
        self.schema_ready.store(ready, Ordering::SeqCst);
    }

    /// Seed a row directly.
    pub fn insert_row(&self, row: ShadowUser) {
        self.rows.write().unwrap().insert(row.id, row);
    }

    /// Current state of a row, if any.
    pub fn row(&self, id: i64) -> Option<ShadowUser> {
        self.rows.read().unwrap().get(&id).cloned()
    }

    /// Number of change batches applied so far.
    pub fn applied_count(&self) -> usize {
        self.applied.lock().unwrap().len()
    }

    fn matches(row: &ShadowUser, criteria: &[Criterion]) -> bool {
        criteria.iter().all(|criterion| match criterion {
            Criterion::Id(id) => row.id == *id,
            Criterion::NationalId(value) => row.national_id.as_deref() == Some(value.as_str()),
            Criterion::IsStaff(value) => row.is_staff == *value,
            Criterion::IsSuperuser(value) => row.is_superuser == *value,
            // Remote-resolvable criteria never reach the store.
            _ => true,
        })
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn schema_ready(&self) -> Result<bool, StoreError> {
        Ok(self.schema_ready.load(Ordering::SeqCst))
    }

    async fn get(&self, id: i64) -> Result<Option<ShadowUser>, StoreError> {
        Ok(self.row(id))
    }

    async fn get_or_create(&self, id: i64) -> Result<(ShadowUser, bool), StoreError> {
        let created = self.insert_minimal(id).await?;
        Ok((self.row(id).expect("row just ensured"), created))
    }

    async fn find_by_criteria(
        &self,
        criteria: &[Criterion],
    ) -> Result<Vec<ShadowUser>, StoreError> {
        let rows = self.rows.read().unwrap();
        Ok(rows
            .values()
            .filter(|row| Self::matches(row, criteria))
            .cloned()
            .collect())
    }

    async fn find_by_ids(
        &self,
        ids: &[i64],
        criteria: &[Criterion],
    ) -> Result<Vec<ShadowUser>, StoreError> {
        let rows = self.rows.read().unwrap();
        Ok(rows
            .values()
            .filter(|row| ids.contains(&row.id) && Self::matches(row, criteria))
            .cloned()
            .collect())
    }

    async fn list_ids(&self) -> Result<Vec<i64>, StoreError> {
        Ok(self.rows.read().unwrap().keys().copied().collect())
    }

    async fn insert_minimal(&self, id: i64) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().unwrap();
        if rows.contains_key(&id) {
            return Ok(false);
        }
        rows.insert(id, ShadowUser::minimal(id));
        Ok(true)
    }

    async fn delete_ids(&self, ids: &[i64]) -> Result<u64, StoreError> {
        let mut rows = self.rows.write().unwrap();
        let mut deleted = 0;
        for id in ids {
            if rows.remove(id).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn apply_changes(&self, id: i64, changes: &FieldChanges) -> Result<(), StoreError> {
        let mut rows = self.rows.write().unwrap();
        let row = rows.get_mut(&id).ok_or(StoreError::Database(
            sqlx::Error::RowNotFound,
        ))?;

        if let Some(value) = &changes.national_id {
            row.national_id = value.clone();
        }
        if let Some(value) = changes.is_staff {
            row.is_staff = value;
        }
        if let Some(value) = changes.is_superuser {
            row.is_superuser = value;
        }
        if let Some(value) = &changes.phone {
            row.phone = value.clone();
        }
        if let Some(value) = &changes.email {
            row.email = value.clone();
        }
        if let Some(value) = &changes.first_name {
            row.first_name = value.clone();
        }
        if let Some(value) = &changes.last_name {
            row.last_name = value.clone();
        }
        if let Some(value) = &changes.username {
            row.username = value.clone();
        }
        row.updated_at = Utc::now();

        self.applied.lock().unwrap().push((id, changes.clone()));
        Ok(())
    }
}
