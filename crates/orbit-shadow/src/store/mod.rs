//! Local shadow persistence: the row model and the store seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::criteria::Criterion;

pub mod postgres;

#[cfg(feature = "test-util")]
pub mod memory;

pub use postgres::PgUserStore;

/// Authority attributes carried on the struct but outside the local schema.
///
/// Never persisted; populated by the reconciler's read-path refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteAttributes {
    pub service: String,
    pub sub_services: Vec<String>,
    pub roles: Vec<String>,
    pub departments: Vec<String>,
    pub image: String,
    pub is_verified: bool,
}

/// One locally persisted shadow row, keyed by the authority-assigned id.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ShadowUser {
    pub id: i64,
    /// Unique when present; must match the authority's value when non-empty.
    pub national_id: Option<String>,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub phone: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// In-memory remote attributes, not backed by columns.
    #[sqlx(skip)]
    pub remote: RemoteAttributes,
}

impl ShadowUser {
    /// A minimal row as created by the bulk sync job: the id alone, every
    /// other column at its default. Detail is filled lazily on next read.
    #[must_use]
    pub fn minimal(id: i64) -> Self {
        let now = Utc::now();
        Self {
            id,
            national_id: None,
            is_staff: false,
            is_superuser: false,
            phone: String::new(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            username: String::new(),
            created_at: now,
            updated_at: now,
            remote: RemoteAttributes::default(),
        }
    }
}

/// A batch of column changes produced by one merge, flushed in one write.
///
/// The designated fields (`national_id`, `is_staff`, `is_superuser`) are set
/// only when the authority's value differs from the local one; the mirrored
/// profile columns are set unconditionally on every merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldChanges {
    pub national_id: Option<Option<String>>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl FieldChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.persisted_fields().is_empty()
    }

    /// Names of the columns this batch writes, in schema order.
    #[must_use]
    pub fn persisted_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.national_id.is_some() {
            fields.push("national_id");
        }
        if self.is_staff.is_some() {
            fields.push("is_staff");
        }
        if self.is_superuser.is_some() {
            fields.push("is_superuser");
        }
        if self.phone.is_some() {
            fields.push("phone");
        }
        if self.email.is_some() {
            fields.push("email");
        }
        if self.first_name.is_some() {
            fields.push("first_name");
        }
        if self.last_name.is_some() {
            fields.push("last_name");
        }
        if self.username.is_some() {
            fields.push("username");
        }
        fields
    }

    /// Names of the designated (diff-guarded) columns in this batch.
    #[must_use]
    pub fn designated_fields(&self) -> Vec<&'static str> {
        self.persisted_fields()
            .into_iter()
            .filter(|f| matches!(*f, "national_id" | "is_staff" | "is_superuser"))
            .collect()
    }
}

/// Errors from the shadow persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The shadow table has not been migrated yet. A configuration /
    /// migration-ordering problem, never transient.
    #[error("shadow user table does not exist; run migrations first")]
    SchemaMissing,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence seam for shadow rows.
///
/// `find_*` methods apply only the locally-answerable criteria; callers
/// resolve remote criteria to an id set first (see the reconciler).
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Whether the shadow table exists.
    async fn schema_ready(&self) -> Result<bool, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<ShadowUser>, StoreError>;

    /// Fetch the row, creating a minimal one if absent. Returns the row and
    /// whether it was created.
    async fn get_or_create(&self, id: i64) -> Result<(ShadowUser, bool), StoreError>;

    async fn find_by_criteria(
        &self,
        criteria: &[Criterion],
    ) -> Result<Vec<ShadowUser>, StoreError>;

    /// Local query restricted to an id set (the result of a remote filter).
    async fn find_by_ids(
        &self,
        ids: &[i64],
        criteria: &[Criterion],
    ) -> Result<Vec<ShadowUser>, StoreError>;

    async fn list_ids(&self) -> Result<Vec<i64>, StoreError>;

    /// Insert a minimal row for `id`. Returns false if it already existed.
    async fn insert_minimal(&self, id: i64) -> Result<bool, StoreError>;

    /// Delete the given rows, returning how many existed.
    async fn delete_ids(&self, ids: &[i64]) -> Result<u64, StoreError>;

    /// Flush one batch of merged column changes in a single write.
    async fn apply_changes(&self, id: i64, changes: &FieldChanges) -> Result<(), StoreError>;
}
