//! Postgres-backed shadow store.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::criteria::Criterion;
use crate::store::{FieldChanges, ShadowUser, StoreError, UserStore};

/// Embedded migrations for the shadow schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Shadow store over a Postgres pool.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        MIGRATOR.run(&self.pool).await
    }

    fn push_criteria(builder: &mut QueryBuilder<'_, Postgres>, criteria: &[Criterion], mut any: bool) {
        for criterion in criteria {
            builder.push(if any { " AND " } else { " WHERE " });
            any = true;
            match criterion {
                Criterion::Id(id) => {
                    builder.push("id = ").push_bind(*id);
                }
                Criterion::NationalId(value) => {
                    builder.push("national_id = ").push_bind(value.clone());
                }
                Criterion::IsStaff(value) => {
                    builder.push("is_staff = ").push_bind(*value);
                }
                Criterion::IsSuperuser(value) => {
                    builder.push("is_superuser = ").push_bind(*value);
                }
                // Remote-resolvable criteria never reach the store; the
                // reconciler resolves them to an id set first.
                _ => {
                    builder.push("TRUE");
                }
            }
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn schema_ready(&self) -> Result<bool, StoreError> {
        let ready: bool =
            sqlx::query_scalar("SELECT to_regclass('shadow_users') IS NOT NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(ready)
    }

    async fn get(&self, id: i64) -> Result<Option<ShadowUser>, StoreError> {
        let row = sqlx::query_as("SELECT * FROM shadow_users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_or_create(&self, id: i64) -> Result<(ShadowUser, bool), StoreError> {
        let created = self.insert_minimal(id).await?;
        let row = self
            .get(id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok((row, created))
    }

    async fn find_by_criteria(
        &self,
        criteria: &[Criterion],
    ) -> Result<Vec<ShadowUser>, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM shadow_users");
        Self::push_criteria(&mut builder, criteria, false);
        builder.push(" ORDER BY id");
        let rows = builder
            .build_query_as::<ShadowUser>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_ids(
        &self,
        ids: &[i64],
        criteria: &[Criterion],
    ) -> Result<Vec<ShadowUser>, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM shadow_users WHERE id = ANY(");
        builder.push_bind(ids.to_vec());
        builder.push(")");
        Self::push_criteria(&mut builder, criteria, true);
        builder.push(" ORDER BY id");
        let rows = builder
            .build_query_as::<ShadowUser>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_ids(&self) -> Result<Vec<i64>, StoreError> {
        let ids = sqlx::query_scalar("SELECT id FROM shadow_users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn insert_minimal(&self, id: i64) -> Result<bool, StoreError> {
        let result =
            sqlx::query("INSERT INTO shadow_users (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_ids(&self, ids: &[i64]) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM shadow_users WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn apply_changes(&self, id: i64, changes: &FieldChanges) -> Result<(), StoreError> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE shadow_users SET updated_at = NOW()");
        if let Some(value) = &changes.national_id {
            builder.push(", national_id = ").push_bind(value.clone());
        }
        if let Some(value) = changes.is_staff {
            builder.push(", is_staff = ").push_bind(value);
        }
        if let Some(value) = changes.is_superuser {
            builder.push(", is_superuser = ").push_bind(value);
        }
        if let Some(value) = &changes.phone {
            builder.push(", phone = ").push_bind(value.clone());
        }
        if let Some(value) = &changes.email {
            builder.push(", email = ").push_bind(value.clone());
        }
        if let Some(value) = &changes.first_name {
            builder.push(", first_name = ").push_bind(value.clone());
        }
        if let Some(value) = &changes.last_name {
            builder.push(", last_name = ").push_bind(value.clone());
        }
        if let Some(value) = &changes.username {
            builder.push(", username = ").push_bind(value.clone());
        }
        builder.push(" WHERE id = ").push_bind(id);

        builder.build().execute(&self.pool).await?;
        Ok(())
    }
}
