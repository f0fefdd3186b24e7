//! Bulk sync job: one-shot convergence of the local id set onto the
//! authority's membership set.
//!
//! The job costs exactly one remote call regardless of user count: created
//! rows are minimal (id only), their detail filled lazily on next read by
//! the reconciler. Re-running with no remote change yields an empty diff.

use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::info;

use orbit_identity_client::{FilterCriteria, IdentityClient, IdentityError};

use crate::store::{StoreError, UserStore};

/// Counts reported by one completed sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub created: usize,
    pub deleted: usize,
}

/// Errors aborting a sync run. A run either reports counts or reports one
/// of these, never both.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The shadow table has not been migrated yet; a configuration /
    /// migration-ordering error, not a transient one.
    #[error("shadow user table does not exist; run migrations before syncing")]
    SchemaMissing,

    #[error(transparent)]
    Remote(#[from] IdentityError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Diff the full local id set against the full remote id set and apply
/// creates and deletes to converge the local store.
///
/// Not safe to run concurrently against the same store; callers serialize
/// runs (the trigger endpoint holds a mutex across each run).
pub async fn sync_users(
    store: &dyn UserStore,
    client: &IdentityClient,
) -> Result<SyncOutcome, SyncError> {
    if !store.schema_ready().await? {
        return Err(SyncError::SchemaMissing);
    }

    let matches = client.filter_users(&FilterCriteria::default()).await?;
    let remote_ids: BTreeSet<i64> = matches
        .get("user_id")
        .into_iter()
        .flatten()
        .copied()
        .collect();
    let local_ids: BTreeSet<i64> = store.list_ids().await?.into_iter().collect();

    let to_create: Vec<i64> = remote_ids.difference(&local_ids).copied().collect();
    let to_delete: Vec<i64> = local_ids.difference(&remote_ids).copied().collect();

    let mut created = 0;
    for id in &to_create {
        if store.insert_minimal(*id).await? {
            created += 1;
        }
    }
    let deleted = store.delete_ids(&to_delete).await? as usize;

    info!(created, deleted, "shadow user sync completed");
    Ok(SyncOutcome { created, deleted })
}
