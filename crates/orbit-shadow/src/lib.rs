//! Local shadow user store for the Orbit identity authority.
//!
//! Keeps one locally persisted row per remote user for join-ability and
//! local authorization checks, reconciled against the authority on read and
//! converged in bulk by the sync job.

pub mod criteria;
pub mod reconciler;
pub mod store;
pub mod sync;

pub use criteria::Criterion;
pub use reconciler::{merge_remote_fields, ReconcileError, ShadowReconciler};
pub use store::{FieldChanges, PgUserStore, RemoteAttributes, ShadowUser, StoreError, UserStore};
pub use sync::{sync_users, SyncError, SyncOutcome};
