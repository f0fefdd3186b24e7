//! Shadow reconciler: local-first reads with remote fallback and a
//! field-level merge policy.
//!
//! The remote authority is the source of truth; local rows are a cache of it
//! plus local authorization flags. Every record handed to a caller is first
//! refreshed from the authority — best-effort, a failed refresh never fails
//! an otherwise-successful local read.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use orbit_identity_client::{proto, IdentityClient, IdentityError, UserSelector};

use crate::criteria::{split_local_remote, to_filter_criteria, Criterion};
use crate::store::{FieldChanges, RemoteAttributes, ShadowUser, StoreError, UserStore};

/// Errors from the reconciling read paths.
///
/// Remote errors appear here only when the *resolution* of a query needed
/// the authority (remote-resolvable criteria); refresh failures are
/// swallowed.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Remote(#[from] IdentityError),
}

/// Reconciling facade over the shadow store and the identity client.
pub struct ShadowReconciler {
    store: Arc<dyn UserStore>,
    client: Arc<IdentityClient>,
}

impl ShadowReconciler {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, client: Arc<IdentityClient>) -> Self {
        Self { store, client }
    }

    /// Fetch the first user matching the criteria, refreshed from the
    /// authority.
    pub async fn get(&self, criteria: &[Criterion]) -> Result<Option<ShadowUser>, ReconcileError> {
        let mut users = self.resolve(criteria).await?;
        let mut user = if users.is_empty() {
            None
        } else {
            Some(users.swap_remove(0))
        };
        if let Some(user) = user.as_mut() {
            self.refresh(user).await;
        }
        Ok(user)
    }

    /// Fetch every user matching the criteria, each refreshed from the
    /// authority.
    pub async fn filter(
        &self,
        criteria: &[Criterion],
    ) -> Result<Vec<ShadowUser>, ReconcileError> {
        let mut users = self.resolve(criteria).await?;
        for user in &mut users {
            self.refresh(user).await;
        }
        Ok(users)
    }

    /// Every known shadow user, refreshed.
    pub async fn all(&self) -> Result<Vec<ShadowUser>, ReconcileError> {
        self.filter(&[]).await
    }

    /// Verify a login token with the authority, materialize the shadow row
    /// for the token's user and refresh it.
    pub async fn authenticate(&self, token: &str) -> Result<ShadowUser, ReconcileError> {
        let user_id = self.client.verify_login(token).await?;
        let (mut user, created) = self.store.get_or_create(user_id).await?;
        if created {
            debug!(user_id, "created shadow row for authenticated user");
        }
        self.refresh(&mut user).await;
        Ok(user)
    }

    /// Two-step query resolution: answer locally when every criterion is
    /// locally known; otherwise resolve the remote criteria to an id set and
    /// restrict the local query to it.
    async fn resolve(&self, criteria: &[Criterion]) -> Result<Vec<ShadowUser>, ReconcileError> {
        let (local, remote) = split_local_remote(criteria);
        if remote.is_empty() {
            return Ok(self.store.find_by_criteria(&local).await?);
        }

        let filter = to_filter_criteria(&remote);
        let matches = self.client.filter_users(&filter).await?;
        let ids = matches.get("user_id").cloned().unwrap_or_default();
        Ok(self.store.find_by_ids(&ids, &local).await?)
    }

    /// Best-effort refresh of one row from the authority.
    ///
    /// On success the merged changes are flushed in a single write; on any
    /// failure the local record stands as last known state.
    pub async fn refresh(&self, user: &mut ShadowUser) {
        let remote = match self.client.fetch_user(&UserSelector::Id(user.id)).await {
            Ok(remote) => remote,
            Err(error) => {
                warn!(
                    user_id = user.id,
                    error = %error,
                    "remote refresh failed; returning local record"
                );
                return;
            }
        };

        let changes = merge_remote_fields(user, &remote);
        if changes.is_empty() {
            return;
        }
        if let Err(error) = self.store.apply_changes(user.id, &changes).await {
            warn!(
                user_id = user.id,
                error = %error,
                "persisting refreshed fields failed; returning merged in-memory record"
            );
        }
    }
}

/// Merge an authority record into a local row, returning the batch of
/// column changes to persist.
///
/// Designated fields (`national_id`, `is_staff`, `is_superuser`) are
/// overwritten and queued for persistence only when the authority's value
/// differs. Mirrored profile columns take the remote value unconditionally.
/// Attributes outside the local schema land on [`ShadowUser::remote`] and
/// are never persisted.
pub fn merge_remote_fields(local: &mut ShadowUser, remote: &proto::UserRecord) -> FieldChanges {
    let mut changes = FieldChanges::default();

    let remote_national_id = if remote.national_id.is_empty() {
        None
    } else {
        Some(remote.national_id.clone())
    };
    if local.national_id != remote_national_id {
        local.national_id = remote_national_id.clone();
        changes.national_id = Some(remote_national_id);
    }
    if local.is_staff != remote.is_staff {
        local.is_staff = remote.is_staff;
        changes.is_staff = Some(remote.is_staff);
    }
    if local.is_superuser != remote.is_superuser {
        local.is_superuser = remote.is_superuser;
        changes.is_superuser = Some(remote.is_superuser);
    }

    local.phone = remote.phone.clone();
    changes.phone = Some(remote.phone.clone());
    local.email = remote.email.clone();
    changes.email = Some(remote.email.clone());
    local.first_name = remote.first_name.clone();
    changes.first_name = Some(remote.first_name.clone());
    local.last_name = remote.last_name.clone();
    changes.last_name = Some(remote.last_name.clone());
    local.username = remote.username.clone();
    changes.username = Some(remote.username.clone());

    local.remote = RemoteAttributes {
        service: remote.service.clone(),
        sub_services: remote.sub_services.clone(),
        roles: remote.roles.clone(),
        departments: remote.departments.clone(),
        image: remote.image.clone(),
        is_verified: remote.is_verified,
    };

    changes
}
