//! Router configuration for the sync trigger endpoint.

use axum::{routing::post, Router};
use std::sync::Arc;
use tokio::sync::Mutex;

use orbit_identity_client::IdentityClient;
use orbit_shadow::UserStore;

use crate::config::TriggerConfig;
use crate::handlers::trigger_sync;

/// Shared state for the trigger route.
#[derive(Clone)]
pub struct SyncTriggerState {
    pub store: Arc<dyn UserStore>,
    pub client: Arc<IdentityClient>,
    pub config: Arc<TriggerConfig>,
    /// Serializes sync runs; the job is not safe to run concurrently
    /// against one store.
    pub(crate) sync_guard: Arc<Mutex<()>>,
}

impl SyncTriggerState {
    #[must_use]
    pub fn new(
        store: Arc<dyn UserStore>,
        client: Arc<IdentityClient>,
        config: TriggerConfig,
    ) -> Self {
        Self {
            store,
            client,
            config: Arc::new(config),
            sync_guard: Arc::new(Mutex::new(())),
        }
    }
}

/// Build the trigger router.
///
/// The caller must serve it with connect-info so the guard can see the peer
/// address (`Router::into_make_service_with_connect_info::<SocketAddr>`).
pub fn router(state: SyncTriggerState) -> Router {
    Router::new()
        .route("/internal/users/sync", post(trigger_sync))
        .with_state(state)
}
