//! Trigger endpoint handler.

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use tracing::info;

use orbit_shadow::sync_users;

use crate::error::ApiSyncError;
use crate::guard;
use crate::router::SyncTriggerState;

/// Completion acknowledgement for a triggered sync run.
#[derive(Debug, Serialize)]
pub struct SyncAck {
    pub status: &'static str,
    pub created: usize,
    pub deleted: usize,
}

/// Run the bulk sync job on demand.
///
/// Every access check runs before the job; runs are serialized so two
/// triggers cannot race on the same store.
pub async fn trigger_sync(
    State(state): State<SyncTriggerState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<SyncAck>, ApiSyncError> {
    guard::authorize(&state.config, &headers, peer, &body)?;

    let _run = state.sync_guard.lock().await;
    let outcome = sync_users(state.store.as_ref(), &state.client).await?;

    info!(
        created = outcome.created,
        deleted = outcome.deleted,
        "sync trigger completed"
    );
    Ok(Json(SyncAck {
        status: "done",
        created: outcome.created,
        deleted: outcome.deleted,
    }))
}
