//! Error-to-response mapping for the trigger endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use orbit_shadow::SyncError;

use crate::guard::GuardRejection;

/// Error type for the sync trigger endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ApiSyncError {
    /// An access check failed. The specific check is logged, not returned.
    #[error("forbidden")]
    Forbidden(#[from] GuardRejection),

    /// The sync job itself failed.
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl IntoResponse for ApiSyncError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiSyncError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden".to_string()),
            ApiSyncError::Sync(SyncError::SchemaMissing) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            ApiSyncError::Sync(SyncError::Remote(remote)) => {
                (StatusCode::BAD_GATEWAY, remote.to_string())
            }
            ApiSyncError::Sync(SyncError::Store(store)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, store.to_string())
            }
        };
        (status, Json(json!({ "error": detail }))).into_response()
    }
}
