//! Connection manager: one shared, lazily-established connection with a
//! bounded recovery policy.
//!
//! Every remote call goes through [`ConnectionManager::invoke`]. If a call
//! fails with a transient status (unavailable, internal, deadline exceeded,
//! unknown), the manager replaces the connection at most once per failure
//! episode and retries the same call exactly once against the replacement.
//! Any other error, or a second failure, is handed to the error translator
//! unmodified. This bounds recovery cost to one extra attempt per call.

use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::Mutex;
use tonic::Status;
use tracing::{debug, warn};

use crate::error::{is_transient_code, translate_status, IdentityError};
use crate::transport::{AuthorityConnector, AuthorityTransport};

/// Owns the lifecycle of the shared authority connection.
///
/// Construction does not connect; the connection is established on first use
/// and replaced under a single mutex, so concurrent callers observing the
/// same failure trigger exactly one replacement.
pub struct ConnectionManager {
    connector: Box<dyn AuthorityConnector>,
    transport: Mutex<Option<Arc<dyn AuthorityTransport>>>,
}

impl ConnectionManager {
    #[must_use]
    pub fn new(connector: Box<dyn AuthorityConnector>) -> Self {
        Self {
            connector,
            transport: Mutex::new(None),
        }
    }

    /// Run one remote call with the single-reconnect recovery policy.
    ///
    /// `call` is invoked with the current transport; it must be repeatable
    /// because it may run a second time against a fresh connection.
    pub async fn invoke<T, F>(&self, operation: &str, call: F) -> Result<T, IdentityError>
    where
        F: for<'a> Fn(&'a dyn AuthorityTransport) -> BoxFuture<'a, Result<T, Status>>,
    {
        let transport = self.current().await?;

        match call(transport.as_ref()).await {
            Ok(value) => Ok(value),
            Err(status) if is_transient_code(status.code()) => {
                debug!(
                    operation,
                    code = ?status.code(),
                    "transient failure, replacing connection and retrying once"
                );
                let fresh = self.replace(&transport).await?;
                call(fresh.as_ref()).await.map_err(|retry_status| {
                    warn!(
                        operation,
                        code = ?retry_status.code(),
                        "retry after reconnect failed"
                    );
                    translate_status(operation, retry_status)
                })
            }
            Err(status) => Err(translate_status(operation, status)),
        }
    }

    /// The current transport, connecting lazily on first use.
    async fn current(&self) -> Result<Arc<dyn AuthorityTransport>, IdentityError> {
        let mut guard = self.transport.lock().await;
        if let Some(transport) = guard.as_ref() {
            return Ok(Arc::clone(transport));
        }
        let fresh = self.connector.connect().await?;
        *guard = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    /// Replace the connection observed to have failed.
    ///
    /// If another caller already swapped it out (the stored transport is no
    /// longer the one we saw fail), the existing replacement is reused so a
    /// single failure episode causes a single reconnect.
    async fn replace(
        &self,
        stale: &Arc<dyn AuthorityTransport>,
    ) -> Result<Arc<dyn AuthorityTransport>, IdentityError> {
        let mut guard = self.transport.lock().await;
        if let Some(current) = guard.as_ref() {
            if !Arc::ptr_eq(current, stale) {
                return Ok(Arc::clone(current));
            }
        }
        let fresh = self.connector.connect().await?;
        *guard = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    /// Drop the connection, releasing its network resources.
    ///
    /// Registered as a teardown action by the hosting process; a later call
    /// would reconnect lazily.
    pub async fn close(&self) {
        let mut guard = self.transport.lock().await;
        *guard = None;
    }
}
