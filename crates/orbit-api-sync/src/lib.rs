//! Operator trigger endpoint for the Orbit shadow user sync.
//!
//! One route, guarded by a trusted IP, an origin header and a shared
//! secret, that runs the bulk sync job on demand.

pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod router;

pub use config::{ConfigError, TriggerConfig};
pub use error::ApiSyncError;
pub use router::{router, SyncTriggerState};
