//! Client library for the Orbit identity authority.
//!
//! A service links this crate to treat the central identity authority as the
//! source of truth for user identity: one shared secured connection, a typed
//! operation surface, TTL-bound record caching and a closed error taxonomy.
//! The companion `orbit-shadow` crate keeps a local shadow row per user in
//! sync with the authority's membership set.

pub mod cache;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod transport;

#[cfg(feature = "test-util")]
pub mod testing;

/// Vendored protobuf types and generated client for `authority.v1`.
///
/// Pre-generated so consumers don't need `protoc` at build time.
pub mod proto {
    #![allow(clippy::all)]
    #![allow(missing_docs)]

    include!("generated/authority.v1.rs");
}

pub use client::{FilterCriteria, IdentityClient, NewUser, UserSelector, UserUpdate};
pub use config::{AuthorityConfig, ConfigError, AUTHORITY_PORT, DEFAULT_CACHE_TTL_SECS};
pub use error::{IdentityError, IdentityResult};
