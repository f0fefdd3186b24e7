//! Access guard for the sync trigger endpoint.
//!
//! Three checks run in order, all before the job: the client IP (first hop
//! of `x-forwarded-for` when present, else the peer address) must equal the
//! trusted IP, the `x-service-origin` header must equal the trusted origin,
//! and the JSON body must carry `password` equal to the shared secret. The
//! caller receives a uniform rejection; the failing check is only logged.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};
use tracing::warn;

use crate::config::TriggerConfig;

/// Origin header the trigger requires.
pub const ORIGIN_HEADER: &str = "x-service-origin";

/// Why a trigger request was rejected. Logged, never sent to the caller.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GuardRejection {
    #[error("untrusted client ip: {0}")]
    UntrustedIp(IpAddr),

    #[error("missing or mismatched origin header")]
    BadOrigin,

    #[error("request body is not a JSON object with a password")]
    MalformedBody,

    #[error("shared secret mismatch")]
    BadSecret,
}

/// The effective client IP: first hop of `x-forwarded-for` when the request
/// came through a proxy, otherwise the socket peer address.
#[must_use]
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> IpAddr {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first_hop| first_hop.trim().parse::<IpAddr>().ok())
        .unwrap_or_else(|| peer.ip())
}

/// Run every check; a failing one rejects the request before the job runs.
pub fn authorize(
    config: &TriggerConfig,
    headers: &HeaderMap,
    peer: SocketAddr,
    body: &str,
) -> Result<(), GuardRejection> {
    let ip = client_ip(headers, peer);
    if ip != config.trusted_ip {
        warn!(client_ip = %ip, "sync trigger rejected: untrusted ip");
        return Err(GuardRejection::UntrustedIp(ip));
    }

    let origin = headers
        .get(ORIGIN_HEADER)
        .and_then(|value| value.to_str().ok());
    if origin != Some(config.trusted_origin.as_str()) {
        warn!(origin = ?origin, "sync trigger rejected: invalid origin header");
        return Err(GuardRejection::BadOrigin);
    }

    let password = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("password").and_then(|p| p.as_str().map(String::from)));
    let Some(password) = password else {
        warn!("sync trigger rejected: unparseable body");
        return Err(GuardRejection::MalformedBody);
    };

    if password != config.shared_secret {
        warn!("sync trigger rejected: invalid shared secret");
        return Err(GuardRejection::BadSecret);
    }

    Ok(())
}
