//! Integration tests for the sync trigger endpoint.
//!
//! The router is exercised with `tower::ServiceExt::oneshot`; the peer
//! address is injected the way the serve layer would provide it.

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::connect_info::ConnectInfo;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use orbit_api_sync::{router, SyncTriggerState, TriggerConfig};
use orbit_identity_client::testing::{sample_user, FakeAuthority};
use orbit_identity_client::IdentityClient;
use orbit_shadow::store::memory::MemoryUserStore;
use orbit_shadow::{ShadowUser, UserStore};

const TRUSTED_IP: &str = "10.0.0.1";
const TRUSTED_ORIGIN: &str = "orbit-admin";
const SECRET: &str = "s3cret";

struct Fixture {
    authority: Arc<FakeAuthority>,
    store: Arc<MemoryUserStore>,
    app: axum::Router,
}

fn fixture() -> Fixture {
    let authority = FakeAuthority::new();
    let client = Arc::new(IdentityClient::with_connector(
        authority.connector(),
        "billing",
        "billing-api",
        60,
    ));
    let store = Arc::new(MemoryUserStore::new());
    let config = TriggerConfig {
        trusted_ip: TRUSTED_IP.parse().unwrap(),
        trusted_origin: TRUSTED_ORIGIN.into(),
        shared_secret: SECRET.into(),
    };
    let state = SyncTriggerState::new(
        Arc::clone(&store) as Arc<dyn UserStore>,
        client,
        config,
    );
    Fixture {
        authority,
        store,
        app: router(state),
    }
}

struct RequestSpec<'a> {
    peer: &'a str,
    forwarded_for: Option<&'a str>,
    origin: Option<&'a str>,
    body: String,
}

impl Default for RequestSpec<'_> {
    fn default() -> Self {
        Self {
            peer: TRUSTED_IP,
            forwarded_for: None,
            origin: Some(TRUSTED_ORIGIN),
            body: format!(r#"{{"password": "{SECRET}"}}"#),
        }
    }
}

fn build_request(spec: RequestSpec<'_>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/internal/users/sync")
        .header("content-type", "application/json");
    if let Some(forwarded) = spec.forwarded_for {
        builder = builder.header("x-forwarded-for", forwarded);
    }
    if let Some(origin) = spec.origin {
        builder = builder.header("x-service-origin", origin);
    }
    let mut request = builder.body(Body::from(spec.body)).unwrap();
    let peer: SocketAddr = format!("{}:52000", spec.peer).parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

#[tokio::test]
async fn test_successful_trigger_reports_counts() {
    let fx = fixture();
    for id in [2, 3, 4] {
        fx.authority.add_user(sample_user(id));
    }
    for id in [1, 2, 3] {
        fx.store.insert_row(ShadowUser::minimal(id));
    }

    let response = fx.app.oneshot(build_request(RequestSpec::default())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let ack: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(ack["status"], "done");
    assert_eq!(ack["created"], 1);
    assert_eq!(ack["deleted"], 1);
    assert_eq!(fx.store.list_ids().await.unwrap(), vec![2, 3, 4]);
}

#[tokio::test]
async fn test_wrong_secret_is_rejected_before_the_job_runs() {
    let fx = fixture();
    fx.authority.add_user(sample_user(1));

    let response = fx
        .app
        .oneshot(build_request(RequestSpec {
            body: r#"{"password": "wrong"}"#.to_string(),
            ..Default::default()
        }))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        fx.authority.calls.total(),
        0,
        "a rejected trigger must not reach the authority"
    );
    assert!(fx.store.list_ids().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_untrusted_peer_is_rejected() {
    let fx = fixture();

    let response = fx
        .app
        .oneshot(build_request(RequestSpec {
            peer: "192.168.7.7",
            ..Default::default()
        }))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(fx.authority.calls.total(), 0);
}

#[tokio::test]
async fn test_forwarded_for_first_hop_is_honored() {
    let fx = fixture();
    fx.authority.add_user(sample_user(1));

    // Request arrives via a proxy: the peer is the proxy, the first hop of
    // x-forwarded-for is the real client.
    let response = fx
        .app
        .oneshot(build_request(RequestSpec {
            peer: "172.16.0.9",
            forwarded_for: Some("10.0.0.1, 172.16.0.9"),
            ..Default::default()
        }))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_origin_header_is_rejected() {
    let fx = fixture();

    let response = fx
        .app
        .oneshot(build_request(RequestSpec {
            origin: None,
            ..Default::default()
        }))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_wrong_origin_header_is_rejected() {
    let fx = fixture();

    let response = fx
        .app
        .oneshot(build_request(RequestSpec {
            origin: Some("somewhere-else"),
            ..Default::default()
        }))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let fx = fixture();

    let response = fx
        .app
        .oneshot(build_request(RequestSpec {
            body: "not json".to_string(),
            ..Default::default()
        }))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(fx.authority.calls.total(), 0);
}

#[tokio::test]
async fn test_unmigrated_store_is_a_server_error_after_the_guard() {
    let fx = fixture();
    fx.store.set_schema_ready(false);

    let response = fx.app.oneshot(build_request(RequestSpec::default())).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().contains("migrations"));
}

#[tokio::test]
async fn test_remote_failure_surfaces_as_bad_gateway() {
    let fx = fixture();
    fx.authority.fail_next(tonic::Code::Unavailable);
    fx.authority.fail_next(tonic::Code::Unavailable);

    let response = fx.app.oneshot(build_request(RequestSpec::default())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
