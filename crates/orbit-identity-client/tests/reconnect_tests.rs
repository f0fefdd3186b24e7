//! Integration tests for the connection manager's recovery policy.
//!
//! The contract under test: a transient failure triggers exactly one
//! connection replacement and one retry; a second failure, or any
//! non-transient failure, surfaces immediately.

use std::sync::atomic::Ordering;

use orbit_identity_client::testing::{sample_user, FakeAuthority};
use orbit_identity_client::{IdentityClient, IdentityError, UserSelector};
use tonic::Code;

fn client_for(authority: &std::sync::Arc<FakeAuthority>) -> IdentityClient {
    IdentityClient::with_connector(authority.connector(), "billing", "billing-api", 60)
}

#[tokio::test]
async fn test_unavailable_then_success_recovers_transparently() {
    let authority = FakeAuthority::new();
    authority.add_user(sample_user(1));
    authority.fail_next(Code::Unavailable);
    let client = client_for(&authority);

    let record = client.fetch_user(&UserSelector::Id(1)).await.unwrap();
    assert_eq!(record.id, 1);

    assert_eq!(authority.calls.get_user_data.load(Ordering::SeqCst), 2);
    assert_eq!(
        authority.connects.load(Ordering::SeqCst),
        2,
        "the failed connection must be replaced exactly once"
    );
}

#[tokio::test]
async fn test_unavailable_twice_surfaces_without_a_third_attempt() {
    let authority = FakeAuthority::new();
    authority.add_user(sample_user(1));
    authority.fail_next(Code::Unavailable);
    authority.fail_next(Code::Unavailable);
    let client = client_for(&authority);

    let err = client.fetch_user(&UserSelector::Id(1)).await.unwrap_err();
    assert!(matches!(err, IdentityError::Transient { .. }));

    assert_eq!(
        authority.calls.get_user_data.load(Ordering::SeqCst),
        2,
        "retry is bounded to one extra attempt"
    );
    assert_eq!(authority.connects.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_every_transient_code_triggers_the_single_retry() {
    for code in [
        Code::Unavailable,
        Code::Internal,
        Code::DeadlineExceeded,
        Code::Unknown,
    ] {
        let authority = FakeAuthority::new();
        authority.add_user(sample_user(1));
        authority.fail_next(code);
        let client = client_for(&authority);

        let record = client.fetch_user(&UserSelector::Id(1)).await.unwrap();
        assert_eq!(record.id, 1, "retry should recover from {code:?}");
        assert_eq!(authority.calls.get_user_data.load(Ordering::SeqCst), 2);
    }
}

#[tokio::test]
async fn test_non_transient_failures_are_not_retried() {
    let authority = FakeAuthority::new();
    authority.add_user(sample_user(1));
    authority.fail_next(Code::PermissionDenied);
    let client = client_for(&authority);

    let err = client.fetch_user(&UserSelector::Id(1)).await.unwrap_err();
    assert!(matches!(err, IdentityError::Forbidden { .. }));

    assert_eq!(authority.calls.get_user_data.load(Ordering::SeqCst), 1);
    assert_eq!(
        authority.connects.load(Ordering::SeqCst),
        1,
        "no reconnect for non-transient failures"
    );
}

#[tokio::test]
async fn test_connection_is_shared_across_operations() {
    let authority = FakeAuthority::new();
    authority.add_user(sample_user(1));
    authority.add_user(sample_user(2));
    authority.grant_token("token", 1);
    let client = client_for(&authority);

    client.fetch_user(&UserSelector::Id(1)).await.unwrap();
    client.fetch_user(&UserSelector::Id(2)).await.unwrap();
    client.verify_login("token").await.unwrap();
    client.list_roles().await.unwrap();

    assert_eq!(
        authority.connects.load(Ordering::SeqCst),
        1,
        "all operations share one lazily-created connection"
    );
}

#[tokio::test]
async fn test_close_releases_the_connection_and_reconnects_lazily() {
    let authority = FakeAuthority::new();
    authority.add_user(sample_user(1));
    authority.add_user(sample_user(2));
    let client = client_for(&authority);

    client.fetch_user(&UserSelector::Id(1)).await.unwrap();
    assert_eq!(authority.connects.load(Ordering::SeqCst), 1);

    client.close().await;

    client.fetch_user(&UserSelector::Id(2)).await.unwrap();
    assert_eq!(authority.connects.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_concurrent_callers_share_the_replacement() {
    let authority = FakeAuthority::new();
    for id in 1..=8 {
        authority.add_user(sample_user(id));
    }
    let client = std::sync::Arc::new(client_for(&authority));

    // Establish the connection, then fail exactly one of the concurrent
    // calls; its reconnect must be the only replacement.
    client.fetch_user(&UserSelector::Id(1)).await.unwrap();
    authority.fail_next(tonic::Code::Unavailable);

    let mut handles = Vec::new();
    for id in 2..=8 {
        let client = std::sync::Arc::clone(&client);
        handles.push(tokio::spawn(async move {
            client.fetch_user(&UserSelector::Id(id)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(
        authority.connects.load(Ordering::SeqCst),
        2,
        "one failure episode, one replacement, regardless of caller count"
    );
}
