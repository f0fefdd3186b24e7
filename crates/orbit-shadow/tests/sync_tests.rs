//! Integration tests for the bulk sync job.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use orbit_identity_client::testing::{sample_user, FakeAuthority};
use orbit_identity_client::IdentityClient;
use orbit_shadow::store::memory::MemoryUserStore;
use orbit_shadow::{sync_users, Criterion, ShadowReconciler, ShadowUser, SyncError, UserStore};

fn setup() -> (Arc<FakeAuthority>, Arc<MemoryUserStore>, Arc<IdentityClient>) {
    let authority = FakeAuthority::new();
    let client = Arc::new(IdentityClient::with_connector(
        authority.connector(),
        "billing",
        "billing-api",
        60,
    ));
    let store = Arc::new(MemoryUserStore::new());
    (authority, store, client)
}

#[tokio::test]
async fn test_sync_converges_on_the_remote_id_set() {
    let (authority, store, client) = setup();
    for id in [2, 3, 4] {
        authority.add_user(sample_user(id));
    }
    for id in [1, 2, 3] {
        store.insert_row(ShadowUser::minimal(id));
    }

    let outcome = sync_users(store.as_ref(), &client).await.unwrap();

    assert_eq!(outcome.created, 1);
    assert_eq!(outcome.deleted, 1);
    assert_eq!(store.list_ids().await.unwrap(), vec![2, 3, 4]);
}

#[tokio::test]
async fn test_sync_is_idempotent() {
    let (authority, store, client) = setup();
    for id in [2, 3, 4] {
        authority.add_user(sample_user(id));
    }
    for id in [1, 2, 3] {
        store.insert_row(ShadowUser::minimal(id));
    }

    let first = sync_users(store.as_ref(), &client).await.unwrap();
    assert_eq!((first.created, first.deleted), (1, 1));

    let second = sync_users(store.as_ref(), &client).await.unwrap();
    assert_eq!((second.created, second.deleted), (0, 0));

    assert_eq!(
        authority.calls.filter_user.load(Ordering::SeqCst),
        2,
        "one remote call per run, regardless of user count"
    );
}

#[tokio::test]
async fn test_sync_creates_minimal_rows_filled_on_next_read() {
    let (authority, store, client) = setup();
    authority.add_user(sample_user(4));

    sync_users(store.as_ref(), &client).await.unwrap();

    let minimal = store.row(4).unwrap();
    assert_eq!(minimal.national_id, None);
    assert_eq!(minimal.email, "");

    // Detail arrives lazily through the reconciler's read path.
    let reconciler =
        ShadowReconciler::new(Arc::clone(&store) as Arc<dyn UserStore>, Arc::clone(&client));
    let user = reconciler.get(&[Criterion::Id(4)]).await.unwrap().unwrap();
    assert_eq!(user.email, "user4@example.com");
    assert_eq!(store.row(4).unwrap().email, "user4@example.com");
}

#[tokio::test]
async fn test_missing_schema_fails_before_any_remote_call() {
    let (authority, store, client) = setup();
    authority.add_user(sample_user(1));
    store.set_schema_ready(false);

    let err = sync_users(store.as_ref(), &client).await.unwrap_err();

    assert!(matches!(err, SyncError::SchemaMissing));
    assert_eq!(
        authority.calls.total(),
        0,
        "the schema precondition is checked before touching anything"
    );
}

#[tokio::test]
async fn test_remote_failure_aborts_without_touching_rows() {
    let (authority, store, client) = setup();
    authority.add_user(sample_user(2));
    store.insert_row(ShadowUser::minimal(1));
    // Fail the initial call and the post-reconnect retry.
    authority.fail_next(tonic::Code::Unavailable);
    authority.fail_next(tonic::Code::Unavailable);

    let err = sync_users(store.as_ref(), &client).await.unwrap_err();

    assert!(matches!(err, SyncError::Remote(_)));
    assert_eq!(
        store.list_ids().await.unwrap(),
        vec![1],
        "a failed run reports the error and no counts"
    );
}
