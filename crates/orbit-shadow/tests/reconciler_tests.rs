//! Integration tests for the shadow reconciler.
//!
//! Exercise the two-step query resolution, the best-effort refresh and the
//! merge policy's persistence behavior against the in-memory store and the
//! scripted authority.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use orbit_identity_client::testing::{sample_user, FakeAuthority};
use orbit_identity_client::IdentityClient;
use orbit_shadow::store::memory::MemoryUserStore;
use orbit_shadow::{Criterion, ReconcileError, ShadowReconciler, ShadowUser, UserStore};

fn setup() -> (Arc<FakeAuthority>, Arc<MemoryUserStore>, ShadowReconciler) {
    let authority = FakeAuthority::new();
    let client = Arc::new(IdentityClient::with_connector(
        authority.connector(),
        "billing",
        "billing-api",
        60,
    ));
    let store = Arc::new(MemoryUserStore::new());
    let reconciler = ShadowReconciler::new(Arc::clone(&store) as Arc<dyn UserStore>, client);
    (authority, store, reconciler)
}

/// A local row whose columns already mirror the given authority record.
fn mirrored_row(record: &orbit_identity_client::proto::UserRecord) -> ShadowUser {
    let mut row = ShadowUser::minimal(record.id);
    row.national_id = Some(record.national_id.clone());
    row.is_staff = record.is_staff;
    row.is_superuser = record.is_superuser;
    row.phone = record.phone.clone();
    row.email = record.email.clone();
    row.first_name = record.first_name.clone();
    row.last_name = record.last_name.clone();
    row.username = record.username.clone();
    row
}

#[tokio::test]
async fn test_read_refreshes_the_row_from_the_authority() {
    let (authority, store, reconciler) = setup();
    authority.add_user(sample_user(1));
    store.insert_row(ShadowUser::minimal(1));

    let user = reconciler.get(&[Criterion::Id(1)]).await.unwrap().unwrap();

    assert_eq!(user.email, "user1@example.com");
    assert_eq!(user.remote.roles, vec!["member"]);

    let persisted = store.row(1).unwrap();
    assert_eq!(persisted.email, "user1@example.com");
    assert_eq!(persisted.national_id.as_deref(), Some("0000000001"));
}

#[tokio::test]
async fn test_local_criteria_never_call_the_remote_filter() {
    let (authority, store, reconciler) = setup();
    authority.add_user(sample_user(1));
    let mut row = ShadowUser::minimal(1);
    row.national_id = Some("0000000001".into());
    store.insert_row(row);

    let user = reconciler
        .get(&[Criterion::NationalId("0000000001".into())])
        .await
        .unwrap();

    assert_eq!(user.unwrap().id, 1);
    assert_eq!(
        authority.calls.filter_user.load(Ordering::SeqCst),
        0,
        "a locally-answerable query must not consult the authority's filter"
    );
}

#[tokio::test]
async fn test_remote_criteria_restrict_the_local_query_to_the_filtered_ids() {
    let (authority, store, reconciler) = setup();
    let mut admin = sample_user(1);
    admin.roles = vec!["admin".into()];
    authority.add_user(admin);
    authority.add_user(sample_user(2));
    store.insert_row(ShadowUser::minimal(1));
    store.insert_row(ShadowUser::minimal(2));

    let users = reconciler
        .filter(&[Criterion::Role("admin".into())])
        .await
        .unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, 1);
    assert_eq!(authority.calls.filter_user.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_mixed_criteria_apply_local_predicates_to_the_restricted_set() {
    let (authority, store, reconciler) = setup();
    for id in [1, 2] {
        let mut user = sample_user(id);
        user.roles = vec!["admin".into()];
        user.is_staff = id == 1;
        authority.add_user(user);
    }
    let mut staff_row = ShadowUser::minimal(1);
    staff_row.is_staff = true;
    store.insert_row(staff_row);
    store.insert_row(ShadowUser::minimal(2));

    let users = reconciler
        .filter(&[Criterion::Role("admin".into()), Criterion::IsStaff(true)])
        .await
        .unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, 1);
}

#[tokio::test]
async fn test_refresh_failure_returns_the_local_record_unchanged() {
    let (_authority, store, reconciler) = setup();
    // No remote counterpart: the refresh hits NOT_FOUND and is swallowed.
    let mut row = ShadowUser::minimal(5);
    row.email = "stale@example.com".into();
    store.insert_row(row);

    let user = reconciler.get(&[Criterion::Id(5)]).await.unwrap().unwrap();

    assert_eq!(user.email, "stale@example.com");
    assert_eq!(store.applied_count(), 0, "no write without a refresh");
}

#[tokio::test]
async fn test_staff_only_difference_persists_one_designated_field() {
    let (authority, store, reconciler) = setup();
    let mut record = sample_user(1);
    record.is_staff = true;
    store.insert_row(mirrored_row(&{
        let mut unstaffed = record.clone();
        unstaffed.is_staff = false;
        unstaffed
    }));
    authority.add_user(record);

    reconciler.get(&[Criterion::Id(1)]).await.unwrap();

    let journal = store.applied.lock().unwrap();
    assert_eq!(journal.len(), 1);
    let (_, changes) = &journal[0];
    assert_eq!(changes.designated_fields(), vec!["is_staff"]);
    // Mirrored columns ride along unconditionally, values unchanged.
    assert!(changes.persisted_fields().contains(&"email"));
    drop(journal);

    assert!(store.row(1).unwrap().is_staff);
}

#[tokio::test]
async fn test_repeated_reads_converge_without_designated_rewrites() {
    let (authority, store, reconciler) = setup();
    let record = sample_user(1);
    store.insert_row(mirrored_row(&record));
    authority.add_user(record);

    reconciler.get(&[Criterion::Id(1)]).await.unwrap();
    let first = store.row(1).unwrap();

    reconciler.get(&[Criterion::Id(1)]).await.unwrap();
    let second = store.row(1).unwrap();

    assert_eq!(first.email, second.email);
    for (_, changes) in store.applied.lock().unwrap().iter() {
        assert!(
            changes.designated_fields().is_empty(),
            "identical designated fields must never re-enter the batch"
        );
    }
}

#[tokio::test]
async fn test_authenticate_materializes_and_refreshes_the_shadow_row() {
    let (authority, store, reconciler) = setup();
    authority.add_user(sample_user(12));
    authority.grant_token("valid-token", 12);

    let user = reconciler.authenticate("valid-token").await.unwrap();

    assert_eq!(user.id, 12);
    assert_eq!(user.email, "user12@example.com");
    assert!(store.row(12).is_some());
}

#[tokio::test]
async fn test_authenticate_propagates_token_rejection() {
    let (_authority, store, reconciler) = setup();

    let err = reconciler.authenticate("bogus").await.unwrap_err();

    match err {
        ReconcileError::Remote(remote) => assert_eq!(remote.status_code(), Some(403)),
        other => panic!("expected a remote rejection, got {other:?}"),
    }
    assert!(store.row(0).is_none(), "no row for a rejected token");
}

#[tokio::test]
async fn test_get_with_no_match_returns_none() {
    let (_authority, _store, reconciler) = setup();
    let user = reconciler.get(&[Criterion::Id(404)]).await.unwrap();
    assert!(user.is_none());
}
