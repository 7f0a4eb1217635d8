//! Integration tests for the request lifecycle transitions.
//!
//! Exercises the repository layer against a real SQLite file to verify:
//! - The create -> translate -> claim -> deliver walk-through
//! - Concurrent claims produce exactly one winner
//! - Completion by a non-owner changes nothing
//! - Completion removes the delivery address in the same transaction
//! - Open requests are listed oldest first and only while posted

mod common;

use assert_matches::assert_matches;
use grocery_core::status::RequestStatus;
use grocery_db::models::request::CreateRequest;
use grocery_db::repositories::{AddressRepo, RequestRepo};
use grocery_db::StoreError;

use common::{new_request, posted_request, test_db};

const VOLUNTEER_A: i64 = 1001;
const VOLUNTEER_B: i64 = 1002;

#[tokio::test]
async fn request_walks_from_new_to_delivered() {
    let db = test_db().await;
    let pool = &db.pool;

    let created = RequestRepo::create(pool, &new_request("2 lb rice, 1 chicken"))
        .await
        .unwrap();
    assert_eq!(created.status, RequestStatus::New);
    assert_eq!(created.translated_text, None);
    assert_eq!(created.budget, None);

    let posted = RequestRepo::update_translation(pool, created.id, "• 2 lb rice\n• 1 chicken")
        .await
        .unwrap();
    assert_eq!(posted.status, RequestStatus::Posted);
    assert_eq!(posted.translated_text.as_deref(), Some("• 2 lb rice\n• 1 chicken"));
    assert_eq!(posted.original_text, "2 lb rice, 1 chicken");

    AddressRepo::save(pool, created.id, "12 Calle Luna").await.unwrap();

    let claimed = RequestRepo::claim(pool, created.id, VOLUNTEER_A, "Ana")
        .await
        .unwrap();
    assert_eq!(claimed.status, RequestStatus::Claimed);
    assert_eq!(claimed.claimed_by, Some(VOLUNTEER_A));
    assert_eq!(claimed.claimed_by_name.as_deref(), Some("Ana"));

    let second = RequestRepo::claim(pool, created.id, VOLUNTEER_B, "Ben").await;
    assert_matches!(
        second,
        Err(StoreError::NotAvailable {
            status: RequestStatus::Claimed,
            ..
        })
    );

    let delivered = RequestRepo::complete(pool, created.id, VOLUNTEER_A)
        .await
        .unwrap();
    assert_eq!(delivered.status, RequestStatus::Delivered);
    assert!(delivered.delivered_at.is_some());

    let address = AddressRepo::get(pool, created.id).await;
    assert_matches!(
        address,
        Err(StoreError::NotFound {
            entity: "address",
            ..
        })
    );
}

#[tokio::test]
async fn create_stores_blank_labels_as_null() {
    let db = test_db().await;

    let created = RequestRepo::create(
        &db.pool,
        &CreateRequest {
            original_text: "leche".to_string(),
            budget: Some("$40 cash".to_string()),
            zone: Some("   ".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(created.budget.as_deref(), Some("$40 cash"));
    assert_eq!(created.zone, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_claims_have_exactly_one_winner() {
    let db = test_db().await;
    let request = posted_request(&db.pool, "huevos").await;

    let id = request.id;
    let attempts = (0..8).map(|i| {
        let pool = db.pool.clone();
        async move {
            let volunteer: i64 = 2000 + i;
            let result = RequestRepo::claim(&pool, id, volunteer, "racer").await;
            (volunteer, result)
        }
    });
    let handles = attempts.map(tokio::spawn).collect::<Vec<_>>();
    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let winners: Vec<i64> = results
        .iter()
        .filter_map(|(volunteer, result)| result.is_ok().then_some(*volunteer))
        .collect();
    assert_eq!(winners.len(), 1, "exactly one claim must succeed");

    for (_, result) in results.iter().filter(|(_, r)| r.is_err()) {
        assert_matches!(result, Err(StoreError::NotAvailable { .. }));
    }

    let stored = RequestRepo::get(&db.pool, request.id).await.unwrap();
    assert_eq!(stored.status, RequestStatus::Claimed);
    assert_eq!(stored.claimed_by, Some(winners[0]));
}

#[tokio::test]
async fn claim_rejects_requests_that_are_not_posted() {
    let db = test_db().await;
    let fresh = RequestRepo::create(&db.pool, &new_request("pan")).await.unwrap();

    let result = RequestRepo::claim(&db.pool, fresh.id, VOLUNTEER_A, "Ana").await;
    assert_matches!(
        result,
        Err(StoreError::NotAvailable {
            status: RequestStatus::New,
            ..
        })
    );

    let result = RequestRepo::claim(&db.pool, 9999, VOLUNTEER_A, "Ana").await;
    assert_matches!(result, Err(StoreError::NotFound { id: 9999, .. }));
}

#[tokio::test]
async fn non_owner_completion_changes_nothing() {
    let db = test_db().await;
    let pool = &db.pool;
    let request = posted_request(pool, "frijoles").await;
    AddressRepo::save(pool, request.id, "4 Oak St").await.unwrap();
    RequestRepo::claim(pool, request.id, VOLUNTEER_A, "Ana")
        .await
        .unwrap();

    let result = RequestRepo::complete(pool, request.id, VOLUNTEER_B).await;
    assert_matches!(result, Err(StoreError::NotOwner { .. }));

    let stored = RequestRepo::get(pool, request.id).await.unwrap();
    assert_eq!(stored.status, RequestStatus::Claimed);
    assert_eq!(stored.claimed_by, Some(VOLUNTEER_A));
    assert_eq!(stored.delivered_at, None);

    let address = AddressRepo::get(pool, request.id).await.unwrap();
    assert_eq!(address.address, "4 Oak St");
}

#[tokio::test]
async fn completing_an_unclaimed_request_is_not_owned() {
    let db = test_db().await;
    let request = posted_request(&db.pool, "sal").await;

    let result = RequestRepo::complete(&db.pool, request.id, VOLUNTEER_A).await;
    assert_matches!(result, Err(StoreError::NotOwner { .. }));
}

#[tokio::test]
async fn completing_twice_reports_delivered() {
    let db = test_db().await;
    let request = posted_request(&db.pool, "azucar").await;
    RequestRepo::claim(&db.pool, request.id, VOLUNTEER_A, "Ana")
        .await
        .unwrap();
    RequestRepo::complete(&db.pool, request.id, VOLUNTEER_A)
        .await
        .unwrap();

    let again = RequestRepo::complete(&db.pool, request.id, VOLUNTEER_A).await;
    assert_matches!(
        again,
        Err(StoreError::NotAvailable {
            status: RequestStatus::Delivered,
            ..
        })
    );
}

#[tokio::test]
async fn shopping_is_owner_only_and_still_completable() {
    let db = test_db().await;
    let pool = &db.pool;
    let request = posted_request(pool, "aceite").await;
    RequestRepo::claim(pool, request.id, VOLUNTEER_A, "Ana")
        .await
        .unwrap();

    let stolen = RequestRepo::start_shopping(pool, request.id, VOLUNTEER_B).await;
    assert_matches!(stolen, Err(StoreError::NotOwner { .. }));

    let shopping = RequestRepo::start_shopping(pool, request.id, VOLUNTEER_A)
        .await
        .unwrap();
    assert_eq!(shopping.status, RequestStatus::Shopping);

    let mine = RequestRepo::list_for_volunteer(pool, VOLUNTEER_A).await.unwrap();
    assert_eq!(mine.len(), 1);

    let delivered = RequestRepo::complete(pool, request.id, VOLUNTEER_A)
        .await
        .unwrap();
    assert_eq!(delivered.status, RequestStatus::Delivered);
}

#[tokio::test]
async fn translation_only_applies_to_new_requests() {
    let db = test_db().await;
    let request = posted_request(&db.pool, "tortillas").await;
    RequestRepo::claim(&db.pool, request.id, VOLUNTEER_A, "Ana")
        .await
        .unwrap();

    let result = RequestRepo::update_translation(&db.pool, request.id, "• again").await;
    assert_matches!(
        result,
        Err(StoreError::NotAvailable {
            status: RequestStatus::Claimed,
            ..
        })
    );

    let missing = RequestRepo::update_translation(&db.pool, 424242, "• x").await;
    assert_matches!(missing, Err(StoreError::NotFound { .. }));
}

#[tokio::test]
async fn open_requests_are_posted_only_and_oldest_first() {
    let db = test_db().await;
    let pool = &db.pool;

    let first = posted_request(pool, "uno").await;
    let _unposted = RequestRepo::create(pool, &new_request("pendiente")).await.unwrap();
    let second = posted_request(pool, "dos").await;
    let third = posted_request(pool, "tres").await;
    RequestRepo::claim(pool, second.id, VOLUNTEER_A, "Ana")
        .await
        .unwrap();

    let open = RequestRepo::list_open(pool).await.unwrap();
    let ids: Vec<i64> = open.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![first.id, third.id]);
    assert!(open.iter().all(|r| r.status == RequestStatus::Posted));
}

#[tokio::test]
async fn volunteer_requests_are_newest_first_and_active_only() {
    let db = test_db().await;
    let pool = &db.pool;

    let older = posted_request(pool, "viejo").await;
    let newer = posted_request(pool, "nuevo").await;
    let done = posted_request(pool, "hecho").await;
    for request in [&older, &newer, &done] {
        RequestRepo::claim(pool, request.id, VOLUNTEER_A, "Ana")
            .await
            .unwrap();
    }
    RequestRepo::complete(pool, done.id, VOLUNTEER_A).await.unwrap();

    let mine = RequestRepo::list_for_volunteer(pool, VOLUNTEER_A).await.unwrap();
    let ids: Vec<i64> = mine.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);

    let theirs = RequestRepo::list_for_volunteer(pool, VOLUNTEER_B).await.unwrap();
    assert!(theirs.is_empty());
}

#[tokio::test]
async fn counts_by_status() {
    let db = test_db().await;
    let pool = &db.pool;
    RequestRepo::create(pool, &new_request("a")).await.unwrap();
    posted_request(pool, "b").await;
    posted_request(pool, "c").await;

    let counts = RequestRepo::count_by_status(pool).await.unwrap();
    let count_of = |status| {
        counts
            .iter()
            .find(|c| c.status == status)
            .map(|c| c.count)
            .unwrap_or(0)
    };
    assert_eq!(count_of(RequestStatus::New), 1);
    assert_eq!(count_of(RequestStatus::Posted), 2);
    assert_eq!(count_of(RequestStatus::Delivered), 0);
}
