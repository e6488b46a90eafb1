use actix_web::{http::StatusCode, test::TestRequest};
use reseller_tools::ResellerApiError;
use topup_engine::{
    db_types::TransactionStatus,
    test_utils::prepare_env::{new_test_database, tear_down},
    TransactionStore,
};

use super::{
    helpers::{seed_product, seed_transaction, send},
    mocks::{status_report, MockGateway},
};

#[actix_web::test]
async fn status_lookup_reconciles_the_transaction() {
    let db = new_test_database().await;
    let product = seed_product(&db, "ML-86", 5).await;
    let tx = seed_transaction(&db, &product, "INV/20240601100000/000001", Some(7), Some("VIP-1")).await;
    let mut gateway = MockGateway::new();
    gateway
        .expect_query_status()
        .withf(|order_id: &str| order_id == "VIP-1")
        .times(1)
        .returning(|id| Ok(status_report(id, "success")));

    let req = TestRequest::get().uri("/api/transaction/INV/20240601100000/000001");
    let (status, body) = send(req, &db, gateway).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], true);
    assert_eq!(body["retryable"], false);
    assert!(body.get("sync_error").is_none());
    assert_eq!(body["transaction"]["status"], "success");
    assert_eq!(body["transaction"]["invoice"], "INV/20240601100000/000001");

    let stored = db.fetch_transaction(tx.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TransactionStatus::Success);
    assert_eq!(stored.amount, tx.amount);

    // Terminal transactions are served without asking the provider again
    let mut gateway = MockGateway::new();
    gateway.expect_query_status().never();
    let req = TestRequest::get().uri("/api/transaction/INV/20240601100000/000001");
    let (status, body) = send(req, &db, gateway).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], false);
    assert_eq!(body["transaction"]["status"], "success");
    tear_down(db).await;
}

#[actix_web::test]
async fn unreachable_provider_returns_the_last_known_state() {
    let db = new_test_database().await;
    let product = seed_product(&db, "ML-86", 5).await;
    seed_transaction(&db, &product, "INV/20240601100000/000002", None, Some("VIP-2")).await;
    let mut gateway = MockGateway::new();
    gateway
        .expect_query_status()
        .times(1)
        .returning(|_| Err(ResellerApiError::RestResponseError("operation timed out".into())));

    let req = TestRequest::get().uri("/api/transaction/INV/20240601100000/000002");
    let (status, body) = send(req, &db, gateway).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction"]["status"], "pending");
    assert_eq!(body["retryable"], true);
    assert!(body["sync_error"].as_str().unwrap().contains("operation timed out"));
    tear_down(db).await;
}

#[actix_web::test]
async fn unknown_invoice_is_not_found() {
    let db = new_test_database().await;
    let mut gateway = MockGateway::new();
    gateway.expect_query_status().never();
    let (status, body) = send(TestRequest::get().uri("/api/transaction/INV/0/0"), &db, gateway).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["reason"], "not_found");
    tear_down(db).await;
}
