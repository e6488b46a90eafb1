use actix_web::{http::StatusCode, test::TestRequest};
use reseller_tools::ResellerApiError;
use serde_json::json;
use topup_engine::{
    db_types::TransactionStatus,
    test_utils::prepare_env::{new_test_database, tear_down},
    ProductCatalog,
    TransactionStore,
};

use super::{
    helpers::{seed_product, send},
    mocks::{placed, MockGateway},
};

#[actix_web::test]
async fn successful_checkout() {
    let db = new_test_database().await;
    let product = seed_product(&db, "ML-86", 1).await;
    let mut gateway = MockGateway::new();
    gateway
        .expect_place_order()
        .withf(|req| req.product_sku == "ML-86" && req.game_id == "123456789" && req.game_server == "2001")
        .times(1)
        .returning(|_| Ok(placed("VIP-77")));
    gateway.expect_query_status().never();

    let payload = json!({
        "product_id": product.id,
        "user_id": 42,
        "game_id": " 123456789 ",
        "game_server": "2001",
        "method": "bank_transfer"
    });
    let (status, body) = send(TestRequest::post().uri("/api/checkout").set_json(payload), &db, gateway).await;
    assert_eq!(status, StatusCode::CREATED);
    let tx = &body["transaction"];
    assert_eq!(tx["status"], "pending");
    assert_eq!(tx["vip_order_id"], "VIP-77");
    assert_eq!(tx["user_id"], 42);
    assert_eq!(tx["game_id"], "123456789");
    assert_eq!(tx["method"], "bank_transfer");
    let invoice = tx["invoice"].as_str().expect("invoice is a string");
    assert!(invoice.starts_with("INV/"));
    assert!(body["message"].as_str().unwrap().contains(invoice));

    let product = db.fetch_product(product.id).await.unwrap().unwrap();
    assert_eq!(product.stock, 0);
    tear_down(db).await;
}

#[actix_web::test]
async fn sold_out_product_is_rejected() {
    let db = new_test_database().await;
    let product = seed_product(&db, "ML-86", 0).await;
    let mut gateway = MockGateway::new();
    gateway.expect_place_order().never();

    let payload = json!({ "product_id": product.id, "game_id": "1", "game_server": "2", "method": "ewallet" });
    let (status, body) = send(TestRequest::post().uri("/api/checkout").set_json(payload), &db, gateway).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["reason"], "unavailable");
    assert!(db.search_transactions(Default::default()).await.unwrap().is_empty());
    tear_down(db).await;
}

#[actix_web::test]
async fn malformed_checkouts_are_rejected() {
    let db = new_test_database().await;
    let product = seed_product(&db, "ML-86", 3).await;

    let bad_method = json!({ "product_id": product.id, "game_id": "1", "game_server": "2", "method": "cash" });
    let (status, body) =
        send(TestRequest::post().uri("/api/checkout").set_json(bad_method), &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "validation");

    let blank_game = json!({ "product_id": product.id, "game_id": "  ", "game_server": "2", "method": "ewallet" });
    let (status, body) =
        send(TestRequest::post().uri("/api/checkout").set_json(blank_game), &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "validation");
    assert!(body["error"].as_str().unwrap().contains("game_id"));

    let unknown = json!({ "product_id": 999, "game_id": "1", "game_server": "2", "method": "ewallet" });
    let (status, body) = send(TestRequest::post().uri("/api/checkout").set_json(unknown), &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["reason"], "not_found");

    let product = db.fetch_product(product.id).await.unwrap().unwrap();
    assert_eq!(product.stock, 3);
    tear_down(db).await;
}

#[actix_web::test]
async fn provider_rejection_fails_the_transaction() {
    let db = new_test_database().await;
    let product = seed_product(&db, "ML-86", 2).await;
    let mut gateway = MockGateway::new();
    gateway
        .expect_place_order()
        .times(1)
        .returning(|_| Err(ResellerApiError::QueryError { status: 400, message: "Saldo tidak mencukupi".into() }));

    let payload = json!({ "product_id": product.id, "game_id": "1", "game_server": "2", "method": "credit_card" });
    let (status, body) = send(TestRequest::post().uri("/api/checkout").set_json(payload), &db, gateway).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["reason"], "gateway");

    let txs = db.search_transactions(Default::default()).await.unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].status, TransactionStatus::Failed);
    assert_eq!(db.fetch_product(product.id).await.unwrap().unwrap().stock, 2);
    tear_down(db).await;
}
