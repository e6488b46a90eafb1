use actix_web::{http::StatusCode, test::TestRequest};
use reseller_tools::data_objects::CatalogItem;
use topup_engine::{
    db_types::{Amount, TransactionStatus},
    test_utils::prepare_env::{new_test_database, tear_down},
    ProductCatalog,
    TransactionStore,
};

use super::{
    helpers::{seed_product, seed_transaction, send, send_with_admin_key, ADMIN_KEY},
    mocks::{status_report, MockGateway},
};
use crate::middleware::ADMIN_KEY_HEADER;

#[actix_web::test]
async fn admin_routes_require_the_admin_key() {
    let db = new_test_database().await;

    let (status, body) = send(TestRequest::get().uri("/api/admin/transactions"), &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "forbidden");

    let req = TestRequest::get().uri("/api/admin/transactions").insert_header((ADMIN_KEY_HEADER, "guess"));
    let (status, _) = send(req, &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = TestRequest::get().uri("/api/admin/transactions").insert_header((ADMIN_KEY_HEADER, ADMIN_KEY));
    let (status, _) = send(req, &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::OK);

    // With no key configured, admin routes are closed to everyone
    let req = TestRequest::get().uri("/api/admin/transactions").insert_header((ADMIN_KEY_HEADER, ADMIN_KEY));
    let (status, body) = send_with_admin_key(req, &db, MockGateway::new(), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("disabled"));

    // Public routes are unaffected
    let (status, _) = send(TestRequest::get().uri("/api/products"), &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::OK);
    tear_down(db).await;
}

#[actix_web::test]
async fn search_and_fetch_transactions() {
    let db = new_test_database().await;
    let product = seed_product(&db, "ML-86", 5).await;
    let a = seed_transaction(&db, &product, "INV-A", Some(1), Some("VIP-A")).await;
    let b = seed_transaction(&db, &product, "INV-B", Some(2), None).await;
    db.update_status(a.id, TransactionStatus::Success).await.unwrap();

    let req = TestRequest::get().uri("/api/admin/transactions?status=success").insert_header((ADMIN_KEY_HEADER, ADMIN_KEY));
    let (status, body) = send(req, &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["transactions"][0]["invoice"], "INV-A");

    let req = TestRequest::get()
        .uri("/api/admin/transactions?method=ewallet&limit=1&offset=0")
        .insert_header((ADMIN_KEY_HEADER, ADMIN_KEY));
    let (_, body) = send(req, &db, MockGateway::new()).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["transactions"][0]["id"], b.id);

    let req = TestRequest::get().uri("/api/admin/transactions?status=lost").insert_header((ADMIN_KEY_HEADER, ADMIN_KEY));
    let (status, body) = send(req, &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "validation");

    let req = TestRequest::get()
        .uri(&format!("/api/admin/transactions/{}", b.id))
        .insert_header((ADMIN_KEY_HEADER, ADMIN_KEY));
    let (status, body) = send(req, &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invoice"], "INV-B");

    let req = TestRequest::get().uri("/api/admin/transactions/4242").insert_header((ADMIN_KEY_HEADER, ADMIN_KEY));
    let (status, _) = send(req, &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    tear_down(db).await;
}

#[actix_web::test]
async fn catalog_sync() {
    let db = new_test_database().await;
    seed_product(&db, "ML-86", 5).await;
    let mut gateway = MockGateway::new();
    gateway.expect_fetch_catalog().times(1).returning(|| {
        Ok(vec![
            CatalogItem {
                sku: "ML-86".into(),
                name: "86 Diamonds".into(),
                category: "Mobile Legends".into(),
                price: Amount::from_units(22_000),
                description: String::new(),
                stock: 40,
            },
            CatalogItem {
                sku: "ML-172".into(),
                name: "172 Diamonds".into(),
                category: "Mobile Legends".into(),
                price: Amount::from_units(41_000),
                description: String::new(),
                stock: 12,
            },
        ])
    });

    let req = TestRequest::post().uri("/api/admin/products/sync").insert_header((ADMIN_KEY_HEADER, ADMIN_KEY));
    let (status, body) = send(req, &db, gateway).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], serde_json::json!(["ML-172"]));
    assert_eq!(body["updated"], serde_json::json!(["ML-86"]));
    let refreshed = db.fetch_product_by_sku("ML-86").await.unwrap().unwrap();
    assert_eq!(refreshed.price, Amount::from_units(22_000));
    assert_eq!(refreshed.stock, 40);
    tear_down(db).await;
}

#[actix_web::test]
async fn reconciliation_sweep() {
    let db = new_test_database().await;
    let product = seed_product(&db, "ML-86", 5).await;
    seed_transaction(&db, &product, "INV-1", None, Some("VIP-1")).await;
    seed_transaction(&db, &product, "INV-2", None, Some("VIP-2")).await;
    seed_transaction(&db, &product, "INV-3", None, None).await;
    let mut gateway = MockGateway::new();
    gateway.expect_query_status().times(2).returning(|id| {
        let status = if id == "VIP-1" { "failed" } else { "processing" };
        Ok(status_report(id, status))
    });

    let req = TestRequest::post().uri("/api/admin/transactions/reconcile").insert_header((ADMIN_KEY_HEADER, ADMIN_KEY));
    let (status, body) = send(req, &db, gateway).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], serde_json::json!(["INV-1"]));
    assert_eq!(body["unchanged"], serde_json::json!(["INV-2"]));
    assert_eq!(body["failed"], serde_json::json!([]));

    let req = TestRequest::post()
        .uri("/api/admin/transactions/reconcile?limit=0")
        .insert_header((ADMIN_KEY_HEADER, ADMIN_KEY));
    let (status, body) = send(req, &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "validation");
    tear_down(db).await;
}

#[actix_web::test]
async fn user_history_is_admin_only_and_newest_first() {
    let db = new_test_database().await;
    let product = seed_product(&db, "ML-86", 5).await;
    let first = seed_transaction(&db, &product, "INV-1", Some(7), Some("VIP-1")).await;
    seed_transaction(&db, &product, "INV-2", Some(8), None).await;
    let last = seed_transaction(&db, &product, "INV-3", Some(7), None).await;

    // Not served outside the admin scope
    let (status, _) = send(TestRequest::get().uri("/api/user/7/transactions"), &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(TestRequest::get().uri("/api/admin/user/7/transactions"), &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = TestRequest::get().uri("/api/admin/user/7/transactions").insert_header((ADMIN_KEY_HEADER, ADMIN_KEY));
    let (status, body) = send(req, &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["transactions"][0]["id"], last.id);
    assert_eq!(body["transactions"][1]["id"], first.id);
    assert_eq!(body["transactions"][1]["vip_order_id"], "VIP-1");

    let req = TestRequest::get().uri("/api/admin/user/99/transactions").insert_header((ADMIN_KEY_HEADER, ADMIN_KEY));
    let (_, body) = send(req, &db, MockGateway::new()).await;
    assert_eq!(body["count"], 0);
    tear_down(db).await;
}

#[actix_web::test]
async fn add_product_by_hand() {
    let db = new_test_database().await;
    let product = serde_json::json!({
        "sku": "FF-100",
        "name": "100 Diamonds",
        "category": "Free Fire",
        "price": 15500,
        "stock": 20
    });

    let req = TestRequest::post().uri("/api/admin/products").set_json(&product);
    let (status, _) = send(req, &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(db.fetch_product_by_sku("FF-100").await.unwrap().is_none());

    let req = TestRequest::post().uri("/api/admin/products").insert_header((ADMIN_KEY_HEADER, ADMIN_KEY)).set_json(&product);
    let (status, body) = send(req, &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["sku"], "FF-100");
    assert_eq!(body["is_active"], true);
    let stored = db.fetch_product_by_sku("FF-100").await.unwrap().expect("product is stored");
    assert_eq!(stored.price, Amount::from_units(15_500));
    assert_eq!(stored.stock, 20);

    let req = TestRequest::post().uri("/api/admin/products").insert_header((ADMIN_KEY_HEADER, ADMIN_KEY)).set_json(&product);
    let (status, body) = send(req, &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["reason"], "conflict");

    let free = serde_json::json!({"sku": "FF-0", "name": "Free", "category": "Free Fire", "price": 0});
    let req = TestRequest::post().uri("/api/admin/products").insert_header((ADMIN_KEY_HEADER, ADMIN_KEY)).set_json(&free);
    let (status, body) = send(req, &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "validation");
    tear_down(db).await;
}
