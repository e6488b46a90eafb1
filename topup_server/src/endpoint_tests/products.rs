use actix_web::{http::StatusCode, test::TestRequest};
use topup_engine::{
    db_types::{Amount, NewProduct},
    test_utils::prepare_env::{new_test_database, tear_down},
    ProductCatalog,
};

use super::{
    helpers::{seed_product, send},
    mocks::MockGateway,
};

#[actix_web::test]
async fn list_products_with_filters() {
    let db = new_test_database().await;
    seed_product(&db, "ML-86", 10).await;
    let hidden = NewProduct::new("FF-100", "100 Diamonds", "Free Fire", Amount::from_units(15_000)).inactive();
    db.insert_product(hidden).await.unwrap();

    let (status, body) = send(TestRequest::get().uri("/api/products"), &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["products"][0]["sku"], "FF-100");

    let req = TestRequest::get().uri("/api/products?active=true");
    let (status, body) = send(req, &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["products"][0]["sku"], "ML-86");

    let req = TestRequest::get().uri("/api/products?category=Free%20Fire");
    let (_, body) = send(req, &db, MockGateway::new()).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["products"][0]["is_active"], false);

    let req = TestRequest::get().uri("/api/products?search=Mobile");
    let (_, body) = send(req, &db, MockGateway::new()).await;
    assert_eq!(body["count"], 1);
    tear_down(db).await;
}

#[actix_web::test]
async fn fetch_single_product() {
    let db = new_test_database().await;
    let product = seed_product(&db, "ML-86", 10).await;

    let req = TestRequest::get().uri(&format!("/api/products/{}", product.id));
    let (status, body) = send(req, &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sku"], "ML-86");
    assert_eq!(body["stock"], 10);

    let (status, body) = send(TestRequest::get().uri("/api/products/9999"), &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["reason"], "not_found");

    let (status, body) = send(TestRequest::get().uri("/api/products/abc"), &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "validation");
    tear_down(db).await;
}

#[actix_web::test]
async fn bad_query_string_is_rejected() {
    let db = new_test_database().await;
    let req = TestRequest::get().uri("/api/products?active=perhaps");
    let (status, body) = send(req, &db, MockGateway::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "validation");
    tear_down(db).await;
}
