use std::sync::Arc;

use actix_web::{http::StatusCode, test, test::TestRequest, App};
use serde_json::Value;
use topup_common::{Amount, Secret};
use topup_engine::{
    checkout_objects::StockPolicy,
    db_types::{Invoice, NewProduct, NewTransaction, PaymentMethod, Product, Transaction},
    events::EventProducers,
    ProductCatalog,
    SqliteDatabase,
    TransactionStore,
};

use super::mocks::MockGateway;
use crate::{config::ServerOptions, server::configure_api};

pub const ADMIN_KEY: &str = "admin-test-key";

/// Sends `req` to an app wired to `db` and `gateway`, with [`ADMIN_KEY`] as the admin key, and returns the status and
/// the parsed JSON body.
pub async fn send(req: TestRequest, db: &SqliteDatabase, gateway: MockGateway) -> (StatusCode, Value) {
    send_with_admin_key(req, db, gateway, Some(ADMIN_KEY)).await
}

pub async fn send_with_admin_key(
    req: TestRequest,
    db: &SqliteDatabase,
    gateway: MockGateway,
    admin_key: Option<&str>,
) -> (StatusCode, Value) {
    let _ = env_logger::try_init();
    let db = db.clone();
    let gateway = Arc::new(gateway);
    let admin_key = admin_key.map(|k| Secret::new(k.to_string()));
    let app = App::new().configure(move |cfg| {
        configure_api(
            cfg,
            db,
            gateway,
            EventProducers::default(),
            StockPolicy::default(),
            ServerOptions::default(),
            admin_key,
        )
    });
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let json = serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into()));
    (status, json)
}

pub async fn seed_product(db: &SqliteDatabase, sku: &str, stock: i64) -> Product {
    let product = NewProduct::new(sku, "86 Diamonds", "Mobile Legends", Amount::from_units(20_000))
        .with_description("Diamonds for Mobile Legends")
        .with_stock(stock);
    db.insert_product(product).await.expect("Error seeding product")
}

/// Inserts a pending transaction and, if `vip_order_id` is given, links it to that external order.
pub async fn seed_transaction(
    db: &SqliteDatabase,
    product: &Product,
    invoice: &str,
    user_id: Option<i64>,
    vip_order_id: Option<&str>,
) -> Transaction {
    let tx = NewTransaction {
        user_id,
        product_id: product.id,
        method: PaymentMethod::Ewallet,
        invoice: Invoice::new(invoice),
        amount: product.price,
        game_id: "123456789".to_string(),
        game_server: "2001".to_string(),
    };
    let tx = db.insert_transaction(tx).await.expect("Error seeding transaction");
    match vip_order_id {
        Some(id) => db.link_external_order(tx.id, id).await.expect("Error linking order"),
        None => tx,
    }
}
