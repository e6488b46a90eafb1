#![allow(dead_code)]

use topup_engine::{
    db_types::{Amount, NewProduct, PaymentMethod, Product},
    checkout_objects::CheckoutRequest,
    ProductCatalog,
    SqliteDatabase,
};

pub async fn seed_product(db: &SqliteDatabase, sku: &str, stock: i64) -> Product {
    let product = NewProduct::new(sku, "86 Diamonds", "Mobile Legends", Amount::from_units(20_000)).with_stock(stock);
    db.insert_product(product).await.expect("Error seeding product")
}

pub fn request_for(product: &Product) -> CheckoutRequest {
    CheckoutRequest::new(product.id, "123456789", "2001", PaymentMethod::BankTransfer)
}
