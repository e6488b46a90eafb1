use serde::{Deserialize, Serialize};
use topup_common::Amount;

/// Every reseller response is wrapped in this envelope. The HTTP status code, not `status`, decides success.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub data: T,
}

/// One entry of the reseller's `/game-feature` catalog.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct CatalogItem {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub price: Amount,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stock: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct OrderRequest {
    pub game_id: String,
    pub game_server: String,
    pub product_sku: String,
}

impl OrderRequest {
    pub fn new<S: Into<String>>(game_id: S, game_server: S, product_sku: S) -> Self {
        Self { game_id: game_id.into(), game_server: game_server.into(), product_sku: product_sku.into() }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct PlacedOrder {
    pub order_id: String,
    pub status: String,
    #[serde(default)]
    pub total_price: Amount,
    #[serde(default)]
    pub created_at: String,
}

/// The provider's view of an order. `status` is passed through untouched; interpretation happens in the engine.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct OrderStatusReport {
    pub order_id: String,
    pub status: String,
    #[serde(default)]
    pub game_id: String,
    #[serde(default)]
    pub game_server: String,
    #[serde(default)]
    pub product_sku: String,
    #[serde(default)]
    pub updated_at: String,
}
