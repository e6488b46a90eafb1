use serde::{Deserialize, Serialize};
use topup_engine::{
    checkout_objects::SyncOutcome,
    db_types::{Product, Transaction},
    ProductQueryFilter,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub message: String,
    pub transaction: Transaction,
}

impl CheckoutResponse {
    pub fn new(transaction: Transaction) -> Self {
        let message = format!("Order {} has been placed and is awaiting confirmation", transaction.invoice);
        Self { message, transaction }
    }
}

/// The answer to a status lookup. When the provider could not be reached, the last known transaction is returned with
/// `sync_error` set and `retryable` true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionStatusResponse {
    pub transaction: Transaction,
    /// True when this lookup moved the transaction into a terminal status.
    pub updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_error: Option<String>,
    pub retryable: bool,
}

impl TransactionStatusResponse {
    pub fn synced(outcome: SyncOutcome) -> Self {
        let updated = outcome.is_updated();
        Self { transaction: outcome.into_transaction(), updated, sync_error: None, retryable: false }
    }

    pub fn stale(transaction: Transaction, sync_error: String) -> Self {
        Self { transaction, updated: false, sync_error: Some(sync_error), retryable: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductQueryParams {
    pub category: Option<String>,
    pub search: Option<String>,
    pub active: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<ProductQueryParams> for ProductQueryFilter {
    fn from(params: ProductQueryParams) -> Self {
        Self {
            category: params.category,
            search: params.search,
            is_active: params.active,
            limit: params.limit,
            offset: params.offset,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductList {
    pub count: usize,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionList {
    pub count: usize,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileParams {
    pub limit: Option<i64>,
}
