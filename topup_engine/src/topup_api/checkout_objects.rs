use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Invoice, PaymentMethod, Transaction, TransactionStatus},
    topup_api::errors::CheckoutError,
};

/// A buyer's request to purchase one unit of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub product_id: i64,
    /// Absent for guest checkouts.
    #[serde(default)]
    pub user_id: Option<i64>,
    pub game_id: String,
    pub game_server: String,
    pub method: PaymentMethod,
}

impl CheckoutRequest {
    pub fn new<S: Into<String>>(product_id: i64, game_id: S, game_server: S, method: PaymentMethod) -> Self {
        Self { product_id, user_id: None, game_id: game_id.into(), game_server: game_server.into(), method }
    }

    pub fn for_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Checks the request and returns a copy with the game identifiers trimmed.
    pub fn validate(&self) -> Result<Self, CheckoutError> {
        if self.product_id <= 0 {
            return Err(CheckoutError::Validation("product_id must be a positive integer".to_string()));
        }
        let game_id = self.game_id.trim();
        if game_id.is_empty() {
            return Err(CheckoutError::Validation("game_id is required".to_string()));
        }
        let game_server = self.game_server.trim();
        if game_server.is_empty() {
            return Err(CheckoutError::Validation("game_server is required".to_string()));
        }
        Ok(Self {
            product_id: self.product_id,
            user_id: self.user_id,
            game_id: game_id.to_string(),
            game_server: game_server.to_string(),
            method: self.method,
        })
    }
}

/// Where in the checkout saga inventory is consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    /// Reserve one unit with the ledger's conditional decrement before anything else is written, and release it if
    /// the checkout fails. Concurrent buyers of the last unit are turned away before an order is placed.
    #[default]
    ReserveBeforeOrder,
    /// Decrement only after the provider accepted the order. Concurrent buyers of the last unit can both place
    /// orders; the loser is reported as unfulfillable.
    DecrementAfterOrder,
}

impl Display for StockPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockPolicy::ReserveBeforeOrder => write!(f, "reserve"),
            StockPolicy::DecrementAfterOrder => write!(f, "after_order"),
        }
    }
}

impl FromStr for StockPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reserve" | "reserve_before_order" => Ok(StockPolicy::ReserveBeforeOrder),
            "after_order" | "decrement_after_order" => Ok(StockPolicy::DecrementAfterOrder),
            s => Err(format!("Invalid stock policy: {s}. Use 'reserve' or 'after_order'")),
        }
    }
}

/// The result of a single reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The transaction was already terminal. The provider was not contacted.
    AlreadyFinal { transaction: Transaction },
    /// No external order is linked yet. The provider was not contacted.
    AwaitingExternalOrder { transaction: Transaction },
    /// The provider's status maps to the status already stored. Nothing was written.
    Unchanged { transaction: Transaction },
    /// The stored status was advanced.
    Updated { transaction: Transaction, old_status: TransactionStatus },
}

impl SyncOutcome {
    pub fn transaction(&self) -> &Transaction {
        match self {
            SyncOutcome::AlreadyFinal { transaction } => transaction,
            SyncOutcome::AwaitingExternalOrder { transaction } => transaction,
            SyncOutcome::Unchanged { transaction } => transaction,
            SyncOutcome::Updated { transaction, .. } => transaction,
        }
    }

    pub fn into_transaction(self) -> Transaction {
        match self {
            SyncOutcome::AlreadyFinal { transaction } => transaction,
            SyncOutcome::AwaitingExternalOrder { transaction } => transaction,
            SyncOutcome::Unchanged { transaction } => transaction,
            SyncOutcome::Updated { transaction, .. } => transaction,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, SyncOutcome::Updated { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedReconciliation {
    pub invoice: Invoice,
    pub reason: String,
}

/// Summary of a stale-transaction sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub updated: Vec<Invoice>,
    pub unchanged: Vec<Invoice>,
    pub failed: Vec<FailedReconciliation>,
}

impl ReconcileReport {
    pub fn total_count(&self) -> usize {
        self.updated.len() + self.unchanged.len() + self.failed.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedItem {
    pub sku: String,
    pub reason: String,
}

/// Summary of a catalog sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub skipped: Vec<SkippedItem>,
}
