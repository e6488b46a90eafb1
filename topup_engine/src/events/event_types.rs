use serde::{Deserialize, Serialize};

use crate::db_types::{Invoice, Transaction, TransactionStatus};

/// Emitted whenever a transaction leaves `pending`, whether because the order could not be placed or because the
/// provider reported a final status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangedEvent {
    pub transaction: Transaction,
    pub old_status: TransactionStatus,
}

impl StatusChangedEvent {
    pub fn new(transaction: Transaction, old_status: TransactionStatus) -> Self {
        Self { transaction, old_status }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DesyncKind {
    /// The provider accepted the order but the inventory floor rejected the decrement.
    Unfulfillable,
    /// The provider accepted the order but local bookkeeping could not be confirmed.
    Unconfirmed,
}

/// Emitted when the provider has committed to an order but the local records could not be brought in line with it.
/// These need operator attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesyncEvent {
    pub kind: DesyncKind,
    pub invoice: Invoice,
    pub vip_order_id: String,
    pub reason: String,
}

impl DesyncEvent {
    pub fn new(kind: DesyncKind, invoice: Invoice, vip_order_id: &str, reason: &str) -> Self {
        Self { kind, invoice, vip_order_id: vip_order_id.to_string(), reason: reason.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    StatusChanged(StatusChangedEvent),
    Desync(DesyncEvent),
}
