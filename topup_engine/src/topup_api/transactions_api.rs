use std::fmt::Debug;

use crate::{
    db_types::Transaction,
    traits::{StoreError, TransactionQueryFilter, TransactionStore},
};

/// Read-only queries over transaction history.
pub struct TransactionsApi<B> {
    db: B,
}

impl<B> Debug for TransactionsApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransactionsApi")
    }
}

impl<B> TransactionsApi<B>
where B: TransactionStore
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn transaction(&self, id: i64) -> Result<Transaction, StoreError> {
        self.db.fetch_transaction(id).await?.ok_or_else(|| StoreError::TransactionNotFound(id.to_string()))
    }

    pub async fn transaction_by_invoice(&self, invoice: &str) -> Result<Transaction, StoreError> {
        self.db
            .fetch_transaction_by_invoice(invoice)
            .await?
            .ok_or_else(|| StoreError::TransactionNotFound(invoice.to_string()))
    }

    pub async fn transaction_by_vip_order_id(&self, vip_order_id: &str) -> Result<Transaction, StoreError> {
        self.db
            .fetch_transaction_by_vip_order_id(vip_order_id)
            .await?
            .ok_or_else(|| StoreError::TransactionNotFound(vip_order_id.to_string()))
    }

    pub async fn transactions_for_user(&self, user_id: i64) -> Result<Vec<Transaction>, StoreError> {
        self.db.fetch_transactions_for_user(user_id).await
    }

    /// Filtered, paginated listing, newest first.
    pub async fn search(&self, filter: TransactionQueryFilter) -> Result<Vec<Transaction>, StoreError> {
        if filter.limit.is_some_and(|l| l < 0) || filter.offset.is_some_and(|o| o < 0) {
            return Err(StoreError::QueryError("limit and offset cannot be negative".to_string()));
        }
        if let (Some(since), Some(until)) = (filter.since, filter.until) {
            if since > until {
                return Err(StoreError::QueryError("'since' must not be later than 'until'".to_string()));
            }
        }
        self.db.search_transactions(filter).await
    }
}
