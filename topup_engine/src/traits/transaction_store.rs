use crate::{
    db_types::{NewTransaction, Transaction, TransactionStatus},
    traits::{StoreError, TransactionQueryFilter},
};

/// Lifecycle management for transaction records.
///
/// Transactions are append-only history. The store guards every mutation so that
/// * an invoice is issued at most once,
/// * the external order id is written at most once and never cleared,
/// * the status only ever moves from `pending` to one of the terminal states.
#[allow(async_fn_in_trait)]
pub trait TransactionStore {
    /// Persists a new `pending` transaction. A duplicate invoice gives [`StoreError::InvoiceConflict`].
    async fn insert_transaction(&self, transaction: NewTransaction) -> Result<Transaction, StoreError>;

    async fn fetch_transaction(&self, id: i64) -> Result<Option<Transaction>, StoreError>;

    async fn fetch_transaction_by_invoice(&self, invoice: &str) -> Result<Option<Transaction>, StoreError>;

    async fn fetch_transaction_by_vip_order_id(&self, vip_order_id: &str) -> Result<Option<Transaction>, StoreError>;

    /// All transactions for the given buyer, newest first.
    async fn fetch_transactions_for_user(&self, user_id: i64) -> Result<Vec<Transaction>, StoreError>;

    async fn search_transactions(&self, filter: TransactionQueryFilter) -> Result<Vec<Transaction>, StoreError>;

    /// Records the provider's order id against the transaction. Fails with
    /// [`StoreError::ExternalOrderAlreadyLinked`] if the transaction already has one.
    async fn link_external_order(&self, id: i64, vip_order_id: &str) -> Result<Transaction, StoreError>;

    /// Moves a `pending` transaction to `status`, which must be terminal. Any other transition is rejected with
    /// [`StoreError::InvalidStatusTransition`] and nothing is written.
    async fn update_status(&self, id: i64, status: TransactionStatus) -> Result<Transaction, StoreError>;

    /// Appends an operator note to the transaction.
    async fn annotate(&self, id: i64, note: &str) -> Result<Transaction, StoreError>;

    /// Pending transactions that already carry an external order id, oldest first.
    async fn fetch_unreconciled(&self, limit: i64) -> Result<Vec<Transaction>, StoreError>;
}
