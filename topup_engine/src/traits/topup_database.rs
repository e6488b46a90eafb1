use crate::traits::{InventoryLedger, ProductCatalog, StoreError, TransactionStore};

/// The full set of behaviour a storage backend needs to expose to drive checkouts and reconciliation.
#[allow(async_fn_in_trait)]
pub trait TopupDatabase: Clone + ProductCatalog + InventoryLedger + TransactionStore {
    /// The URL of the database
    fn url(&self) -> &str;

    async fn close(&mut self) -> Result<(), StoreError>;
}
