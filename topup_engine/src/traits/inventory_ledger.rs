use crate::traits::StoreError;

/// Per-product stock bookkeeping.
#[allow(async_fn_in_trait)]
pub trait InventoryLedger {
    /// Atomically adds `delta` (which may be negative) to the product's stock and returns the new stock level.
    ///
    /// The change is applied in a single conditional update, so stock can never drop below zero, however many callers
    /// race on the same product. If the update would go negative, nothing changes and [`StoreError::OutOfStock`] is
    /// returned. An unknown product gives [`StoreError::ProductNotFound`].
    async fn adjust_stock(&self, product_id: i64, delta: i64) -> Result<i64, StoreError>;
}
