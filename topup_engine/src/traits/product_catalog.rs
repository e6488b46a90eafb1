use crate::{
    db_types::{NewProduct, Product},
    traits::{ProductQueryFilter, StoreError, UpsertResult},
};

/// Read and write access to the product catalog.
///
/// The catalog never changes stock levels during a checkout. That is the job of the [`crate::traits::InventoryLedger`].
#[allow(async_fn_in_trait)]
pub trait ProductCatalog {
    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, StoreError>;

    async fn fetch_product_by_sku(&self, sku: &str) -> Result<Option<Product>, StoreError>;

    /// Lists the products matching the filter, ordered by category and then name.
    async fn search_products(&self, filter: ProductQueryFilter) -> Result<Vec<Product>, StoreError>;

    /// Inserts a brand-new product. Fails with [`StoreError::SkuConflict`] if the SKU is taken.
    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError>;

    /// Creates the product, or refreshes the name, category, description, price and stock of the product that
    /// already carries the same SKU. The active flag of an existing product is left alone.
    async fn upsert_product(&self, product: NewProduct) -> Result<UpsertResult, StoreError>;
}
