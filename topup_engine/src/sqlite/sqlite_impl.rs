//! `SqliteDatabase` is the concrete storage backend of the top-up engine.
//!
//! It uses SQLite and implements all the traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{db_url, new_pool, products, transactions};
use crate::{
    db_types::{NewProduct, NewTransaction, Product, Transaction, TransactionStatus},
    traits::{
        InventoryLedger,
        ProductCatalog,
        ProductQueryFilter,
        StoreError,
        TopupDatabase,
        TransactionQueryFilter,
        TransactionStore,
        UpsertResult,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `TOPUP_DATABASE_URL`
    pub async fn new(max_connections: u32) -> Result<Self, StoreError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::DriverError(format!("Migration failed. {e}")))?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl ProductCatalog for SqliteDatabase {
    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_product_by_sku(&self, sku: &str) -> Result<Option<Product>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product_by_sku(sku, &mut conn).await?;
        Ok(product)
    }

    async fn search_products(&self, filter: ProductQueryFilter) -> Result<Vec<Product>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::search_products(filter, &mut conn).await?;
        Ok(products)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(product, &mut conn).await?;
        debug!("🗃️ Product {} has been saved in the DB with id {}", product.sku, product.id);
        Ok(product)
    }

    async fn upsert_product(&self, product: NewProduct) -> Result<UpsertResult, StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = products::upsert_product(product, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }
}

impl InventoryLedger for SqliteDatabase {
    async fn adjust_stock(&self, product_id: i64, delta: i64) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        products::adjust_stock(product_id, delta, &mut conn).await
    }
}

impl TransactionStore for SqliteDatabase {
    async fn insert_transaction(&self, transaction: NewTransaction) -> Result<Transaction, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let tx = transactions::insert_transaction(transaction, &mut conn).await?;
        debug!("🗃️ Transaction {} has been saved in the DB with id {}", tx.invoice, tx.id);
        Ok(tx)
    }

    async fn fetch_transaction(&self, id: i64) -> Result<Option<Transaction>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(transactions::fetch_transaction(id, &mut conn).await?)
    }

    async fn fetch_transaction_by_invoice(&self, invoice: &str) -> Result<Option<Transaction>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(transactions::fetch_transaction_by_invoice(invoice, &mut conn).await?)
    }

    async fn fetch_transaction_by_vip_order_id(&self, vip_order_id: &str) -> Result<Option<Transaction>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(transactions::fetch_transaction_by_vip_order_id(vip_order_id, &mut conn).await?)
    }

    async fn fetch_transactions_for_user(&self, user_id: i64) -> Result<Vec<Transaction>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let filter = TransactionQueryFilter::default().with_user_id(user_id);
        Ok(transactions::search_transactions(filter, &mut conn).await?)
    }

    async fn search_transactions(&self, filter: TransactionQueryFilter) -> Result<Vec<Transaction>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(transactions::search_transactions(filter, &mut conn).await?)
    }

    async fn link_external_order(&self, id: i64, vip_order_id: &str) -> Result<Transaction, StoreError> {
        let mut conn = self.pool.acquire().await?;
        transactions::link_external_order(id, vip_order_id, &mut conn).await
    }

    async fn update_status(&self, id: i64, status: TransactionStatus) -> Result<Transaction, StoreError> {
        let mut conn = self.pool.acquire().await?;
        transactions::update_status(id, status, &mut conn).await
    }

    async fn annotate(&self, id: i64, note: &str) -> Result<Transaction, StoreError> {
        let mut conn = self.pool.acquire().await?;
        transactions::annotate(id, note, &mut conn).await
    }

    async fn fetch_unreconciled(&self, limit: i64) -> Result<Vec<Transaction>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(transactions::fetch_unreconciled(limit, &mut conn).await?)
    }
}

impl TopupDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}
