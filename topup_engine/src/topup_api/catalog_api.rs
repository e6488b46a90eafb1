use std::fmt::Debug;

use log::*;
use reseller_tools::{data_objects::CatalogItem, OrderGateway};

use crate::{
    db_types::{NewProduct, Product},
    topup_api::{
        checkout_objects::{SkippedItem, SyncReport},
        errors::CatalogError,
    },
    traits::{ProductCatalog, ProductQueryFilter, UpsertResult},
};

/// Product listing, and synchronisation of the local catalog with the provider's.
pub struct CatalogApi<B, G> {
    db: B,
    gateway: G,
}

impl<B, G> Debug for CatalogApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B, G> CatalogApi<B, G> {
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway }
    }
}

impl<B: ProductCatalog, G> CatalogApi<B, G> {
    pub async fn products(&self, filter: ProductQueryFilter) -> Result<Vec<Product>, CatalogError> {
        Ok(self.db.search_products(filter).await?)
    }

    pub async fn product(&self, id: i64) -> Result<Product, CatalogError> {
        self.db.fetch_product(id).await?.ok_or(CatalogError::ProductNotFound(id))
    }

    pub async fn add_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        product.validate().map_err(CatalogError::Validation)?;
        let product = self.db.insert_product(product).await?;
        info!("🛒️ Product {} ({}) added to the catalog", product.sku, product.name);
        Ok(product)
    }
}

impl<B: ProductCatalog, G: OrderGateway> CatalogApi<B, G> {
    /// Fetches the provider catalog and creates or refreshes the local product for each SKU.
    ///
    /// Items that fail validation are skipped and listed in the report. Prices of existing transactions are never
    /// affected, since those were copied at checkout.
    pub async fn sync_catalog(&self) -> Result<SyncReport, CatalogError> {
        let items = self.gateway.fetch_catalog().await?;
        info!("🛒️ Syncing {} catalog items from the provider", items.len());
        let mut report = SyncReport::default();
        for item in items {
            let sku = item.sku.clone();
            let product = new_product_from_item(item);
            if let Err(reason) = product.validate() {
                warn!("🛒️ Skipping catalog item {sku}: {reason}");
                report.skipped.push(SkippedItem { sku, reason });
                continue;
            }
            match self.db.upsert_product(product).await? {
                UpsertResult::Created(_) => report.created.push(sku),
                UpsertResult::Updated(_) => report.updated.push(sku),
            }
        }
        info!(
            "🛒️ Catalog sync complete. {} created, {} updated, {} skipped",
            report.created.len(),
            report.updated.len(),
            report.skipped.len()
        );
        Ok(report)
    }
}

fn new_product_from_item(item: CatalogItem) -> NewProduct {
    NewProduct::new(item.sku, item.name, item.category, item.price)
        .with_description(item.description)
        .with_stock(item.stock.max(0))
}
