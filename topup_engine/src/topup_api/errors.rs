use std::fmt::Display;

use reseller_tools::ResellerApiError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{db_types::Invoice, traits::StoreError};

/// The coarse classification every engine failure maps onto. Callers branch on this rather than on messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request was malformed. Nothing was written.
    Validation,
    /// The referenced product or transaction does not exist.
    NotFound,
    /// A uniqueness rule was violated.
    Conflict,
    /// The product cannot be bought right now.
    Unavailable,
    /// The fulfillment provider failed or could not be reached.
    Gateway,
    /// The local store failed.
    Persistence,
    /// The provider has committed to an order, but the local records could not be brought in line with it.
    Desynchronized,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Gateway => "gateway",
            ErrorKind::Persistence => "persistence",
            ErrorKind::Desynchronized => "desynchronized",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Invalid checkout request: {0}")]
    Validation(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Product {0} is currently unavailable")]
    ProductUnavailable(i64),
    #[error("Could not issue a unique invoice. Last attempt: {0}")]
    InvoiceConflict(String),
    #[error("The provider rejected the order for {invoice}: {reason}")]
    ExternalOrderFailed { invoice: Invoice, reason: String },
    #[error("Order {vip_order_id} for {invoice} was placed, but the product ran out of stock")]
    Unfulfillable { invoice: Invoice, vip_order_id: String },
    #[error("Order {vip_order_id} for {invoice} was placed, but local bookkeeping failed: {reason}")]
    Desynchronized { invoice: Invoice, vip_order_id: String, reason: String },
    #[error("Could not save checkout state: {0}")]
    Persistence(String),
}

impl CheckoutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::Validation(_) => ErrorKind::Validation,
            CheckoutError::ProductNotFound(_) => ErrorKind::NotFound,
            CheckoutError::ProductUnavailable(_) => ErrorKind::Unavailable,
            CheckoutError::InvoiceConflict(_) => ErrorKind::Conflict,
            CheckoutError::ExternalOrderFailed { .. } => ErrorKind::Gateway,
            CheckoutError::Unfulfillable { .. } => ErrorKind::Desynchronized,
            CheckoutError::Desynchronized { .. } => ErrorKind::Desynchronized,
            CheckoutError::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("Invalid reconciliation request: {0}")]
    Validation(String),
    #[error("Transaction {0} does not exist")]
    TransactionNotFound(String),
    #[error("Could not fetch the provider status: {0}")]
    Gateway(String),
    #[error("Could not save the reconciled status: {0}")]
    Persistence(String),
}

impl ReconcileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconcileError::Validation(_) => ErrorKind::Validation,
            ReconcileError::TransactionNotFound(_) => ErrorKind::NotFound,
            ReconcileError::Gateway(_) => ErrorKind::Gateway,
            ReconcileError::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

impl From<StoreError> for ReconcileError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::TransactionNotFound(id) => ReconcileError::TransactionNotFound(id),
            e => ReconcileError::Persistence(e.to_string()),
        }
    }
}

impl From<ResellerApiError> for ReconcileError {
    fn from(e: ResellerApiError) -> Self {
        ReconcileError::Gateway(e.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Invalid product: {0}")]
    Validation(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("A product with SKU {0} already exists")]
    SkuConflict(String),
    #[error("Could not fetch the provider catalog: {0}")]
    Gateway(String),
    #[error("Catalog storage error: {0}")]
    Persistence(String),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Validation(_) => ErrorKind::Validation,
            CatalogError::ProductNotFound(_) => ErrorKind::NotFound,
            CatalogError::SkuConflict(_) => ErrorKind::Conflict,
            CatalogError::Gateway(_) => ErrorKind::Gateway,
            CatalogError::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

impl From<StoreError> for CatalogError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ProductNotFound(id) => CatalogError::ProductNotFound(id),
            StoreError::SkuConflict(sku) => CatalogError::SkuConflict(sku),
            e => CatalogError::Persistence(e.to_string()),
        }
    }
}

impl From<ResellerApiError> for CatalogError {
    fn from(e: ResellerApiError) -> Self {
        CatalogError::Gateway(e.to_string())
    }
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::DriverError(_) => ErrorKind::Persistence,
            StoreError::InvoiceConflict(_) => ErrorKind::Conflict,
            StoreError::SkuConflict(_) => ErrorKind::Conflict,
            StoreError::ProductNotFound(_) => ErrorKind::NotFound,
            StoreError::TransactionNotFound(_) => ErrorKind::NotFound,
            StoreError::OutOfStock(_) => ErrorKind::Unavailable,
            StoreError::InvalidStatusTransition { .. } => ErrorKind::Conflict,
            StoreError::ExternalOrderAlreadyLinked(_) => ErrorKind::Conflict,
            StoreError::QueryError(_) => ErrorKind::Validation,
        }
    }
}
