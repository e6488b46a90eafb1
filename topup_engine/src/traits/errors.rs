use thiserror::Error;

/// Failures reported by a storage backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("We have an internal database engine (configuration/uptime etc.) error: {0}")]
    DriverError(String),
    #[error("The invoice {0} has already been issued")]
    InvoiceConflict(String),
    #[error("A product with SKU {0} already exists")]
    SkuConflict(String),
    #[error("The requested product (id {0}) does not exist")]
    ProductNotFound(i64),
    #[error("The requested transaction {0} does not exist")]
    TransactionNotFound(String),
    #[error("Product {0} does not have enough stock for this adjustment")]
    OutOfStock(i64),
    #[error("Transaction {id} cannot move from {from} to {to}")]
    InvalidStatusTransition { id: i64, from: String, to: String },
    #[error("Transaction {0} is already linked to an external order")]
    ExternalOrderAlreadyLinked(i64),
    #[error("Invalid query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DriverError(e.to_string())
    }
}

/// True when the driver reports a UNIQUE constraint violation on a column whose name contains `column`.
pub(crate) fn is_unique_violation(e: &sqlx::Error, column: &str) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation() && db_err.message().contains(column),
        _ => false,
    }
}
