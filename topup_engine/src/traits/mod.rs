//! # Storage backend contracts
//!
//! The traits in this module define what a database backend must provide to support the top-up engine.
//!
//! * [`ProductCatalog`] stores the products that can be bought, keyed by id and by provider SKU.
//! * [`InventoryLedger`] owns the stock counter. Its single conditional update is the only synchronization point
//!   between concurrent checkouts.
//! * [`TransactionStore`] records purchases and enforces the status and linkage invariants.
//! * [`TopupDatabase`] ties the three together.
mod data_objects;
mod errors;
mod inventory_ledger;
mod product_catalog;
mod topup_database;
mod transaction_store;

pub(crate) use errors::is_unique_violation;
pub use data_objects::{ProductQueryFilter, TransactionQueryFilter, UpsertResult};
pub use errors::StoreError;
pub use inventory_ledger::InventoryLedger;
pub use product_catalog::ProductCatalog;
pub use topup_database::TopupDatabase;
pub use transaction_store::TransactionStore;
