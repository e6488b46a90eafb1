//! Top-up Engine
//!
//! The top-up engine sells game top-up credit that is fulfilled by an external reseller. This library holds the
//! checkout orchestration and status reconciliation logic. It is storage-agnostic and provider-agnostic: storage is
//! reached through the traits in [`mod@traits`], and the provider through [`reseller_tools::OrderGateway`].
//!
//! The library is divided into these sections:
//! 1. Storage contracts ([`mod@traits`]) and the SQLite backend ([`SqliteDatabase`]). The record types that cross the
//!    storage boundary live in [`mod@db_types`].
//! 2. The public API ([`CheckoutApi`], [`ReconcileApi`], [`CatalogApi`], [`TransactionsApi`]).
//! 3. Events ([`mod@events`]) that fire when a transaction changes status or a checkout ends up out of step with the
//!    provider. Handlers can be hooked in to alert operators or notify buyers.
pub mod db_types;
pub mod events;
pub mod helpers;
#[cfg(feature = "sqlite")]
mod sqlite;
mod topup_api;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::{db::db_url, SqliteDatabase};
pub use topup_api::{
    catalog_api::CatalogApi,
    checkout_api::CheckoutApi,
    checkout_objects,
    errors::{CatalogError, CheckoutError, ErrorKind, ReconcileError},
    reconcile_api::ReconcileApi,
    transactions_api::TransactionsApi,
};
pub use traits::{
    InventoryLedger,
    ProductCatalog,
    ProductQueryFilter,
    StoreError,
    TopupDatabase,
    TransactionQueryFilter,
    TransactionStore,
};
