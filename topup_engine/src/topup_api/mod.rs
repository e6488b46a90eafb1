//! # Top-up engine public API
//!
//! The `topup_api` module exposes the programmatic API of the engine. Each API is a thin struct over a storage
//! backend and, where it talks to the provider, an [`reseller_tools::OrderGateway`].
//!
//! * [`checkout_api`] runs the purchase saga.
//! * [`reconcile_api`] brings local transaction status in line with the provider, one invoice at a time or as a
//!   sweep over stale pending transactions.
//! * [`catalog_api`] lists products and syncs the catalog from the provider.
//! * [`transactions_api`] answers transaction history queries.
//!
//! # API usage
//!
//! ```rust,ignore
//! use reseller_tools::{VipResellerApi, VipResellerConfig};
//! use topup_engine::{events::EventProducers, CheckoutApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let gateway = VipResellerApi::new(VipResellerConfig::new_from_env_or_default())?;
//! let api = CheckoutApi::new(db, gateway, EventProducers::default());
//! let transaction = api.process_checkout(request).await?;
//! ```
pub mod catalog_api;
pub mod checkout_api;
pub mod checkout_objects;
pub mod errors;
pub mod reconcile_api;
pub mod transactions_api;
