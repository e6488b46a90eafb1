//! # Top-up server
//! This crate hosts the HTTP front end of the top-up service. It is responsible for:
//! Accepting checkouts from buyers and handing them to the engine's checkout saga.
//! Answering status lookups, reconciling each transaction with the provider on the way.
//! Exposing admin routes for transaction search, catalog sync and reconciliation sweeps.
//! Running the background reconciliation worker.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/products`, `/api/products/{id}`: The catalog.
//! * `/api/checkout`: Buy one unit of a product.
//! * `/api/transaction/{invoice}`: Reconcile and return a transaction.
//! * `/api/admin/...`: Admin routes (transaction search, buyer history, catalog maintenance and reconciliation).
//!   These require the `X-Admin-Key` header.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod reconcile_worker;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
