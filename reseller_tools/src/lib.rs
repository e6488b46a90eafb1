mod api;
mod config;
mod error;
mod gateway;

pub mod data_objects;

pub use api::VipResellerApi;
pub use config::{VipResellerConfig, DEFAULT_TIMEOUT_SECS, DEFAULT_VIP_RESELLER_BASE_URL};
pub use error::ResellerApiError;
pub use gateway::OrderGateway;
