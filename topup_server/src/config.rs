use std::{env, time::Duration};

use log::*;
use reseller_tools::VipResellerConfig;
use topup_common::{
    helpers::{non_empty, parse_boolean_flag},
    Secret,
};
use topup_engine::checkout_objects::StockPolicy;

const DEFAULT_TOPUP_HOST: &str = "127.0.0.1";
const DEFAULT_TOPUP_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/topup_store.db";
pub const DEFAULT_RECONCILE_BATCH_SIZE: i64 = 100;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Where in the checkout inventory is consumed. See [`StockPolicy`].
    pub stock_policy: StockPolicy,
    /// Admin routes compare the `X-Admin-Key` header against this value. When it is `None`, admin routes are closed.
    pub admin_api_key: Option<Secret<String>>,
    pub reconcile: ReconcileConfig,
    pub reseller: VipResellerConfig,
}

/// Settings for the background sweep that replays reconciliation over stale pending transactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Sweep once as soon as the server starts.
    pub on_startup: bool,
    /// Sweep periodically. `None` disables the periodic sweep.
    pub interval: Option<Duration>,
    /// The maximum number of transactions examined per sweep.
    pub batch_size: i64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self { on_startup: true, interval: None, batch_size: DEFAULT_RECONCILE_BATCH_SIZE }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_TOPUP_HOST.to_string(),
            port: DEFAULT_TOPUP_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            stock_policy: StockPolicy::default(),
            admin_api_key: None,
            reconcile: ReconcileConfig::default(),
            reseller: VipResellerConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("TOPUP_HOST").ok().unwrap_or_else(|| DEFAULT_TOPUP_HOST.into());
        let port = env::var("TOPUP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for TOPUP_PORT. {e} Using the default, {DEFAULT_TOPUP_PORT}, \
                         instead."
                    );
                    DEFAULT_TOPUP_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_TOPUP_PORT);
        let database_url = env::var("TOPUP_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ TOPUP_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let stock_policy = match env::var("TOPUP_STOCK_POLICY") {
            Ok(s) => s.parse::<StockPolicy>().unwrap_or_else(|e| {
                warn!("🪛️ {e}. Using the default stock policy, '{}'.", StockPolicy::default());
                StockPolicy::default()
            }),
            Err(_) => {
                info!("🪛️ TOPUP_STOCK_POLICY is not set. Using the default, '{}'.", StockPolicy::default());
                StockPolicy::default()
            },
        };
        let admin_api_key = configure_admin_key(env::var("TOPUP_ADMIN_API_KEY").ok());
        let reconcile = ReconcileConfig::from_env_or_default();
        let reseller = VipResellerConfig::new_from_env_or_default();
        Self { host, port, database_url, stock_policy, admin_api_key, reconcile, reseller }
    }
}

fn configure_admin_key(value: Option<String>) -> Option<Secret<String>> {
    match non_empty(value.as_deref()) {
        Some(key) => Some(Secret::new(key.to_string())),
        None => {
            warn!("🪛️ TOPUP_ADMIN_API_KEY is not set. Admin routes will reject every request.");
            None
        },
    }
}

impl ReconcileConfig {
    pub fn from_env_or_default() -> Self {
        let on_startup = parse_boolean_flag(env::var("TOPUP_RECONCILE_ON_STARTUP").ok(), true);
        let interval = env::var("TOPUP_RECONCILE_INTERVAL_SECS")
            .map_err(|_| info!("🪛️ TOPUP_RECONCILE_INTERVAL_SECS is not set. The periodic sweep is disabled."))
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for TOPUP_RECONCILE_INTERVAL_SECS. {e}"))
            })
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        let batch_size = env::var("TOPUP_RECONCILE_BATCH_SIZE")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for TOPUP_RECONCILE_BATCH_SIZE. {e}"))
                    .ok()
            })
            .filter(|n| {
                if *n <= 0 {
                    warn!("🪛️ TOPUP_RECONCILE_BATCH_SIZE must be positive. Using {DEFAULT_RECONCILE_BATCH_SIZE}.");
                }
                *n > 0
            })
            .unwrap_or(DEFAULT_RECONCILE_BATCH_SIZE);
        Self { on_startup, interval, batch_size }
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// The part of the configuration that request handlers need. Secrets stay out of it.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    pub reconcile_batch_size: i64,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { reconcile_batch_size: config.reconcile.batch_size }
    }
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self { reconcile_batch_size: DEFAULT_RECONCILE_BATCH_SIZE }
    }
}
