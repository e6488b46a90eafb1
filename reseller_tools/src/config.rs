use std::time::Duration;

use log::*;
use topup_common::Secret;

pub const DEFAULT_VIP_RESELLER_BASE_URL: &str = "https://vip-reseller.co.id/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct VipResellerConfig {
    pub base_url: String,
    pub api_key: Secret<String>,
    pub user_id: String,
    pub timeout: Duration,
}

impl Default for VipResellerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_VIP_RESELLER_BASE_URL.to_string(),
            api_key: Secret::default(),
            user_id: String::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl VipResellerConfig {
    pub fn new(base_url: &str, api_key: &str, user_id: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: Secret::new(api_key.to_string()),
            user_id: user_id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("VIP_RESELLER_BASE_URL").unwrap_or_else(|_| {
            info!("VIP_RESELLER_BASE_URL not set, using {DEFAULT_VIP_RESELLER_BASE_URL} as default");
            DEFAULT_VIP_RESELLER_BASE_URL.to_string()
        });
        let api_key = Secret::new(std::env::var("VIP_RESELLER_API_KEY").unwrap_or_else(|_| {
            warn!("VIP_RESELLER_API_KEY not set, using (probably useless) default");
            "00000000000000".to_string()
        }));
        let user_id = std::env::var("VIP_RESELLER_USER_ID").unwrap_or_else(|_| {
            warn!("VIP_RESELLER_USER_ID not set, using (probably useless) default");
            "0000".to_string()
        });
        let timeout = std::env::var("VIP_RESELLER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("Invalid VIP_RESELLER_TIMEOUT_SECS value '{s}': {e}. Using the default."))
                    .ok()
            })
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            user_id,
            timeout: Duration::from_secs(timeout),
        }
    }
}
