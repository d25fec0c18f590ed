use std::time::Duration;

use log::*;
use rpg_common::Secret;

pub const DEFAULT_API_VERSION: &str = "2024-07";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    /// The shop's myshopify domain, e.g. "my-shop.myshopify.com"
    pub shop: String,
    pub admin_access_token: Secret<String>,
    pub api_version: String,
    /// Overrides `https://{shop}/admin/api/{api_version}` when set. Handy for proxies and test doubles.
    pub api_base_url: Option<String>,
    /// Upper bound on the duration of every request made to the Admin API.
    pub timeout: Duration,
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            shop: String::default(),
            admin_access_token: Secret::default(),
            api_version: DEFAULT_API_VERSION.to_string(),
            api_base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ShopifyConfig {
    pub fn new_from_env_or_default() -> Self {
        let shop = std::env::var("RPG_SHOPIFY_SHOP").unwrap_or_else(|_| {
            warn!("🪛️ RPG_SHOPIFY_SHOP not set, using (probably useless) default");
            "example.myshopify.com".to_string()
        });
        let api_version = std::env::var("RPG_SHOPIFY_API_VERSION").unwrap_or_else(|_| {
            warn!("🪛️ RPG_SHOPIFY_API_VERSION not set, using {DEFAULT_API_VERSION} as default");
            DEFAULT_API_VERSION.to_string()
        });
        let admin_access_token = Secret::new(std::env::var("RPG_SHOPIFY_ADMIN_ACCESS_TOKEN").unwrap_or_else(|_| {
            warn!("🪛️ RPG_SHOPIFY_ADMIN_ACCESS_TOKEN not set, using (probably useless) default");
            "shpat_00000000000000".to_string()
        }));
        let api_base_url = std::env::var("RPG_SHOPIFY_API_BASE_URL").ok().map(|s| s.trim_end_matches('/').to_string());
        let timeout = std::env::var("RPG_SHOPIFY_TIMEOUT")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid value for RPG_SHOPIFY_TIMEOUT ({s}). {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self { shop, admin_access_token, api_version, api_base_url, timeout }
    }

    /// The root of every Admin API path, without a trailing slash.
    pub fn base_url(&self) -> String {
        match &self.api_base_url {
            Some(url) => url.clone(),
            None => format!("https://{}/admin/api/{}", self.shop, self.api_version),
        }
    }
}
